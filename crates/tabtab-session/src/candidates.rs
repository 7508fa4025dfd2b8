//! Candidate list merging: local matcher results plus the AI slice.
//!
//! The list is derived state, rebuilt from the matcher on every buffer
//! change; the only incremental mutation is appending AI completions that
//! still belong to the live buffer generation.

use tabtab_core::completion::CompletionOutcome;
use tabtab_core::matcher::match_candidates;
use tabtab_core::{Candidate, CandidateOrigin};

use crate::types::{CandidateAction, KeyResponse, SelectionOutOfRange, SessionState};
use crate::InputSession;

pub(crate) struct CandidateListState {
    items: Vec<Candidate>,
    selected: usize,
    /// Buffer generation the current AI slice was produced for.
    ai_generation: Option<u64>,
}

impl CandidateListState {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            ai_generation: None,
        }
    }

    pub(crate) fn items(&self) -> &[Candidate] {
        &self.items
    }

    pub(crate) fn selected(&self) -> usize {
        self.selected
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// Move the selection by one, clamped to the list bounds (no
    /// wraparound). Returns whether it actually moved.
    pub(crate) fn move_selection(&mut self, delta: i32) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let max = self.items.len() - 1;
        let next = if delta < 0 {
            self.selected.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            (self.selected + delta as usize).min(max)
        };
        let moved = next != self.selected;
        if moved {
            self.selected = next;
        }
        moved
    }

    /// Replace the dictionary-sourced block with fresh matcher results,
    /// keeping an AI slice only if it was produced for `generation`. The
    /// selection is reset to 0 only when the old index falls out of bounds.
    pub(crate) fn rebuild_local(&mut self, local: Vec<Candidate>, generation: u64) {
        let ai: Vec<Candidate> = if self.ai_generation == Some(generation) {
            self.items
                .iter()
                .filter(|c| c.origin == CandidateOrigin::AiCompletion)
                .cloned()
                .collect()
        } else {
            self.ai_generation = None;
            Vec::new()
        };

        self.items = local;
        self.items.extend(ai);

        if self.items.is_empty() || self.selected >= self.items.len() {
            self.selected = 0;
        }
    }

    /// Append the AI slice for `generation`, replacing any previous one.
    /// AI suggestions supplement local matches, never displace them; the
    /// selection moves (to 0) only if the list was empty before.
    pub(crate) fn append_ai(&mut self, completions: &[String], generation: u64) {
        let was_empty = self.items.is_empty();
        self.items
            .retain(|c| c.origin != CandidateOrigin::AiCompletion);
        self.items
            .extend(completions.iter().map(|text| Candidate::ai(text.clone())));
        self.ai_generation = Some(generation);

        if was_empty {
            self.selected = 0;
        } else if self.selected >= self.items.len() {
            self.selected = 0;
        }
    }

    /// Display text of the candidate at `index`.
    pub(crate) fn commit_text(&self, index: usize) -> Result<String, SelectionOutOfRange> {
        self.items
            .get(index)
            .map(|c| c.text.clone())
            .ok_or(SelectionOutOfRange {
                index,
                len: self.items.len(),
            })
    }
}

impl InputSession {
    /// Recompute the local candidate block for the current buffer.
    pub(crate) fn rebuild_local(&mut self) {
        let SessionState::Composing(c) = &mut self.state else {
            return;
        };
        let local = match_candidates(&self.dict, &c.buffer, &self.settings.matcher);
        c.list.rebuild_local(local, self.generation);
    }

    /// Apply a completion outcome from the gateway. Returns `None` when the
    /// outcome is stale — the buffer has changed or been committed since
    /// dispatch — leaving the current list untouched.
    pub fn receive_completions(&mut self, outcome: &CompletionOutcome) -> Option<KeyResponse> {
        if outcome.generation != self.generation {
            tracing::debug!(
                outcome_generation = outcome.generation,
                current_generation = self.generation,
                "discarding stale completion outcome"
            );
            return None;
        }
        let SessionState::Composing(c) = &mut self.state else {
            return None;
        };
        c.list.append_ai(&outcome.completions, outcome.generation);
        Some(self.show_response())
    }

    /// Response reflecting the current panel state.
    pub(crate) fn show_response(&self) -> KeyResponse {
        let mut resp = KeyResponse::consumed();
        resp.candidates = match &self.state {
            SessionState::Composing(c) if !c.list.is_empty() => CandidateAction::Show {
                candidates: c.list.items().to_vec(),
                selected: c.list.selected(),
            },
            _ => CandidateAction::Hide,
        };
        resp
    }
}
