//! Stateful input session: phonetic buffer, key state machine, gesture
//! timing, and candidate list merging.
//!
//! `InputSession` owns all per-composition state and processes each
//! timestamped keystroke synchronously, returning a [`KeyResponse`] the
//! embedding host translates into suppression, text insertion, panel
//! updates, completion-gateway dispatches, and one scheduled `tick`
//! callback. The host's event loop is the single writer; the only
//! concurrent activity is the completion gateway's worker thread, whose
//! outcomes are marshaled back here through [`InputSession::receive_completions`].

mod candidates;
mod commit;
mod key_handlers;
mod types;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tabtab_core::settings::Settings;
use tabtab_core::{Candidate, PinyinDictionary};

pub use types::{
    CandidateAction, GestureState, KeyEvent, KeyResponse, SelectionOutOfRange, TimestampMs,
};

use types::SessionState;

pub struct InputSession {
    dict: Arc<PinyinDictionary>,
    settings: Settings,

    state: SessionState,
    gesture: GestureState,
    /// Phonetic-buffer revision counter. Bumped on every buffer mutation
    /// and on reset; completion outcomes tagged with an older value are
    /// discarded on arrival.
    generation: u64,
    /// Timestamp of the last successful completion dispatch, for the
    /// cooldown guard.
    last_dispatch_at: Option<TimestampMs>,
    /// Opaque scene/profile tag forwarded with completion requests.
    scene: String,
}

impl InputSession {
    pub fn new(dict: Arc<PinyinDictionary>, settings: Settings) -> Self {
        Self {
            dict,
            settings,
            state: SessionState::Idle,
            gesture: GestureState::default(),
            generation: 0,
            last_dispatch_at: None,
            scene: "general".to_string(),
        }
    }

    pub fn is_composing(&self) -> bool {
        matches!(self.state, SessionState::Composing(_))
    }

    /// The in-progress phonetic buffer; empty when idle.
    pub fn buffer(&self) -> &str {
        match &self.state {
            SessionState::Composing(c) => &c.buffer,
            SessionState::Idle => "",
        }
    }

    /// Current candidate list in display order.
    pub fn candidates(&self) -> &[Candidate] {
        match &self.state {
            SessionState::Composing(c) => c.list.items(),
            SessionState::Idle => &[],
        }
    }

    pub fn selected_index(&self) -> usize {
        match &self.state {
            SessionState::Composing(c) => c.list.selected(),
            SessionState::Idle => 0,
        }
    }

    /// Current buffer generation, for gateway invalidation by the host.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_scene(&mut self, scene: impl Into<String>) {
        self.scene = scene.into();
    }

    pub fn scene(&self) -> &str {
        &self.scene
    }

    fn has_candidates(&self) -> bool {
        !self.candidates().is_empty()
    }

    fn candidate_count(&self) -> usize {
        self.candidates().len()
    }
}
