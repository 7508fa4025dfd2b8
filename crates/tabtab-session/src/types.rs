use tabtab_core::completion::CompletionRequest;
use tabtab_core::Candidate;

use crate::candidates::CandidateListState;

/// Milliseconds on the keyboard source's monotonic clock. Every key event
/// carries one; the session never reads a wall clock of its own.
pub type TimestampMs = u64;

/// Keyboard events the session understands. The host's key-interception
/// layer translates raw platform events into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// A printable phonetic character (letters; uppercase is folded).
    Char(char),
    /// Digit 1–9: direct candidate selection.
    Digit(u8),
    /// The confirmation key (Tab in the original), subject to the
    /// single/double-tap gesture.
    Confirm,
    Space,
    Enter,
    Backspace,
    Escape,
    ArrowUp,
    ArrowDown,
    /// The input target lost focus; composition is abandoned.
    FocusLost,
    /// Any other printable key (punctuation etc.).
    Other(char),
}

/// Candidate panel action — exactly one of three states, so "show and hide
/// at once" is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateAction {
    /// Leave the panel as-is.
    Keep,
    /// Show or update the panel.
    Show {
        candidates: Vec<Candidate>,
        selected: usize,
    },
    /// Hide the panel.
    Hide,
}

/// What the embedding host should do after a key event.
#[derive(Debug)]
pub struct KeyResponse {
    /// Whether the event was consumed (suppressed from the target app).
    pub consumed: bool,
    /// Text to insert into the input target, at most once per commit.
    pub commit: Option<String>,
    pub candidates: CandidateAction,
    /// Completion request to forward to the gateway, if a double tap
    /// qualified this round.
    pub completion_request: Option<CompletionRequest>,
    /// When set, the host should call `InputSession::tick` at this time to
    /// resolve a pending single tap. Replaces any earlier scheduled tick.
    pub gesture_deadline: Option<TimestampMs>,
}

impl KeyResponse {
    pub(crate) fn not_consumed() -> Self {
        Self {
            consumed: false,
            commit: None,
            candidates: CandidateAction::Keep,
            completion_request: None,
            gesture_deadline: None,
        }
    }

    pub(crate) fn consumed() -> Self {
        Self {
            consumed: true,
            ..Self::not_consumed()
        }
    }

    /// Chain a resolved-gesture commit with the response to the event that
    /// resolved it: commits concatenate in order, display state and
    /// dispatch fields come from the later response.
    pub(crate) fn then(mut self, later: KeyResponse) -> KeyResponse {
        self.consumed = self.consumed || later.consumed;
        self.commit = match (self.commit.take(), later.commit) {
            (Some(mut a), Some(b)) => {
                a.push_str(&b);
                Some(a)
            }
            (a, b) => a.or(b),
        };
        if !matches!(later.candidates, CandidateAction::Keep) {
            self.candidates = later.candidates;
        }
        self.completion_request = later.completion_request;
        self.gesture_deadline = later.gesture_deadline;
        self
    }
}

/// Timing state for the confirmation-key gesture. Transient: armed by the
/// first press, cleared by whatever resolves it.
#[derive(Debug, Default)]
pub struct GestureState {
    first_press_at: Option<TimestampMs>,
}

impl GestureState {
    pub fn arm(&mut self, at: TimestampMs) {
        self.first_press_at = Some(at);
    }

    pub fn clear(&mut self) {
        self.first_press_at = None;
    }

    pub fn pending(&self) -> Option<TimestampMs> {
        self.first_press_at
    }
}

pub(crate) enum SessionState {
    Idle,
    Composing(Composition),
}

/// The in-progress phonetic input and its derived candidate list.
pub(crate) struct Composition {
    pub(crate) buffer: String,
    pub(crate) list: CandidateListState,
}

impl Composition {
    pub(crate) fn new() -> Self {
        Self {
            buffer: String::new(),
            list: CandidateListState::new(),
        }
    }
}

/// A commit was requested for an index the candidate list does not have.
/// Callers treat this as a no-op, never a crash.
#[derive(Debug, thiserror::Error)]
#[error("selection index {index} out of range for {len} candidates")]
pub struct SelectionOutOfRange {
    pub index: usize,
    pub len: usize,
}
