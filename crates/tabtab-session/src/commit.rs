use tracing::debug;

use crate::types::{CandidateAction, KeyResponse, SessionState};
use crate::InputSession;

impl InputSession {
    /// Commit the currently selected candidate and clear all composing
    /// state. With an empty candidate list this is a no-op commit: nothing
    /// is inserted, but the buffer still clears.
    pub(crate) fn commit_selected(&mut self) -> KeyResponse {
        let SessionState::Composing(ref c) = self.state else {
            return KeyResponse::consumed();
        };

        let mut resp = KeyResponse::consumed();
        resp.candidates = CandidateAction::Hide;
        resp.commit = c.list.commit_text(c.list.selected()).ok();
        self.reset_state();
        resp
    }

    /// Commit the candidate at an explicit index (digit selection). An
    /// out-of-range index is a no-op: state is left untouched.
    pub(crate) fn commit_at(&mut self, index: usize) -> KeyResponse {
        let SessionState::Composing(ref c) = self.state else {
            return KeyResponse::consumed();
        };

        match c.list.commit_text(index) {
            Ok(text) => {
                let mut resp = KeyResponse::consumed();
                resp.candidates = CandidateAction::Hide;
                resp.commit = Some(text);
                self.reset_state();
                resp
            }
            Err(err) => {
                debug!(%err, "ignoring out-of-range selection");
                KeyResponse::consumed()
            }
        }
    }

    /// Drop all composing state: buffer, candidate list, gesture. Bumps the
    /// generation so in-flight completion replies become stale.
    pub(crate) fn reset_state(&mut self) {
        self.state = SessionState::Idle;
        self.gesture.clear();
        self.generation += 1;
    }
}
