use tracing::{debug, debug_span};

use tabtab_core::completion::CompletionRequest;

use crate::types::{
    CandidateAction, Composition, KeyEvent, KeyResponse, SessionState, TimestampMs,
};
use crate::InputSession;

impl InputSession {
    /// Process one timestamped key event.
    ///
    /// A pending confirmation-key gesture is resolved first: a second press
    /// inside the window is a double tap (AI dispatch), a digit commits its
    /// own index, a cancel event abandons the tap without committing, and
    /// any other event proves single-tap intent, so the pending commit
    /// fires before the event is handled. Gesture expiry is thus re-checked
    /// on every event even if the host never calls `tick`.
    pub fn handle_key(&mut self, event: KeyEvent, at: TimestampMs) -> KeyResponse {
        let _span = debug_span!("handle_key", ?event, at).entered();

        if let Some(first_press) = self.gesture.pending() {
            let window = self.settings.gesture.double_tap_window_ms;
            let within_window = at.saturating_sub(first_press) < window;

            if event == KeyEvent::Confirm && within_window {
                self.gesture.clear();
                return self.handle_double_tap(at);
            }

            if let KeyEvent::Digit(n) = event {
                // Confirmation-key-then-digit: commit that position
                // directly, bypassing the single-tap timer.
                self.gesture.clear();
                return match digit_index(n) {
                    Some(index) => self.commit_at(index),
                    None => KeyResponse::consumed(),
                };
            }

            if matches!(event, KeyEvent::Escape | KeyEvent::FocusLost) {
                // Cancel is unconditional: the pending tap is abandoned,
                // nothing is committed.
                self.gesture.clear();
                return self.dispatch(event, at);
            }

            self.gesture.clear();
            let committed = self.commit_selected();
            let rest = self.dispatch(event, at);
            return committed.then(rest);
        }

        self.dispatch(event, at)
    }

    /// Scheduled gesture-timeout callback. At or past the deadline the
    /// pending single tap commits the current selection and clears the
    /// buffer; before it, nothing happens.
    pub fn tick(&mut self, now: TimestampMs) -> Option<KeyResponse> {
        let first_press = self.gesture.pending()?;
        let deadline = first_press + self.settings.gesture.double_tap_window_ms;
        if now < deadline {
            return None;
        }
        self.gesture.clear();
        Some(self.commit_selected())
    }

    fn dispatch(&mut self, event: KeyEvent, at: TimestampMs) -> KeyResponse {
        match event {
            KeyEvent::Char(c) if c.is_ascii_alphabetic() => self.handle_char(c),
            KeyEvent::Char(c) | KeyEvent::Other(c) => self.handle_other(c),

            KeyEvent::Confirm if self.is_composing() => {
                // First press: arm the timer, do not commit yet.
                self.gesture.arm(at);
                let mut resp = KeyResponse::consumed();
                resp.gesture_deadline = Some(at + self.settings.gesture.double_tap_window_ms);
                resp
            }
            KeyEvent::Confirm => KeyResponse::not_consumed(),

            KeyEvent::Space | KeyEvent::Enter if self.has_candidates() => self.commit_selected(),
            KeyEvent::Space | KeyEvent::Enter => KeyResponse::not_consumed(),

            KeyEvent::Digit(n) if self.is_composing() => match digit_index(n) {
                Some(index) if index < self.candidate_count() => self.commit_at(index),
                _ => KeyResponse::not_consumed(),
            },
            KeyEvent::Digit(_) => KeyResponse::not_consumed(),

            KeyEvent::ArrowDown if self.has_candidates() => self.navigate(1),
            KeyEvent::ArrowUp if self.has_candidates() => self.navigate(-1),
            KeyEvent::ArrowDown | KeyEvent::ArrowUp => KeyResponse::not_consumed(),

            KeyEvent::Backspace if self.is_composing() => self.handle_backspace(),
            KeyEvent::Backspace => KeyResponse::not_consumed(),

            KeyEvent::Escape if self.is_composing() => {
                self.reset_state();
                let mut resp = KeyResponse::consumed();
                resp.candidates = CandidateAction::Hide;
                resp
            }
            KeyEvent::Escape => KeyResponse::not_consumed(),

            KeyEvent::FocusLost => {
                let was_composing = self.is_composing();
                if was_composing {
                    self.reset_state();
                }
                let mut resp = KeyResponse::not_consumed();
                if was_composing {
                    resp.candidates = CandidateAction::Hide;
                }
                resp
            }
        }
    }

    fn handle_char(&mut self, c: char) -> KeyResponse {
        if !self.is_composing() {
            self.state = SessionState::Composing(Composition::new());
        }
        let SessionState::Composing(comp) = &mut self.state else {
            unreachable!("just ensured composing state");
        };
        comp.buffer.push(c.to_ascii_lowercase());
        self.generation += 1;
        self.rebuild_local();
        self.show_response()
    }

    fn handle_backspace(&mut self) -> KeyResponse {
        let SessionState::Composing(comp) = &mut self.state else {
            return KeyResponse::not_consumed();
        };
        comp.buffer.pop();
        self.generation += 1;

        if comp.buffer.is_empty() {
            self.reset_state();
            let mut resp = KeyResponse::consumed();
            resp.candidates = CandidateAction::Hide;
            return resp;
        }

        self.rebuild_local();
        self.show_response()
    }

    /// Non-phonetic printable key: commit the current selection first, then
    /// let the key through so it lands after the committed text.
    fn handle_other(&mut self, _c: char) -> KeyResponse {
        if !self.is_composing() {
            return KeyResponse::not_consumed();
        }
        let mut resp = if self.has_candidates() {
            self.commit_selected()
        } else {
            self.reset_state();
            let mut resp = KeyResponse::consumed();
            resp.candidates = CandidateAction::Hide;
            resp
        };
        resp.consumed = false;
        resp
    }

    fn navigate(&mut self, delta: i32) -> KeyResponse {
        let SessionState::Composing(comp) = &mut self.state else {
            return KeyResponse::not_consumed();
        };
        comp.list.move_selection(delta);
        self.show_response()
    }

    /// Double tap resolved: dispatch a completion request, subject to the
    /// empty-buffer guard and the cooldown. Either way the session stays in
    /// `Composing` — the request runs in the background.
    fn handle_double_tap(&mut self, at: TimestampMs) -> KeyResponse {
        let resp = KeyResponse::consumed();
        let SessionState::Composing(comp) = &self.state else {
            return resp;
        };
        if comp.buffer.is_empty() {
            return resp;
        }

        let cooldown = self.settings.completion.cooldown_ms;
        if let Some(last) = self.last_dispatch_at {
            let elapsed = at.saturating_sub(last);
            if elapsed < cooldown {
                debug!(elapsed, cooldown, "completion request suppressed by cooldown");
                return resp;
            }
        }
        self.last_dispatch_at = Some(at);

        let mut resp = resp;
        resp.completion_request = Some(CompletionRequest {
            buffer: comp.buffer.clone(),
            best_candidate: comp.list.items().first().map(|c| c.text.clone()),
            scene: self.scene.clone(),
            generation: self.generation,
        });
        resp
    }
}

/// Map digit key 1–9 to a 0-based candidate index.
fn digit_index(n: u8) -> Option<usize> {
    (1..=9).contains(&n).then(|| usize::from(n) - 1)
}
