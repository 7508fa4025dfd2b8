use super::{make_session, type_string};
use crate::{CandidateAction, KeyEvent};

// Default window is 400 ms, default cooldown 3000 ms (see
// default_settings.toml in tabtab-core).

#[test]
fn test_first_confirm_arms_timer_without_committing() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);

    let resp = session.handle_key(KeyEvent::Confirm, 100);
    assert!(resp.consumed);
    assert!(resp.commit.is_none(), "single press must not commit yet");
    assert_eq!(resp.gesture_deadline, Some(500));
    assert!(session.is_composing());
}

#[test]
fn test_tick_before_deadline_is_noop() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);
    session.handle_key(KeyEvent::Confirm, 100);

    assert!(session.tick(499).is_none());
    assert!(session.is_composing());
}

#[test]
fn test_single_tap_commits_on_timeout() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);
    session.handle_key(KeyEvent::Confirm, 100);

    let resp = session.tick(500).expect("deadline reached");
    assert_eq!(resp.commit.as_deref(), Some("你好"));
    assert!(matches!(resp.candidates, CandidateAction::Hide));
    assert!(!session.is_composing());
    assert_eq!(session.buffer(), "");
}

#[test]
fn test_single_tap_timeout_with_zero_candidates_still_clears() {
    let mut session = make_session();
    type_string(&mut session, "qqqq", 0);
    assert!(session.candidates().is_empty());

    session.handle_key(KeyEvent::Confirm, 100);
    let resp = session.tick(600).expect("deadline reached");
    assert!(resp.commit.is_none(), "no-op commit");
    assert!(!session.is_composing(), "buffer still clears");
}

#[test]
fn test_double_tap_dispatches_completion_request() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);

    session.handle_key(KeyEvent::Confirm, 1000);
    let resp = session.handle_key(KeyEvent::Confirm, 1250);

    assert!(resp.consumed);
    assert!(resp.commit.is_none());
    let request = resp.completion_request.expect("double tap dispatches");
    assert_eq!(request.buffer, "nihao");
    assert_eq!(request.best_candidate.as_deref(), Some("你好"));
    assert_eq!(request.generation, session.generation());
    assert!(session.is_composing(), "typing is never blocked");
}

#[test]
fn test_press_outside_window_is_not_a_double_tap() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);

    session.handle_key(KeyEvent::Confirm, 1000);
    // Second press 400 ms later — exactly at the window edge, too late.
    let resp = session.handle_key(KeyEvent::Confirm, 1400);

    assert!(resp.completion_request.is_none());
    // The expired first tap commits; the second press lands in idle.
    assert_eq!(resp.commit.as_deref(), Some("你好"));
    assert!(!session.is_composing());
}

#[test]
fn test_cooldown_suppresses_second_dispatch() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);

    session.handle_key(KeyEvent::Confirm, 1000);
    let first = session.handle_key(KeyEvent::Confirm, 1200);
    assert!(first.completion_request.is_some());

    // Another double tap 1 s later, well inside the 3 s cooldown.
    session.handle_key(KeyEvent::Confirm, 2200);
    let second = session.handle_key(KeyEvent::Confirm, 2400);
    assert!(second.completion_request.is_none(), "silently dropped");
    assert!(session.is_composing(), "local candidates remain usable");
}

#[test]
fn test_dispatch_allowed_after_cooldown() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);

    session.handle_key(KeyEvent::Confirm, 1000);
    assert!(session
        .handle_key(KeyEvent::Confirm, 1200)
        .completion_request
        .is_some());

    session.handle_key(KeyEvent::Confirm, 5000);
    let resp = session.handle_key(KeyEvent::Confirm, 5200);
    assert!(resp.completion_request.is_some());
}

#[test]
fn test_double_tap_in_idle_is_noop() {
    let mut session = make_session();
    let first = session.handle_key(KeyEvent::Confirm, 0);
    let second = session.handle_key(KeyEvent::Confirm, 100);
    assert!(!first.consumed);
    assert!(!second.consumed);
    assert!(second.completion_request.is_none());
}

#[test]
fn test_typed_char_resolves_pending_tap_as_commit() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);
    session.handle_key(KeyEvent::Confirm, 100);

    // A letter 100 ms later proves this is not going to be a double tap.
    let resp = session.handle_key(KeyEvent::Char('w'), 200);
    assert_eq!(resp.commit.as_deref(), Some("你好"));
    assert_eq!(session.buffer(), "w", "new composition starts after commit");
}

#[test]
fn test_confirm_then_digit_commits_that_index() {
    let mut session = make_session();
    type_string(&mut session, "ni", 0);
    let second = session.candidates()[1].text.clone();

    session.handle_key(KeyEvent::Confirm, 100);
    let resp = session.handle_key(KeyEvent::Digit(2), 200);
    assert_eq!(resp.commit.as_deref(), Some(second.as_str()));
    assert!(!session.is_composing());
    assert!(session.tick(600).is_none(), "timer was cancelled");
}

#[test]
fn test_confirm_then_out_of_range_digit_is_noop() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);

    session.handle_key(KeyEvent::Confirm, 100);
    let resp = session.handle_key(KeyEvent::Digit(9), 200);
    assert!(resp.commit.is_none());
    assert!(session.is_composing(), "state untouched on out-of-range commit");
}

#[test]
fn test_escape_during_gesture_cancels_without_commit() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);
    session.handle_key(KeyEvent::Confirm, 100);

    let resp = session.handle_key(KeyEvent::Escape, 200);
    // Cancel is unconditional: the pending tap is abandoned, nothing is
    // inserted into the target.
    assert!(resp.commit.is_none());
    assert!(resp.consumed);
    assert!(matches!(resp.candidates, CandidateAction::Hide));
    assert!(!session.is_composing());
    assert!(session.tick(600).is_none(), "timer was cancelled");
}

#[test]
fn test_focus_loss_during_gesture_cancels_without_commit() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);
    session.handle_key(KeyEvent::Confirm, 100);

    let resp = session.handle_key(KeyEvent::FocusLost, 200);
    assert!(resp.commit.is_none());
    assert!(!resp.consumed);
    assert!(matches!(resp.candidates, CandidateAction::Hide));
    assert!(!session.is_composing());
    assert!(session.tick(600).is_none(), "timer was cancelled");
}
