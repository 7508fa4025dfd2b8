use tabtab_core::completion::CompletionOutcome;
use tabtab_core::CandidateOrigin;

use super::{make_session, type_string};
use crate::{CandidateAction, KeyEvent};

fn outcome(generation: u64) -> CompletionOutcome {
    CompletionOutcome {
        generation,
        completions: vec![
            "你好呀".to_string(),
            "你好吗？".to_string(),
            "你好，最近怎么样".to_string(),
        ],
    }
}

/// Drive the double tap and return the dispatched generation.
fn dispatch(session: &mut crate::InputSession, at: u64) -> u64 {
    session.handle_key(KeyEvent::Confirm, at);
    let resp = session.handle_key(KeyEvent::Confirm, at + 200);
    resp.completion_request.expect("dispatch expected").generation
}

#[test]
fn test_ai_candidates_append_after_local() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);
    let local_count = session.candidates().len();
    assert!(local_count > 0);

    let generation = dispatch(&mut session, 1000);
    let resp = session
        .receive_completions(&outcome(generation))
        .expect("current generation applies");

    let items = session.candidates();
    assert_eq!(items.len(), local_count + 3);
    assert_eq!(items[0].text, "你好", "local candidates keep their slots");
    assert!(items[local_count..]
        .iter()
        .all(|c| c.origin == CandidateOrigin::AiCompletion));
    assert!(matches!(resp.candidates, CandidateAction::Show { .. }));
}

#[test]
fn test_ai_append_preserves_selection() {
    let mut session = make_session();
    type_string(&mut session, "ni", 0);
    session.handle_key(KeyEvent::ArrowDown, 10);
    assert_eq!(session.selected_index(), 1);

    let generation = dispatch(&mut session, 1000);
    session.receive_completions(&outcome(generation)).unwrap();
    assert_eq!(session.selected_index(), 1, "never steal a user selection");
}

#[test]
fn test_stale_generation_discarded() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);
    let generation = dispatch(&mut session, 1000);

    // The user keeps typing before the reply lands.
    type_string(&mut session, "m", 2000);
    let before: Vec<_> = session.candidates().to_vec();

    assert!(session.receive_completions(&outcome(generation)).is_none());
    assert_eq!(session.candidates(), before.as_slice(), "list untouched");
}

#[test]
fn test_outcome_after_commit_discarded() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);
    let generation = dispatch(&mut session, 1000);

    session.handle_key(KeyEvent::Enter, 2000);
    assert!(!session.is_composing());
    assert!(session.receive_completions(&outcome(generation)).is_none());
}

#[test]
fn test_ai_slice_dropped_when_buffer_changes() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);
    let generation = dispatch(&mut session, 1000);
    session.receive_completions(&outcome(generation)).unwrap();
    assert!(session
        .candidates()
        .iter()
        .any(|c| c.origin == CandidateOrigin::AiCompletion));

    // Any buffer edit rebuilds the list for a new generation.
    session.handle_key(KeyEvent::Backspace, 2000);
    assert!(session
        .candidates()
        .iter()
        .all(|c| c.origin != CandidateOrigin::AiCompletion));
}

#[test]
fn test_digit_can_select_ai_candidate() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);
    let local_count = session.candidates().len();
    let generation = dispatch(&mut session, 1000);
    session.receive_completions(&outcome(generation)).unwrap();

    let index = local_count + 1; // second AI entry
    let expected = session.candidates()[index].text.clone();
    let resp = session.handle_key(KeyEvent::Digit(index as u8 + 1), 2000);
    assert_eq!(resp.commit.as_deref(), Some(expected.as_str()));
}

#[test]
fn test_repeated_outcome_replaces_ai_slice() {
    let mut session = make_session();
    type_string(&mut session, "nihao", 0);
    let local_count = session.candidates().len();
    let generation = dispatch(&mut session, 1000);

    session.receive_completions(&outcome(generation)).unwrap();
    session.receive_completions(&outcome(generation)).unwrap();
    assert_eq!(session.candidates().len(), local_count + 3, "no duplication");
}
