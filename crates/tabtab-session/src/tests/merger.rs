use tabtab_core::{Candidate, CandidateOrigin};

use crate::candidates::CandidateListState;

fn local(texts: &[&str]) -> Vec<Candidate> {
    texts
        .iter()
        .map(|t| Candidate {
            text: (*t).to_string(),
            origin: CandidateOrigin::DictionaryExact,
            weight: 100,
        })
        .collect()
}

fn ai(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| (*t).to_string()).collect()
}

#[test]
fn test_rebuild_keeps_ai_slice_for_same_generation() {
    let mut list = CandidateListState::new();
    list.rebuild_local(local(&["你", "尼"]), 1);
    list.append_ai(&ai(&["你好呀", "你好吗", "你们好"]), 1);
    assert_eq!(list.len(), 5);

    // Same generation, e.g. an arrival-order race with a panel refresh.
    list.rebuild_local(local(&["你", "尼"]), 1);
    assert_eq!(list.len(), 5, "AI slice survives");
}

#[test]
fn test_rebuild_drops_ai_slice_for_new_generation() {
    let mut list = CandidateListState::new();
    list.rebuild_local(local(&["你"]), 1);
    list.append_ai(&ai(&["你好呀", "你好吗", "你们好"]), 1);

    list.rebuild_local(local(&["你", "你好"]), 2);
    assert_eq!(list.len(), 2);
    assert!(list
        .items()
        .iter()
        .all(|c| c.origin != CandidateOrigin::AiCompletion));
}

#[test]
fn test_append_replaces_previous_ai_slice() {
    let mut list = CandidateListState::new();
    list.rebuild_local(local(&["你"]), 1);
    list.append_ai(&ai(&["a1", "a2", "a3"]), 1);
    list.append_ai(&ai(&["b1", "b2", "b3"]), 1);

    assert_eq!(list.len(), 4);
    assert_eq!(list.items()[1].text, "b1");
}

#[test]
fn test_append_to_empty_list_selects_first() {
    let mut list = CandidateListState::new();
    list.rebuild_local(Vec::new(), 1);
    list.append_ai(&ai(&["a1", "a2", "a3"]), 1);
    assert_eq!(list.selected(), 0);
    assert_eq!(list.len(), 3);
}

#[test]
fn test_selection_survives_in_bounds_rebuild() {
    let mut list = CandidateListState::new();
    list.rebuild_local(local(&["你", "尼", "妮"]), 1);
    list.move_selection(1);
    assert_eq!(list.selected(), 1);

    list.rebuild_local(local(&["好", "号"]), 2);
    assert_eq!(list.selected(), 1, "index still in bounds");
}

#[test]
fn test_selection_resets_when_out_of_bounds() {
    let mut list = CandidateListState::new();
    list.rebuild_local(local(&["你", "尼", "妮"]), 1);
    list.move_selection(1);
    list.move_selection(1);
    assert_eq!(list.selected(), 2);

    list.rebuild_local(local(&["好"]), 2);
    assert_eq!(list.selected(), 0);
}

#[test]
fn test_move_selection_clamps_at_both_ends() {
    let mut list = CandidateListState::new();
    list.rebuild_local(local(&["你", "尼"]), 1);

    assert!(!list.move_selection(-1), "already at the top");
    assert!(list.move_selection(1));
    assert!(!list.move_selection(1), "already at the bottom");
    assert_eq!(list.selected(), 1);
}

#[test]
fn test_commit_text_out_of_range() {
    let mut list = CandidateListState::new();
    list.rebuild_local(local(&["你"]), 1);

    assert_eq!(list.commit_text(0).unwrap(), "你");
    let err = list.commit_text(3).unwrap_err();
    assert_eq!(err.index, 3);
    assert_eq!(err.len, 1);
}
