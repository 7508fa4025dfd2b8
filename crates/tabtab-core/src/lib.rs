//! Core engine for the TabTab pinyin input method.
//!
//! Pure, platform-free building blocks: the dictionary index, the candidate
//! matcher, the AI completion gateway, and the settings loader. Everything
//! stateful about an editing session (buffer, gesture, candidate list) lives
//! in `tabtab-session` on top of this crate.

pub mod completion;
pub mod dict;
pub mod matcher;
pub mod settings;

pub use dict::{DictEntry, DictError, PinyinDictionary};
pub use matcher::{match_candidates, Candidate, CandidateOrigin};
