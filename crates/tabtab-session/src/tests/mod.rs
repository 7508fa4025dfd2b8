mod completion;
mod gesture;
mod merger;

use std::sync::Arc;

use tabtab_core::settings::Settings;
use tabtab_core::PinyinDictionary;

use crate::{InputSession, KeyEvent, KeyResponse, TimestampMs};

pub(crate) fn make_test_dict() -> Arc<PinyinDictionary> {
    Arc::new(
        PinyinDictionary::from_str_strict(
            "\
你\tni\t500
尼\tni\t200
你好\tni hao\t900
好\thao\t400
我\two\t600
是\tshi\t500
",
        )
        .unwrap(),
    )
}

pub(crate) fn make_session() -> InputSession {
    InputSession::new(make_test_dict(), Settings::defaults())
}

/// Type a string of phonetic characters at the given timestamp, returning
/// the last response.
pub(crate) fn type_string(
    session: &mut InputSession,
    text: &str,
    at: TimestampMs,
) -> KeyResponse {
    let mut last = None;
    for ch in text.chars() {
        last = Some(session.handle_key(KeyEvent::Char(ch), at));
    }
    last.expect("type_string requires a non-empty string")
}
