use serde::{Deserialize, Serialize};

/// One dictionary word with its frequency weight. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictEntry {
    pub text: String,
    pub weight: u32,
}

impl DictEntry {
    pub fn new(text: impl Into<String>, weight: u32) -> Self {
        Self {
            text: text.into(),
            weight,
        }
    }
}
