//! AI completion: prompt construction, strict reply parsing, and the
//! asynchronous gateway that talks to the external service.
//!
//! The service contract is narrow on purpose: the reply must be a JSON array
//! of exactly three mutually distinct strings, each within the configured
//! character budget. Anything else drops the whole round — local candidates
//! are never contaminated by a half-valid reply.

mod backend;
mod gateway;

pub use backend::{CompletionBackend, OllamaBackend};
pub use gateway::{CompletionGateway, CompletionOutcome};

/// Completions per round. The prompt requests this many and the parser
/// rejects any other count.
pub const COMPLETION_COUNT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion transport error: {0}")]
    Transport(String),

    #[error("completion reply is not a JSON string array: {0}")]
    Malformed(String),

    #[error("expected exactly {COMPLETION_COUNT} completions, got {0}")]
    WrongCount(usize),

    #[error("empty completion string in reply")]
    EmptyCompletion,

    #[error("completion {text:?} exceeds the {budget}-char budget")]
    OverBudget { text: String, budget: usize },

    #[error("duplicate completion {0:?} in reply")]
    Duplicate(String),
}

/// Snapshot sent to the completion service. Immutable once constructed;
/// `generation` ties it to the phonetic-buffer revision it was taken from.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub buffer: String,
    pub best_candidate: Option<String>,
    pub scene: String,
    pub generation: u64,
}

/// Build the instruction prompt for one completion round.
pub fn build_prompt(request: &CompletionRequest, max_chars: usize) -> String {
    let mut input = request.buffer.clone();
    if let Some(best) = &request.best_candidate {
        input.push(' ');
        input.push_str(best);
    }
    format!(
        "Continue the user's text. Reply with a JSON array of exactly \
         {COMPLETION_COUNT} strings and nothing else — no explanation, no \
         markdown. Rules: 1. exactly {COMPLETION_COUNT} entries, no more, no \
         less; 2. the entries must all differ from each other, as varied as \
         possible; 3. each entry must be under {max_chars} characters; 4. the \
         user types pinyin and may make typos or use fuzzy spellings — \
         correct them from context. Scene: {scene}. The user's input is: \
         {input}",
        scene = request.scene,
    )
}

/// Parse and validate a service reply. All-or-nothing: any violation
/// rejects every completion in the round.
pub fn parse_reply(raw: &str, max_chars: usize) -> Result<Vec<String>, CompletionError> {
    let completions: Vec<String> = serde_json::from_str(raw.trim())
        .map_err(|e| CompletionError::Malformed(e.to_string()))?;

    if completions.len() != COMPLETION_COUNT {
        return Err(CompletionError::WrongCount(completions.len()));
    }

    let mut cleaned = Vec::with_capacity(COMPLETION_COUNT);
    for completion in &completions {
        let text = completion.trim();
        if text.is_empty() {
            return Err(CompletionError::EmptyCompletion);
        }
        if text.chars().count() > max_chars {
            return Err(CompletionError::OverBudget {
                text: text.to_string(),
                budget: max_chars,
            });
        }
        if cleaned.contains(&text.to_string()) {
            return Err(CompletionError::Duplicate(text.to_string()));
        }
        cleaned.push(text.to_string());
    }

    Ok(cleaned)
}
