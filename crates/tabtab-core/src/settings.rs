//! Engine settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - `Settings::defaults()` parses the embedded defaults for tests and
//!   per-session overrides without touching the global
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub gesture: GestureSettings,
    pub completion: CompletionSettings,
    pub matcher: MatcherSettings,
}

impl Settings {
    /// Parse the embedded defaults. Infallible because the embedded TOML is
    /// validated by tests.
    pub fn defaults() -> Settings {
        parse_settings_toml(DEFAULT_SETTINGS_TOML).expect("embedded defaults must be valid")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GestureSettings {
    pub double_tap_window_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionSettings {
    pub cooldown_ms: u64,
    pub max_chars: usize,
    pub endpoint: String,
    pub model: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatcherSettings {
    pub min_results: usize,
    pub typo_length: usize,
    pub max_candidates: usize,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let settings: Settings =
        toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    fn invalid(field: &str, reason: &str) -> SettingsError {
        SettingsError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    if s.gesture.double_tap_window_ms == 0 {
        return Err(invalid("gesture.double_tap_window_ms", "must be positive"));
    }
    if s.completion.max_chars == 0 {
        return Err(invalid("completion.max_chars", "must be positive"));
    }
    if s.completion.timeout_ms == 0 {
        return Err(invalid("completion.timeout_ms", "must be positive"));
    }
    if s.completion.endpoint.is_empty() {
        return Err(invalid("completion.endpoint", "must not be empty"));
    }
    if s.completion.model.is_empty() {
        return Err(invalid("completion.model", "must not be empty"));
    }
    if s.matcher.max_candidates == 0 {
        return Err(invalid("matcher.max_candidates", "must be positive"));
    }
    Ok(())
}
