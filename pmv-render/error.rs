use std::sync::Arc;

use pmv_host::HostError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("invalid pattern for template `{base}`: {error}")]
    TemplatePattern {
        base: String,
        error: Arc<regex::Error>,
    },
    #[error("no printer named `{0}`")]
    UnknownPrinter(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Problems with a `pmv.toml` settings file.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Toml(#[from] toml_edit::TomlError),
    #[error("expected table: {0}")]
    ExpectedTable(String),
    #[error("expected string: {0}")]
    ExpectedString(String),
    #[error("expected array of strings: {0}")]
    ExpectedStringArray(String),
    #[error("expected non-negative integer: {0}")]
    ExpectedInteger(String),
    #[error("unknown key: {0}")]
    UnknownKey(String),
}
