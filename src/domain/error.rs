//! Domain error types.

/// Top-level error type for postester.
#[derive(Debug, thiserror::Error)]
pub enum PostesterError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("unknown indicator '{name}'")]
    UnknownIndicator { name: String },

    #[error("indicator '{name}' is already registered")]
    DuplicateIndicator { name: String },

    #[error("cyclic indicator dependency: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("indicator '{indicator}' read missing or undeclared cache key '{key}'")]
    MissingDependency { indicator: String, key: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PostesterError> for std::process::ExitCode {
    fn from(err: &PostesterError) -> Self {
        let code: u8 = match err {
            PostesterError::Io(_) => 1,
            PostesterError::ConfigParse { .. }
            | PostesterError::ConfigMissing { .. }
            | PostesterError::ConfigInvalid { .. } => 2,
            PostesterError::Data { .. } => 3,
            PostesterError::InvalidInput { .. } => 4,
            PostesterError::UnknownIndicator { .. }
            | PostesterError::DuplicateIndicator { .. }
            | PostesterError::CyclicDependency { .. }
            | PostesterError::MissingDependency { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
