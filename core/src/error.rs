//! Error types for keyword selection.

/// Errors raised while loading data or configuring a search.
///
/// Search-time conditions (no feasible particle, stagnation, cancellation)
/// are not errors; they are reported in [`crate::swarm::SwarmOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum KeyswarmError {
    /// A corpus row is missing a column or carries an invalid label.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// No records were loaded.
    #[error("corpus is empty")]
    EmptyCorpus,

    /// No usable candidate keyword was supplied.
    #[error("candidate keyword list is empty")]
    EmptyCandidateList,

    /// Codebook lookup outside `[0, max]`.
    #[error("keyword index {index} out of range [0, {max}]")]
    IndexOutOfRange { index: usize, max: usize },

    /// Hyperparameters or bounds rejected before the search starts.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias using KeyswarmError.
pub type Result<T> = std::result::Result<T, KeyswarmError>;
