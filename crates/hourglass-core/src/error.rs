/// Errors that can occur across the hourglass workspace.
///
/// Library crates use this type directly; the binary converts to
/// `miette` diagnostics at the boundary. Inside the analytics engine the
/// only variant ever raised is [`HourglassError::InvalidWorkingHours`].
///
/// # Examples
///
/// ```
/// use hourglass_core::HourglassError;
///
/// let err = HourglassError::InvalidWorkingHours("9-x".into());
/// assert!(err.to_string().contains("9-x"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum HourglassError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Git operation failure.
    #[error("git error: {0}")]
    Git(String),

    /// A manual working-hour override that is not a valid `start-end` pair.
    #[error("invalid working hours '{0}': expected \"start-end\" with 0 <= start < end <= 23")]
    InvalidWorkingHours(String),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
