use thiserror::Error;

#[derive(Error, Debug)]
pub enum CivicEyeError {
    /// An optional model capability is missing, timed out, or errored.
    /// Always recovered locally by the cascade as "no vote"; never retried.
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Submission carries neither text nor image. The intake layer rejects
    /// these before the pipeline runs; the pipeline itself degrades to the
    /// terminal fallback instead of failing.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Invariant violation inside the similarity index. Programming error,
    /// fatal; an incorrect duplicate verdict must not be produced silently.
    #[error("Index corruption: {0}")]
    IndexCorruption(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
