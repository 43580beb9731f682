use thiserror::Error;

/// Core error type shared across worksim crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The run configuration is malformed before any ratio checks run.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results returned by worksim crates.
pub type Result<T> = std::result::Result<T, Error>;
