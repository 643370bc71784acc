use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure surface of the exchange core.
///
/// Queue-full rejections and empty frame pulls are ordinary return values
/// (`bool` / `Option`), not errors. The fatal conditions are a rejected
/// configuration and a failed tick-thread launch, both surfaced before the
/// simulation loop starts.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration rejected during validation at startup.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Propagated I/O errors (tick-thread spawn).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
