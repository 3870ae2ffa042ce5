use thiserror::Error;

/// Errors returned by the data codec and by [`Meter::safe_call()`][crate::Meter::safe_call].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A log line was expected to contain an encoded [`MeterData`][crate::MeterData] payload
    /// but no `{...}` section was found in it.
    #[error("no meter data payload found in line: '{line}'")]
    MissingPayload {
        /// The line that was searched.
        line: String,
    },

    /// The payload was found but is not a valid encoding of meter data.
    #[error("malformed meter data payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The work wrapped by [`Meter::safe_call()`][crate::Meter::safe_call] returned an error.
    ///
    /// The original error is available via [`std::error::Error::source()`].
    #[error("metered operation failed")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A specialized `Result` type for meter operations, returning the crate's [`Error`] type as
/// the error value.
pub type Result<T> = std::result::Result<T, Error>;
