use std::error::Error;
use std::fmt;

use thiserror::Error;

/// Boxed error flowing through the middleware pipeline
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Errors that expose an application-defined status code
pub trait StatusCoder {
    /// Status code classifying this error
    fn status_code(&self) -> i64;
}

/// Errors that may expose a status code
///
/// Every [`StatusCoder`] exposes its own code. Boxed errors expose the code of
/// the first [`StatusError`] in their source chain.
pub trait ExposeStatusCode {
    /// Status code exposed by this error, if any
    fn exposed_status_code(&self) -> Option<i64>;
}

impl<T: StatusCoder + ?Sized> ExposeStatusCode for T {
    fn exposed_status_code(&self) -> Option<i64> {
        Some(self.status_code())
    }
}

impl ExposeStatusCode for BoxError {
    fn exposed_status_code(&self) -> Option<i64> {
        status_code_of(&**self)
    }
}

impl ExposeStatusCode for tonic::Status {
    fn exposed_status_code(&self) -> Option<i64> {
        status_code_of(self)
    }
}

impl ExposeStatusCode for std::io::Error {
    fn exposed_status_code(&self) -> Option<i64> {
        status_code_of(self)
    }
}

impl<T: StatusCoder + ?Sized> StatusCoder for Box<T> {
    fn status_code(&self) -> i64 {
        (**self).status_code()
    }
}

/// Shape of error a call site expects to receive
///
/// The client decoder only rewraps errors when the configured shape declares
/// that it carries a status code. Types opt in by overriding the constant.
pub trait ErrorPrototype {
    /// Whether errors of this shape expose a status code
    const CARRIES_STATUS_CODE: bool = false;
}

/// An error paired with an application status code
///
/// Presentation is delegated to the wrapped error: `Display` and `source`
/// match the original, so wrapping never changes what a caller sees beyond
/// the added status code.
#[derive(Debug)]
pub struct StatusError {
    inner: BoxError,
    status_code: i64,
}

impl StatusError {
    /// Wrap `err` with `status_code`
    pub fn new(err: impl Into<BoxError>, status_code: i64) -> Self {
        Self {
            inner: err.into(),
            status_code,
        }
    }

    /// Wrap an error that already knows its own status code
    pub fn from_coder<E>(err: E) -> Self
    where
        E: StatusCoder + Into<BoxError>,
    {
        let status_code = err.status_code();
        Self::new(err, status_code)
    }

    /// The wrapped error
    pub fn get_ref(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.inner
    }

    /// Consume the wrapper, returning the wrapped error
    pub fn into_inner(self) -> BoxError {
        self.inner
    }
}

impl StatusCoder for StatusError {
    fn status_code(&self) -> i64 {
        self.status_code
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl Error for StatusError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source()
    }
}

impl ErrorPrototype for StatusError {
    const CARRIES_STATUS_CODE: bool = true;
}

impl ErrorPrototype for BoxError {}

impl ErrorPrototype for tonic::Status {}

impl ErrorPrototype for std::io::Error {}

/// Attach `status_code` to `err`
///
/// Returns `None` when there is no error to wrap, so a successful call is
/// never turned into a failure.
pub fn wrap<E>(err: Option<E>, status_code: i64) -> Option<StatusError>
where
    E: Into<BoxError>,
{
    err.map(|err| StatusError::new(err, status_code))
}

/// Status code exposed by `err` or any error in its source chain
pub fn status_code_of(err: &(dyn Error + 'static)) -> Option<i64> {
    std::iter::successors(Some(err), |&e| e.source())
        .find_map(|e| e.downcast_ref::<StatusError>().map(StatusCoder::status_code))
}

/// Failure to attach a response header to a call
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    /// The call's response header was already attached
    #[error("response header already sent for this call")]
    AlreadySent,
}

/// Status code metadata that could not be decoded
#[derive(Debug, Error)]
pub enum InvalidStatusCode {
    /// Value contains bytes outside visible ASCII
    #[error("status code metadata is not valid ASCII")]
    NotAscii(#[source] tonic::metadata::errors::ToStrError),

    /// Value is not a base-10 integer
    #[error("status code metadata {value:?} is not a base-10 integer")]
    NotInteger {
        /// Raw metadata value
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}
