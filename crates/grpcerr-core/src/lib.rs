//! Status-carrying errors and the per-call context they travel with
//!
//! An application attaches a numeric status code to an error with [`wrap`].
//! The code crosses the wire as a single response metadata entry keyed by
//! [`STATUS_CODE_KEY`], leaving request and response payloads untouched.

#![allow(clippy::must_use_candidate)]

mod context;
mod error;
mod metadata;

pub use context::{Call, CallContext};
pub use error::{
    BoxError, ErrorPrototype, ExposeStatusCode, HeaderError, InvalidStatusCode, StatusCoder, StatusError, status_code_of, wrap,
};
pub use metadata::{STATUS_CODE_KEY, decode_status_code, encode_status_code};
