//! Carry application status codes across RPC boundaries
//!
//! A pair of tower layers. [`StatusEncoderLayer`] sits on the server and
//! publishes the status code of a failed call as response metadata under
//! [`STATUS_CODE_KEY`]. [`StatusDecoderLayer`] sits on the client, reads that
//! metadata back and rewraps the returned error in a [`StatusError`] when the
//! call site expects status-carrying errors.
//!
//! ```ignore
//! let server = ServiceBuilder::new().layer(grpcerr::status_encoder()).service(handler);
//! let client = ServiceBuilder::new()
//!     .layer(grpcerr::status_decoder::<StatusError>().with_config(&config.decoder))
//!     .service(transport);
//! ```

#![allow(clippy::must_use_candidate)]

mod decoder;
mod encoder;
pub mod transport;

pub use decoder::{StatusDecoder, StatusDecoderLayer};
pub use encoder::{StatusEncoder, StatusEncoderLayer};
pub use grpcerr_config::{Config, DecoderConfig, InvalidStatusCodePolicy};
pub use grpcerr_core::{
    BoxError, Call, CallContext, ErrorPrototype, ExposeStatusCode, HeaderError, InvalidStatusCode, STATUS_CODE_KEY, StatusCoder,
    StatusError, status_code_of, wrap,
};

/// Server-side middleware publishing error status codes
pub const fn status_encoder() -> StatusEncoderLayer {
    StatusEncoderLayer::new()
}

/// Client-side middleware restoring status codes for call sites expecting `P`
pub const fn status_decoder<P: ErrorPrototype>() -> StatusDecoderLayer {
    StatusDecoderLayer::new::<P>()
}
