//! Bridge between [`Call`](grpcerr_core::Call) pipelines and tonic metadata
//!
//! The server half flushes a call's response header into the outgoing
//! `tonic::Response` or `tonic::Status`. The client half records the
//! metadata of whatever came back so the decoder can read it.

pub mod client;
pub mod server;
