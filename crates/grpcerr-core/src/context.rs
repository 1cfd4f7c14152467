use std::sync::{Arc, OnceLock};

use tonic::metadata::MetadataMap;

use crate::HeaderError;

/// Out-of-band state for a single call
///
/// Clones share the same response header slot. On the server the header is
/// attached by middleware and flushed by the transport; on the client the
/// transport records the header it received and middleware reads it.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    header: Arc<OnceLock<MetadataMap>>,
}

impl CallContext {
    /// Context for a new call with no response header yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the response header for this call
    ///
    /// A call carries at most one response header.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::AlreadySent`] if a header was already attached
    pub fn set_header(&self, header: MetadataMap) -> Result<(), HeaderError> {
        self.header.set(header).map_err(|_| HeaderError::AlreadySent)
    }

    /// Response header attached to this call, if any
    pub fn header(&self) -> Option<&MetadataMap> {
        self.header.get()
    }
}

/// A request message travelling with its call context
#[derive(Debug)]
pub struct Call<T> {
    context: CallContext,
    message: T,
}

impl<T> Call<T> {
    /// Start a call with a fresh context
    pub fn new(message: T) -> Self {
        Self::with_context(CallContext::new(), message)
    }

    /// Start a call with an existing context
    pub const fn with_context(context: CallContext, message: T) -> Self {
        Self { context, message }
    }

    pub const fn context(&self) -> &CallContext {
        &self.context
    }

    pub const fn message(&self) -> &T {
        &self.message
    }

    pub fn into_message(self) -> T {
        self.message
    }

    pub fn into_parts(self) -> (CallContext, T) {
        (self.context, self.message)
    }
}
