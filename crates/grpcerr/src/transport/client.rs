use grpcerr_core::{BoxError, CallContext};

/// Record the metadata of a tonic reply on the client call, then unwrap it
///
/// Empty metadata is not recorded, so the call context only carries a
/// response header when the server actually sent one.
///
/// # Errors
///
/// Returns the received `tonic::Status` as a boxed error
pub fn receive<T>(context: &CallContext, result: Result<tonic::Response<T>, tonic::Status>) -> Result<T, BoxError> {
    let metadata = match &result {
        Ok(response) => response.metadata(),
        Err(status) => status.metadata(),
    };

    if !metadata.is_empty()
        && let Err(e) = context.set_header(metadata.clone())
    {
        tracing::warn!(error = %e, "dropping duplicate response header");
    }

    result.map(tonic::Response::into_inner).map_err(Into::into)
}
