use grpcerr_core::{BoxError, CallContext};
use tonic::metadata::{KeyAndValueRef, MetadataMap};

/// Convert an endpoint result into a tonic reply, flushing the call's header
///
/// Errors become a `tonic::Status` via [`tonic::Status::from_error`]; the
/// response header is merged into whichever side is returned.
///
/// # Errors
///
/// Returns the converted `tonic::Status` when `result` is an error
#[allow(clippy::result_large_err)]
pub fn into_tonic<T>(
    context: &CallContext,
    result: Result<T, BoxError>,
) -> Result<tonic::Response<T>, tonic::Status> {
    match result {
        Ok(message) => {
            let mut response = tonic::Response::new(message);
            flush_header(context, response.metadata_mut());
            Ok(response)
        }
        Err(err) => {
            let mut status = tonic::Status::from_error(err);
            flush_header(context, status.metadata_mut());
            Err(status)
        }
    }
}

fn flush_header(context: &CallContext, target: &mut MetadataMap) {
    let Some(header) = context.header() else {
        return;
    };

    for entry in header.iter() {
        match entry {
            KeyAndValueRef::Ascii(key, value) => {
                target.append(key.clone(), value.clone());
            }
            KeyAndValueRef::Binary(key, value) => {
                target.append_bin(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use grpcerr_core::{STATUS_CODE_KEY, StatusError, encode_status_code};

    use super::*;

    #[test]
    fn header_lands_on_status() {
        let context = CallContext::new();
        context.set_header(encode_status_code(404)).unwrap();

        let status = into_tonic::<()>(&context, Err(StatusError::new("not found", 404).into())).unwrap_err();

        assert_eq!(status.code(), tonic::Code::Unknown);
        assert_eq!(status.message(), "not found");
        assert_eq!(status.metadata().get(STATUS_CODE_KEY).unwrap().to_str().unwrap(), "404");
    }

    #[test]
    fn status_errors_keep_their_code() {
        let context = CallContext::new();

        let status =
            into_tonic::<()>(&context, Err(tonic::Status::permission_denied("nope").into())).unwrap_err();

        assert_eq!(status.code(), tonic::Code::PermissionDenied);
        assert!(status.metadata().get(STATUS_CODE_KEY).is_none());
    }

    #[test]
    fn header_lands_on_response() {
        let context = CallContext::new();
        context.set_header(encode_status_code(7)).unwrap();

        let response = into_tonic(&context, Ok("pong")).unwrap();

        assert_eq!(response.metadata().get(STATUS_CODE_KEY).unwrap().to_str().unwrap(), "7");
        assert_eq!(response.into_inner(), "pong");
    }

    #[test]
    fn no_header_no_metadata() {
        let response = into_tonic(&CallContext::new(), Ok("pong")).unwrap();
        assert!(response.metadata().is_empty());
    }
}
