use std::task::{Context, Poll};

use futures::future::BoxFuture;
use grpcerr_core::{BoxError, Call, CallContext, ExposeStatusCode, encode_status_code};
use tower::{Layer, Service};

/// Server-side layer that publishes error status codes as response metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusEncoderLayer {
    _priv: (),
}

impl StatusEncoderLayer {
    pub const fn new() -> Self {
        Self { _priv: () }
    }
}

impl<S> Layer<S> for StatusEncoderLayer {
    type Service = StatusEncoder<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StatusEncoder { inner }
    }
}

/// Service produced by [`StatusEncoderLayer`]
///
/// Results pass through unchanged. When the inner service fails with an
/// error that exposes a status code, the code is attached to the call's
/// response header before the result is handed back to the transport.
///
/// Any error implementing [`StatusCoder`](grpcerr_core::StatusCoder) is
/// recognised, as is a boxed error with a
/// [`StatusError`](grpcerr_core::StatusError) in its source chain.
#[derive(Debug, Clone)]
pub struct StatusEncoder<S> {
    inner: S,
}

impl<S, T> Service<Call<T>> for StatusEncoder<S>
where
    S: Service<Call<T>>,
    S::Error: ExposeStatusCode + Into<BoxError>,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, call: Call<T>) -> Self::Future {
        let context = call.context().clone();
        let response = self.inner.call(call);

        Box::pin(async move {
            response.await.map_err(|err| {
                attach_status_code(&context, err.exposed_status_code());
                err.into()
            })
        })
    }
}

/// Best effort: a header that cannot be attached is logged, never returned
fn attach_status_code(context: &CallContext, status_code: Option<i64>) {
    let Some(status_code) = status_code else {
        return;
    };

    match context.set_header(encode_status_code(status_code)) {
        Ok(()) => tracing::debug!(status_code, "attached status code to response header"),
        Err(e) => tracing::warn!(status_code, error = %e, "failed to attach status code to response header"),
    }
}
