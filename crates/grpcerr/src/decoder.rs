use std::task::{Context, Poll};

use futures::future::BoxFuture;
use grpcerr_config::{DecoderConfig, InvalidStatusCodePolicy};
use grpcerr_core::{BoxError, Call, CallContext, ErrorPrototype, StatusError, decode_status_code};
use tower::{Layer, Service};

/// Client-side layer that restores status codes from response metadata
///
/// Whether errors are rewrapped is decided once, at construction, from the
/// error prototype the call site expects.
#[derive(Debug, Clone, Copy)]
pub struct StatusDecoderLayer {
    carries_status_code: bool,
    on_invalid_status_code: InvalidStatusCodePolicy,
}

impl StatusDecoderLayer {
    /// Decoder for call sites expecting errors shaped like `P`
    pub const fn new<P: ErrorPrototype>() -> Self {
        Self {
            carries_status_code: P::CARRIES_STATUS_CODE,
            on_invalid_status_code: InvalidStatusCodePolicy::Preserve,
        }
    }

    /// Set the handling of status code metadata that fails to parse
    #[must_use]
    pub const fn on_invalid_status_code(self, policy: InvalidStatusCodePolicy) -> Self {
        Self {
            on_invalid_status_code: policy,
            ..self
        }
    }

    /// Apply settings from configuration
    #[must_use]
    pub const fn with_config(self, config: &DecoderConfig) -> Self {
        self.on_invalid_status_code(config.on_invalid_status_code)
    }

    /// Whether the configured prototype can carry a status code
    pub const fn carries_status_code(self) -> bool {
        self.carries_status_code
    }

    fn decode<R>(self, context: &CallContext, result: Result<R, BoxError>) -> Result<R, BoxError> {
        let Some(header) = context.header() else {
            tracing::trace!("no response header, passing result through");
            return result;
        };

        let status_code = match decode_status_code(header) {
            None => return result,
            Some(Ok(status_code)) => status_code,
            Some(Err(e)) => {
                return match self.on_invalid_status_code {
                    InvalidStatusCodePolicy::Preserve => {
                        tracing::warn!(error = %e, policy = "preserve", "ignoring invalid status code metadata");
                        result
                    }
                    InvalidStatusCodePolicy::Surface => {
                        tracing::warn!(error = %e, policy = "surface", "invalid status code metadata replaces call result");
                        Err(e.into())
                    }
                };
            }
        };

        if !self.carries_status_code {
            return result;
        }

        result.map_err(|err| {
            tracing::debug!(status_code, "restored status code on error");
            StatusError::new(err, status_code).into()
        })
    }
}

impl<S> Layer<S> for StatusDecoderLayer {
    type Service = StatusDecoder<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StatusDecoder { inner, layer: *self }
    }
}

/// Service produced by [`StatusDecoderLayer`]
#[derive(Debug, Clone)]
pub struct StatusDecoder<S> {
    inner: S,
    layer: StatusDecoderLayer,
}

impl<S, T> Service<Call<T>> for StatusDecoder<S>
where
    S: Service<Call<T>>,
    S::Error: Into<BoxError>,
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
        let layer = self.layer;

        Box::pin(async move {
            let result: Result<S::Response, BoxError> = response.await.map_err(Into::into);
            layer.decode(&context, result)
        })
    }
}

#[cfg(test)]
mod tests {
    use grpcerr_core::{InvalidStatusCode, STATUS_CODE_KEY, StatusCoder, encode_status_code, status_code_of};
    use tonic::metadata::{MetadataMap, MetadataValue};
    use tower::{ServiceExt, service_fn};

    use super::*;

    /// Stand-in transport: records `header` on the call, then yields `result`
    fn transport(
        header: Option<MetadataMap>,
        result: Result<&'static str, &'static str>,
    ) -> impl Service<Call<()>, Response = &'static str, Error = BoxError, Future: Send + 'static> + Clone {
        service_fn(move |call: Call<()>| {
            if let Some(header) = header.clone() {
                call.context().set_header(header).unwrap();
            }
            futures::future::ready(result.map_err(BoxError::from))
        })
    }

    fn raw_header(value: &'static str) -> MetadataMap {
        let mut header = MetadataMap::new();
        header.insert(STATUS_CODE_KEY, MetadataValue::from_static(value));
        header
    }

    #[tokio::test]
    async fn restores_status_code() {
        let svc = StatusDecoderLayer::new::<StatusError>().layer(transport(Some(encode_status_code(404)), Err("not found")));

        let err = svc.oneshot(Call::new(())).await.unwrap_err();

        let err = err.downcast::<StatusError>().unwrap();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "not found");
    }

    #[tokio::test]
    async fn success_stays_success() {
        let svc = StatusDecoderLayer::new::<StatusError>().layer(transport(Some(encode_status_code(404)), Ok("pong")));

        assert_eq!(svc.oneshot(Call::new(())).await.unwrap(), "pong");
    }

    #[tokio::test]
    async fn missing_header_passes_through() {
        let svc = StatusDecoderLayer::new::<StatusError>().layer(transport(None, Err("boom")));

        let err = svc.oneshot(Call::new(())).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(status_code_of(&*err), None);
    }

    #[tokio::test]
    async fn missing_key_passes_through() {
        let mut header = MetadataMap::new();
        header.insert("x-request-id", MetadataValue::from_static("abc"));
        let svc = StatusDecoderLayer::new::<StatusError>().layer(transport(Some(header), Err("boom")));

        let err = svc.oneshot(Call::new(())).await.unwrap_err();
        assert_eq!(status_code_of(&*err), None);
    }

    #[tokio::test]
    async fn incapable_prototype_leaves_error_alone() {
        let svc = StatusDecoderLayer::new::<BoxError>().layer(transport(Some(encode_status_code(404)), Err("not found")));

        let err = svc.oneshot(Call::new(())).await.unwrap_err();
        assert!(err.downcast_ref::<StatusError>().is_none());
        assert_eq!(err.to_string(), "not found");
    }

    #[tokio::test]
    async fn invalid_value_preserves_result_by_default() {
        let svc = StatusDecoderLayer::new::<StatusError>().layer(transport(Some(raw_header("NaN")), Err("boom")));

        let err = svc.oneshot(Call::new(())).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(status_code_of(&*err), None);
    }

    #[tokio::test]
    async fn invalid_value_preserves_success() {
        let svc = StatusDecoderLayer::new::<StatusError>().layer(transport(Some(raw_header("NaN")), Ok("pong")));

        assert_eq!(svc.oneshot(Call::new(())).await.unwrap(), "pong");
    }

    #[tokio::test]
    async fn invalid_value_surfaces_when_configured() {
        let config = DecoderConfig {
            on_invalid_status_code: InvalidStatusCodePolicy::Surface,
        };
        let svc = StatusDecoderLayer::new::<StatusError>()
            .with_config(&config)
            .layer(transport(Some(raw_header("NaN")), Ok("pong")));

        let err = svc.oneshot(Call::new(())).await.unwrap_err();
        let err = err.downcast::<InvalidStatusCode>().unwrap();
        assert!(matches!(*err, InvalidStatusCode::NotInteger { .. }));
    }

    #[test]
    fn capability_is_fixed_at_construction() {
        assert!(StatusDecoderLayer::new::<StatusError>().carries_status_code());
        assert!(!StatusDecoderLayer::new::<tonic::Status>().carries_status_code());
    }
}
