//! In-process round trip: encoder, tonic reply metadata, decoder

use std::future::Future;

use grpcerr::{BoxError, Call, StatusDecoderLayer, transport};
use tonic::metadata::MetadataMap;
use tower::{ServiceBuilder, ServiceExt, service_fn};

/// Outcome of one call
pub struct Exchange {
    /// What the client caller received
    pub result: Result<String, BoxError>,
    /// Response header recorded by the client transport
    pub header: Option<MetadataMap>,
}

/// Send `message` to `handler` behind a status encoder and read the reply
/// through `decoder`
///
/// Server and client have separate call contexts; only the tonic reply
/// metadata connects them.
pub async fn exchange<H, F>(handler: H, decoder: StatusDecoderLayer, message: &str) -> Exchange
where
    H: FnMut(Call<String>) -> F + Clone + Send + 'static,
    F: Future<Output = Result<String, BoxError>> + Send + 'static,
{
    super::init_tracing();

    let server = ServiceBuilder::new()
        .layer(grpcerr::status_encoder())
        .service(service_fn(handler));

    let wire = service_fn(move |call: Call<String>| {
        let server = server.clone();
        async move {
            let (client_context, message) = call.into_parts();

            let server_call = Call::new(message);
            let server_context = server_call.context().clone();
            let reply = transport::server::into_tonic(&server_context, server.oneshot(server_call).await);

            // Only code, message and metadata survive the wire
            let reply = reply.map_err(|s| tonic::Status::with_metadata(s.code(), s.message(), s.metadata().clone()));

            transport::client::receive(&client_context, reply)
        }
    });

    let client = ServiceBuilder::new().layer(decoder).service(wire);

    let call = Call::new(message.to_owned());
    let context = call.context().clone();
    let result = client.oneshot(call).await;

    Exchange {
        result,
        header: context.header().cloned(),
    }
}
