use tonic::metadata::{MetadataMap, MetadataValue};

use crate::InvalidStatusCode;

/// Metadata key carrying an application status code
pub const STATUS_CODE_KEY: &str = "grpcerr_status_code";

/// Build the response header that carries `status_code`
pub fn encode_status_code(status_code: i64) -> MetadataMap {
    let mut header = MetadataMap::new();
    header.insert(STATUS_CODE_KEY, MetadataValue::from(status_code));
    header
}

/// Read the status code carried by a response header
///
/// Returns `None` when the key is absent. Only the first value under the key
/// is considered.
pub fn decode_status_code(header: &MetadataMap) -> Option<Result<i64, InvalidStatusCode>> {
    let value = header.get(STATUS_CODE_KEY)?;

    let decoded = value.to_str().map_err(InvalidStatusCode::NotAscii).and_then(|raw| {
        raw.parse().map_err(|source| InvalidStatusCode::NotInteger {
            value: raw.to_owned(),
            source,
        })
    });

    Some(decoded)
}
