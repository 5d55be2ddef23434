//! Cross-service gateway adapters.
//!
//! - `InProcessGateway` - dispatch to co-hosted services
//! - `HttpGateway` - `POST /messages/{pattern}` to remote services
//! - typed clients implementing `TestCatalog`, `QcReader` and
//!   `DispositionSink` on top of any `ServiceGateway`

mod catalog_client;
mod disposition_sink;
mod http;
mod in_process;
mod qc_reader;

pub use catalog_client::GatewayTestCatalog;
pub use disposition_sink::{route, GatewayDispositionSink};
pub use self::http::{HttpGateway, CORRELATION_HEADER};
pub use in_process::InProcessGateway;
pub use qc_reader::GatewayQcReader;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode, ErrorKind};
use crate::ports::{GatewayError, GatewayRequest, ServiceTarget, UNKNOWN_PATTERN};

fn request(
    target: ServiceTarget,
    pattern: &str,
    payload: JsonValue,
    metadata: &CommandMetadata,
) -> GatewayRequest {
    GatewayRequest::new(target, pattern, payload)
        .with_correlation_id(Some(metadata.correlation_id()))
}

fn decode<T: DeserializeOwned>(value: JsonValue) -> Result<T, DomainError> {
    serde_json::from_value(value).map_err(|e| {
        DomainError::new(
            ErrorCode::SerializationError,
            format!("Unexpected gateway response: {}", e),
        )
    })
}

/// A remote `not_found` answer is an absent entity, not a failure.
fn missing_as_none(
    response: Result<JsonValue, GatewayError>,
) -> Result<Option<JsonValue>, DomainError> {
    match response {
        Ok(value) => Ok(Some(value)),
        Err(GatewayError::Remote { error, .. })
            if error.kind == ErrorKind::NotFound && error.code != UNKNOWN_PATTERN =>
        {
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
