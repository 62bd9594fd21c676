//! JSON-RPC transport shared by the resolver and the proof provider.

use std::sync::Arc;

use cnft_core::rpc::{JsonRpcErrorObject, JsonRpcRequest, JsonRpcResponse};
use cnft_core::IndexError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use zeroize::Zeroizing;

/// Request id sent with every call. The index echoes it back; nothing checks it.
const REQUEST_ID: &str = "cnft-index";

/// A POST-only JSON-RPC transport bound to one index endpoint.
#[derive(Clone)]
pub(crate) struct RpcTransport {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<Arc<Zeroizing<String>>>,
}

impl std::fmt::Debug for RpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcTransport")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl RpcTransport {
    pub(crate) fn new(
        http: reqwest::Client,
        endpoint: Url,
        api_key: Option<Zeroizing<String>>,
    ) -> Self {
        Self {
            http,
            endpoint,
            api_key: api_key.map(Arc::new),
        }
    }

    /// Call `method` once and decode its `result`.
    ///
    /// Returns `Ok(None)` when the index reports the subject as missing,
    /// either through a `null` result or a record-not-found error object
    /// (see [`is_not_found`]). Other error objects become [`IndexError::Rpc`].
    /// A transport failure is reported immediately as
    /// [`IndexError::Unavailable`]; retrying is the caller's decision.
    pub(crate) async fn call<P, R>(&self, method: &'static str, params: &P) -> Result<Option<R>, IndexError>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let body = JsonRpcRequest::new(REQUEST_ID, method, params);

        let mut req = self.http.post(self.endpoint.clone()).json(&body);
        if let Some(key) = &self.api_key {
            req = req.query(&[("api-key", key.as_str())]);
        }
        let resp = req.send().await.map_err(|e| IndexError::Unavailable {
            endpoint: method.into(),
            reason: if e.is_timeout() {
                "request timed out".to_string()
            } else {
                e.to_string()
            },
        })?;

        let status = resp.status();
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let body = resp.text().await.unwrap_or_default();
            return Err(IndexError::Unavailable {
                endpoint: method.into(),
                reason: format!("HTTP {}: {body}", status.as_u16()),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IndexError::Rpc {
                endpoint: method.into(),
                code: i64::from(status.as_u16()),
                message: body,
            });
        }

        let envelope: JsonRpcResponse<R> =
            resp.json().await.map_err(|e| IndexError::Deserialization {
                endpoint: method.into(),
                reason: e.to_string(),
            })?;

        if let Some(err) = envelope.error {
            if is_not_found(&err) {
                tracing::debug!(method, code = err.code, "index reports subject not found");
                return Ok(None);
            }
            return Err(IndexError::Rpc {
                endpoint: method.into(),
                code: err.code,
                message: err.message,
            });
        }

        Ok(envelope.result)
    }
}

/// Codes the JSON-RPC protocol reserves for malformed calls.
const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

/// Implementation-defined server error range. The index reports database
/// lookups that found no row here.
const SERVER_ERROR_CODES: std::ops::RangeInclusive<i64> = -32099..=-32000;

/// Markers the index puts in the message of a record-not-found error, e.g.
/// `Database Error: RecordNotFound Error: Asset Proof Not Found`.
const NOT_FOUND_MARKERS: [&str; 3] = ["recordnotfound", "asset not found", "asset proof not found"];

/// Whether `err` is the index saying the asset has no record.
///
/// Protocol errors never qualify, whatever their message says: `Method not
/// found` means the endpoint is not an asset index, not that the asset is
/// missing.
pub(crate) fn is_not_found(err: &JsonRpcErrorObject) -> bool {
    match err.code {
        PARSE_ERROR | INVALID_REQUEST | METHOD_NOT_FOUND | INVALID_PARAMS | INTERNAL_ERROR => false,
        code if SERVER_ERROR_CODES.contains(&code) => {
            let message = err.message.to_ascii_lowercase();
            NOT_FOUND_MARKERS.iter().any(|m| message.contains(m))
        }
        _ => false,
    }
}
