//! JSON-RPC request helper and the response shapes of the calls this client makes.

use cnft_core::rpc::{JsonRpcRequest, JsonRpcResponse};
use cnft_core::{Commitment, LedgerError};
use serde::de::DeserializeOwned;
use serde::Deserialize;

const REQUEST_ID: &str = "cnft-ledger";

/// Send a JSON-RPC request and return the result field.
pub(crate) async fn rpc_call<R: DeserializeOwned>(
    http: &reqwest::Client,
    url: &url::Url,
    method: &'static str,
    params: serde_json::Value,
) -> Result<R, LedgerError> {
    let body = JsonRpcRequest::new(REQUEST_ID, method, params);

    let resp = http
        .post(url.clone())
        .json(&body)
        .send()
        .await
        .map_err(|e| LedgerError::Unavailable {
            endpoint: method.into(),
            reason: if e.is_timeout() {
                "request timed out".to_string()
            } else {
                e.to_string()
            },
        })?;

    if !resp.status().is_success() {
        return Err(LedgerError::Unavailable {
            endpoint: method.into(),
            reason: format!("HTTP {}", resp.status()),
        });
    }

    let envelope: JsonRpcResponse<R> =
        resp.json().await.map_err(|e| LedgerError::Unavailable {
            endpoint: method.into(),
            reason: format!("invalid JSON response: {e}"),
        })?;

    if let Some(err) = envelope.error {
        return Err(LedgerError::Rpc {
            endpoint: method.into(),
            code: err.code,
            message: err.message,
        });
    }

    envelope.result.ok_or_else(|| LedgerError::Unavailable {
        endpoint: method.into(),
        reason: "JSON-RPC response missing 'result' field".to_string(),
    })
}

// -- Response types -----------------------------------------------------------

/// `{ "context": {...}, "value": T }` wrapper used by most ledger reads.
#[derive(Debug, Deserialize)]
pub(crate) struct WithContext<T> {
    pub(crate) value: T,
}

/// `getAccountInfo` value with base64 encoding.
#[derive(Debug, Deserialize)]
pub(crate) struct AccountInfo {
    /// `[payload, "base64"]`.
    pub(crate) data: (String, String),
    #[serde(default)]
    pub(crate) owner: String,
}

/// `getLatestBlockhash` value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LatestBlockhash {
    pub(crate) blockhash: String,
    #[serde(default)]
    pub(crate) last_valid_block_height: u64,
}

/// One entry of a `getSignatureStatuses` value. `null` entries mean the
/// signature is not known yet.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignatureStatus {
    #[serde(default)]
    pub(crate) slot: u64,
    #[serde(default)]
    pub(crate) err: Option<serde_json::Value>,
    #[serde(default)]
    pub(crate) confirmation_status: Option<Commitment>,
}
