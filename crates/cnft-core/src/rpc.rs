//! JSON-RPC 2.0 envelopes shared by the index and ledger clients.

use serde::{Deserialize, Serialize};

/// Request envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a, P> {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Request id echoed by the server.
    pub id: &'a str,
    /// Method name.
    pub method: &'a str,
    /// Positional or named parameters.
    pub params: P,
}

impl<'a, P: Serialize> JsonRpcRequest<'a, P> {
    /// Build a request with the given id.
    pub fn new(id: &'a str, method: &'a str, params: P) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// Error object carried by a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcErrorObject {
    /// Error code.
    pub code: i64,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Response envelope. A `null` or absent result deserializes to `None`.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<R> {
    /// Successful result.
    pub result: Option<R>,
    /// Failure details.
    pub error: Option<JsonRpcErrorObject>,
}
