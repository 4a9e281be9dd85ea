//! Njalla JSON-RPC envelopes
//!
//! Requests look like
//!
//! ```json
//! {"jsonrpc": "2.0", "method": "list-records", "params": {"domain": "example.com"}, "id": "njddns"}
//! ```
//!
//! and responses carry either a `result` or an `error` object.

use njddns_core::DnsRecord;
use serde::{Deserialize, Serialize};

/// JSON-RPC protocol version sent with every request
pub const JSONRPC_VERSION: &str = "2.0";

/// Request id; responses are not correlated by id
pub const REQUEST_ID: &str = "njddns";

/// Method listing every record of a domain
pub const METHOD_LIST_RECORDS: &str = "list-records";

/// Method overwriting one record
pub const METHOD_EDIT_RECORD: &str = "edit-record";

/// Outgoing request envelope
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: P,
    pub id: &'static str,
}

impl<'a, P: Serialize> RpcRequest<'a, P> {
    pub fn new(method: &'a str, params: P) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id: REQUEST_ID,
        }
    }
}

/// Params of `list-records`
#[derive(Debug, Serialize)]
pub struct ListRecordsParams<'a> {
    pub domain: &'a str,
}

/// Params of `edit-record`
#[derive(Debug, Serialize)]
pub struct EditRecordParams<'a> {
    pub domain: &'a str,
    pub id: i64,
    pub content: &'a str,
}

/// Incoming response envelope
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

/// Application-level error reported in the envelope
#[derive(Debug, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// `result` of `list-records`
#[derive(Debug, Deserialize)]
pub struct ListRecordsResult {
    pub records: Vec<DnsRecord>,
}
