//! Data types shared between the form, the gateway and the CLI.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// JSON-RPC protocol version tag carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";
/// Remote method that creates a payment.
pub const PAY_METHOD: &str = "pay";

/// Raw values of the four card form fields.
///
/// `card_number` holds the unmasked digits; `expiration` holds the masked
/// `MM/YY` string exactly as displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFormInput {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub expiration: String,
    #[serde(default)]
    pub full_name: String,
}

impl CardFormInput {
    /// Read a form from a JSON document with camelCase keys.
    pub fn from_json_slice(bytes: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Opaque payment identifier issued by the payment service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pid(String);

impl Pid {
    /// Returns `None` for an empty identifier.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pull a pid out of a loosely typed JSON value. Non-empty strings and
    /// non-zero numbers are accepted. Booleans, arrays and objects are not
    /// usable identifiers.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::new(s.as_str()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Self::new(n.to_string()),
            _ => None,
        }
    }
}

impl TryFrom<String> for Pid {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("payment identifier cannot be empty")
    }
}

impl From<Pid> for String {
    fn from(value: Pid) -> Self {
        value.0
    }
}

impl Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameters of the `pay` method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayParams {
    pub pan: String,
    pub expire: String,
    pub cardholder: String,
    pub cvc: String,
}

/// JSON-RPC envelope for a single payment-creation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRequest {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: PayParams,
}

impl PayRequest {
    /// Wrap `params` in a fresh envelope with a random v4 request id.
    pub fn new(params: PayParams) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Uuid::new_v4().to_string(),
            method: PAY_METHOD.to_string(),
            params,
        }
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Response to the `pay` call. Both members are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl PayResponse {
    /// The `result.pid` member, when present and usable.
    pub fn pid(&self) -> Option<Pid> {
        self.result
            .as_ref()
            .and_then(|result| result.get("pid"))
            .and_then(Pid::from_json)
    }
}

/// Lifecycle of a payment as seen by the status poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Processing,
    Ok,
    Fail,
}

impl PaymentStatus {
    /// `ok` and `fail` end polling.
    pub const fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Ok | PaymentStatus::Fail)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Processing => "processing",
            PaymentStatus::Ok => "ok",
            PaymentStatus::Fail => "fail",
        }
    }
}

/// Body returned by `GET /pay/check/{pid}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub pid: Option<String>,
}

impl StatusReport {
    /// Unknown or missing statuses count as still processing.
    pub fn payment_status(&self) -> PaymentStatus {
        match self.status.as_deref() {
            Some("ok") => PaymentStatus::Ok,
            Some("fail") => PaymentStatus::Fail,
            _ => PaymentStatus::Processing,
        }
    }
}
