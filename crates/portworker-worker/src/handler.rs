use portworker_frame::CorrelationId;
use portworker_payload::Value;

/// A decoded request.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: CorrelationId,
    pub data: Value,
}

impl Message {
    pub fn new(id: impl Into<CorrelationId>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// `{ "id": <binary id>, "data": <data> }`, for echoing the request back.
    pub fn to_value(&self) -> Value {
        Value::map()
            .with("id", self.id.as_bytes().to_vec())
            .with("data", self.data.clone())
    }
}

/// An unrecoverable handler failure.
///
/// Returning this stops the worker without answering the request. Failures
/// the host should see and recover from belong in the result value instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct HandlerFault {
    reason: String,
}

impl HandlerFault {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Per-request computation plugged into a [`Worker`](crate::Worker).
pub trait Handler {
    /// Process-lifetime state built by [`Handler::init`].
    type Context;

    /// Build the context from the worker's process arguments.
    ///
    /// Called exactly once, before any request is read.
    fn init(&self, args: &[String]) -> Result<Self::Context, HandlerFault>;

    /// Answer one request.
    ///
    /// Never called concurrently. The context is shared read-only across all
    /// calls.
    fn predict(&self, message: &Message, context: &Self::Context) -> Result<Value, HandlerFault>;
}
