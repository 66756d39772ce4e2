use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

pub const JSONRPC_VERSION: &str = "2.0";
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INTERNAL_ERROR: i64 = -32603;

/// Caller-supplied correlation identifier, echoed verbatim in the response.
/// Any JSON value is accepted: integers, strings, fractional numbers, null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Value);

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

// `"id": null` is kept as `Some(null)`; only a missing key becomes `None`.
fn present_id<'de, D>(deserializer: D) -> Result<Option<RequestId>, D::Error>
where
    D: Deserializer<'de>,
{
    RequestId::deserialize(deserializer).map(Some)
}

/// A response to a request without an `id` leaves the field out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(flatten)]
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    Result(Value),
    Error(ErrorObject),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
}

pub fn success_response(id: Option<RequestId>, result: Value) -> Response {
    Response {
        jsonrpc: JSONRPC_VERSION,
        id,
        payload: Payload::Result(result),
    }
}

pub fn error_response(id: Option<RequestId>, code: i64, message: impl Into<String>) -> Response {
    Response {
        jsonrpc: JSONRPC_VERSION,
        id,
        payload: Payload::Error(ErrorObject {
            code,
            message: message.into(),
        }),
    }
}

/// Decodes one framed line. Malformed messages are dropped without a reply.
pub fn decode_request(line: &str) -> Option<Request> {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => Some(request),
        Err(err) => {
            debug!(error = %err, "dropping malformed message");
            None
        }
    }
}

pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
) -> io::Result<()> {
    let mut body = serde_json::to_vec(response).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to serialize JSON response: {e}"),
        )
    })?;
    body.push(b'\n');
    writer.write_all(&body).await?;
    writer.flush().await
}

/// Splits an unbounded byte stream into newline-terminated messages.
///
/// Bytes are buffered until a `\n` arrives, so messages split across reads
/// (including split UTF-8 sequences) are reassembled. A partial line that
/// grows past `max_message_bytes` is discarded along with the rest of that
/// line; framing resumes after its terminator.
pub struct LineFramer {
    buffer: Vec<u8>,
    max_message_bytes: usize,
    skipping: bool,
}

impl LineFramer {
    pub fn new(max_message_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_message_bytes,
            skipping: false,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut messages = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            let line = &rest[..pos];
            rest = &rest[pos + 1..];

            if self.skipping {
                self.skipping = false;
                continue;
            }

            self.buffer.extend_from_slice(line);
            if self.buffer.len() > self.max_message_bytes {
                warn!(
                    bytes = self.buffer.len(),
                    limit = self.max_message_bytes,
                    "dropping oversized message"
                );
                self.buffer.clear();
                continue;
            }

            let bytes = std::mem::take(&mut self.buffer);
            if let Some(message) = decode_line(bytes) {
                messages.push(message);
            }
        }

        if !self.skipping {
            self.buffer.extend_from_slice(rest);
            if self.buffer.len() > self.max_message_bytes {
                warn!(
                    bytes = self.buffer.len(),
                    limit = self.max_message_bytes,
                    "dropping oversized message"
                );
                self.buffer.clear();
                self.skipping = true;
            }
        }

        messages
    }

    /// Ends the stream. An unterminated trailing line is never dispatched.
    pub fn finish(self) {
        if !self.buffer.is_empty() {
            debug!(
                bytes = self.buffer.len(),
                "discarding unterminated trailing input"
            );
        }
    }

    #[cfg(test)]
    fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

fn decode_line(bytes: Vec<u8>) -> Option<String> {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!(error = %err, "dropping message that is not valid UTF-8");
            return None;
        }
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
