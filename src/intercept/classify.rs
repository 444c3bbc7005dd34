// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Response classification
//!
//! Maps a settled request onto what the caller sees: the payload of a
//! successful envelope, a normalized rejection, a re-authentication, or a
//! silent permission failure.

use serde::Deserialize;
use serde_json::Value;

use super::messages::StatusMessages;
use crate::http::Response;

const CODE_OK: i64 = 200;
const CODE_UNAUTHORIZED: i64 = 401;

/// What a settled request resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Resolve with the payload
    Resolve(Value),
    /// Reject with a normalized error
    Reject(Rejection),
    /// Session expired
    Reauthenticate { login_url: Option<String> },
    /// Reject without a user notice; `reason` is only logged
    Silent { reason: String },
}

/// Fields of a rejection before its notice is scheduled
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub message: String,
    pub status: Option<u16>,
    pub data: Option<Value>,
}

/// Application-level `{code, result, data}` wrapper
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub code: Value,
    pub result: Value,
    pub data: Option<Value>,
    /// Only a non-empty string is used; any other type is ignored
    pub message: Value,
}

impl Envelope {
    /// Parse an envelope; anything that is not a JSON object yields an
    /// empty envelope
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Envelope code, accepting numbers and numeric strings
    pub fn code(&self) -> Option<i64> {
        match &self.code {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn rejection(self, messages: &StatusMessages) -> Rejection {
        let status = self.code().and_then(|c| u16::try_from(c).ok());
        Rejection {
            message: self
                .message
                .as_str()
                .filter(|m| !m.is_empty())
                .map_or_else(|| messages.fallback.clone(), String::from),
            status,
            data: self.data,
        }
    }
}

/// Truthiness as the server's scripting clients see it
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn login_url(data: Option<&Value>) -> Option<String> {
    data.and_then(|d| d.get("login_url"))
        .and_then(Value::as_str)
        .map(String::from)
}

/// Classify a 2xx transport response by its envelope
pub fn classify_response(response: &Response, messages: &StatusMessages) -> Verdict {
    if response.status_code() != 200 {
        return Verdict::Resolve(Value::Null);
    }

    let envelope = Envelope::parse(&response.body);
    match envelope.code() {
        Some(CODE_OK) if is_truthy(&envelope.result) => {
            Verdict::Resolve(envelope.data.unwrap_or(Value::Null))
        }
        Some(CODE_UNAUTHORIZED) => Verdict::Reauthenticate {
            login_url: login_url(envelope.data.as_ref()),
        },
        _ => Verdict::Reject(envelope.rejection(messages)),
    }
}

/// Classify a transport failure.
///
/// `status` is absent when no response arrived (connection error, timeout).
pub fn classify_failure(
    status: Option<u16>,
    url: &str,
    data: Option<Value>,
    messages: &StatusMessages,
) -> Verdict {
    match status {
        Some(401) => Verdict::Reauthenticate {
            login_url: login_url(data.as_ref()),
        },
        Some(499) => Verdict::Silent {
            reason: messages.forbidden.clone(),
        },
        _ => Verdict::Reject(Rejection {
            message: format!("{}:\n{}", messages.for_status(status), url),
            status,
            data,
        }),
    }
}
