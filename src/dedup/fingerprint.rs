// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request fingerprinting
//!
//! A fingerprint identifies a logical request by method, URL, query
//! parameters and body. Parameter objects are serialized canonically so
//! that key insertion order never changes the result.

use std::fmt;

use reqwest::Method;
use serde_json::Value;

use crate::http::RequestBody;

/// Separator between fingerprint components. The percent-encoder never
/// emits control characters, so components cannot bleed into each other.
const SEPARATOR: char = '\u{1f}';

/// Canonical key identifying a logical request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a request
    pub fn of(
        method: &Method,
        url: &str,
        query: Option<&Value>,
        body: Option<&RequestBody>,
    ) -> Self {
        let method = method.as_str().to_ascii_uppercase();
        let query = query.map(canonical_query).unwrap_or_default();
        // Kind prefix keeps bodies with equal text but different wire bytes apart
        let body = match body {
            Some(RequestBody::Json(value)) => format!("j:{}", canonical_query(value)),
            Some(RequestBody::Form(value)) => format!("f:{}", canonical_query(value)),
            Some(RequestBody::Raw(bytes)) => format!(
                "r:{}",
                base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
            ),
            None => String::new(),
        };

        let mut key = String::with_capacity(method.len() + url.len() + query.len() + body.len() + 3);
        key.push_str(&method);
        key.push(SEPARATOR);
        key.push_str(url);
        key.push(SEPARATOR);
        key.push_str(&query);
        key.push(SEPARATOR);
        key.push_str(&body);
        Self(key)
    }

    /// Get the fingerprint as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Printable form for logs
        f.write_str(&self.0.replace(SEPARATOR, " "))
    }
}

/// Serialize a value as a qs-style query string with keys sorted at every
/// nesting level.
///
/// Objects become `a[b]=c`, arrays `a[0]=x`, `null` becomes `a=`. A scalar
/// at the top level has no key and is encoded on its own.
pub fn canonical_query(value: &Value) -> String {
    let mut pairs = Vec::new();
    match value {
        Value::Object(_) | Value::Array(_) => collect_pairs(None, value, &mut pairs),
        Value::Null => {}
        scalar => return percent_encode(&scalar_to_string(scalar)),
    }

    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", percent_encode(&k), percent_encode(&v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn collect_pairs(prefix: Option<&str>, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                let path = match prefix {
                    Some(p) => format!("{}[{}]", p, key),
                    None => key.clone(),
                };
                collect_pairs(Some(&path), &map[key.as_str()], out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let path = match prefix {
                    Some(p) => format!("{}[{}]", p, index),
                    None => index.to_string(),
                };
                collect_pairs(Some(&path), item, out);
            }
        }
        scalar => {
            if let Some(key) = prefix {
                out.push((key.to_string(), scalar_to_string(scalar)));
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set
fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char)
            }
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "https://api.example.com/items";

    #[test]
    fn test_key_order_does_not_matter() {
        let a: Value = serde_json::from_str(r#"{"page":1,"filter":{"b":2,"a":1}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"filter":{"a":1,"b":2},"page":1}"#).unwrap();

        let body_a = RequestBody::Json(json!({"x": [1, 2], "y": "z"}));
        let body_b = RequestBody::Json(json!({"y": "z", "x": [1, 2]}));

        assert_eq!(
            Fingerprint::of(&Method::GET, URL, Some(&a), Some(&body_a)),
            Fingerprint::of(&Method::GET, URL, Some(&b), Some(&body_b))
        );
    }

    #[test]
    fn test_each_component_matters() {
        let base = Fingerprint::of(&Method::GET, URL, Some(&json!({"q": "a"})), None);

        assert_ne!(base, Fingerprint::of(&Method::POST, URL, Some(&json!({"q": "a"})), None));
        assert_ne!(
            base,
            Fingerprint::of(&Method::GET, "https://api.example.com/other", Some(&json!({"q": "a"})), None)
        );
        assert_ne!(base, Fingerprint::of(&Method::GET, URL, Some(&json!({"q": "b"})), None));
        assert_ne!(
            base,
            Fingerprint::of(
                &Method::GET,
                URL,
                Some(&json!({"q": "a"})),
                Some(&RequestBody::Json(json!({"q": "a"})))
            )
        );
    }

    #[test]
    fn test_query_and_body_do_not_swap() {
        let params = json!({"id": 7});
        let as_query = Fingerprint::of(&Method::POST, URL, Some(&params), None);
        let as_body = Fingerprint::of(&Method::POST, URL, None, Some(&RequestBody::Json(params)));
        assert_ne!(as_query, as_body);
    }

    #[test]
    fn test_array_order_matters() {
        let a = Fingerprint::of(&Method::GET, URL, Some(&json!({"ids": [1, 2]})), None);
        let b = Fingerprint::of(&Method::GET, URL, Some(&json!({"ids": [2, 1]})), None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_canonical_query_format() {
        let value = json!({"b": {"y": 2, "x": 1}, "a": [true, null], "c": "a b&c"});
        assert_eq!(
            canonical_query(&value),
            "a%5B0%5D=true&a%5B1%5D=&b%5Bx%5D=1&b%5By%5D=2&c=a%20b%26c"
        );
    }

    #[test]
    fn test_method_case_is_normalized() {
        let lower = Method::from_bytes(b"get").unwrap();
        assert_eq!(
            Fingerprint::of(&lower, URL, None, None),
            Fingerprint::of(&Method::GET, URL, None, None)
        );
    }

    #[test]
    fn test_body_kinds_do_not_collide() {
        let fields = json!({"id": 1});
        let json_body = Fingerprint::of(&Method::POST, URL, None, Some(&RequestBody::Json(fields.clone())));
        let form_body = Fingerprint::of(&Method::POST, URL, None, Some(&RequestBody::Form(fields)));
        assert_ne!(json_body, form_body);

        // base64("a=1") == "YT0x"
        let raw = Fingerprint::of(&Method::POST, URL, None, Some(&RequestBody::Raw("a=1".into())));
        let json_text = Fingerprint::of(&Method::POST, URL, None, Some(&RequestBody::Json(json!("YT0x"))));
        let form_text = Fingerprint::of(&Method::POST, URL, None, Some(&RequestBody::Form(json!("YT0x"))));
        assert_ne!(raw, json_text);
        assert_ne!(raw, form_text);
        assert_ne!(json_text, form_text);

        let empty = Fingerprint::of(&Method::POST, URL, None, None);
        let empty_raw = Fingerprint::of(&Method::POST, URL, None, Some(&RequestBody::Raw("".into())));
        assert_ne!(empty, empty_raw);
    }

    #[test]
    fn test_raw_bodies() {
        let a = Fingerprint::of(&Method::PUT, URL, None, Some(&RequestBody::Raw("abc".into())));
        let b = Fingerprint::of(&Method::PUT, URL, None, Some(&RequestBody::Raw("abd".into())));
        assert_ne!(a, b);
    }
}
