// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Localized user-facing failure messages

use std::str::FromStr;

use crate::error::Error;

/// Message locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    English,
    Chinese,
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Locale::English),
            "zh" | "zh-cn" | "chinese" => Ok(Locale::Chinese),
            other => Err(Error::config(format!("Unknown locale: {}", other))),
        }
    }
}

/// Message table keyed by transport status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessages {
    pub server_error: String,
    pub bad_gateway: String,
    pub bad_request: String,
    pub not_found: String,
    /// Logged for 499; never shown to the user
    pub forbidden: String,
    pub fallback: String,
}

impl StatusMessages {
    /// English message table
    pub fn english() -> Self {
        Self {
            server_error: "Server error".to_string(),
            bad_gateway: "Gateway timeout".to_string(),
            bad_request: "Bad request".to_string(),
            not_found: "Requested resource not found".to_string(),
            forbidden: "Permission denied".to_string(),
            fallback: "Request failed".to_string(),
        }
    }

    /// Simplified Chinese message table
    pub fn chinese() -> Self {
        Self {
            server_error: "服务端出错了".to_string(),
            bad_gateway: "网关超时了".to_string(),
            bad_request: "请求出错了！".to_string(),
            not_found: "请求的资源不存在".to_string(),
            forbidden: "请求无权限".to_string(),
            fallback: "请求出错了".to_string(),
        }
    }

    /// Message table for a locale
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::English => Self::english(),
            Locale::Chinese => Self::chinese(),
        }
    }

    /// Message for a transport status; `None` means no response at all
    pub fn for_status(&self, status: Option<u16>) -> &str {
        match status {
            Some(500) => &self.server_error,
            Some(502) => &self.bad_gateway,
            Some(400) => &self.bad_request,
            Some(404) => &self.not_found,
            _ => &self.fallback,
        }
    }
}

impl Default for StatusMessages {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lookup() {
        let messages = StatusMessages::english();
        assert_eq!(messages.for_status(Some(404)), "Requested resource not found");
        assert_eq!(messages.for_status(Some(418)), "Request failed");
        assert_eq!(messages.for_status(Some(499)), "Request failed");
        assert_eq!(messages.for_status(None), "Request failed");
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("zh".parse::<Locale>().unwrap(), Locale::Chinese);
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::English);
        assert!("fr".parse::<Locale>().is_err());
        assert_eq!(
            StatusMessages::for_locale(Locale::Chinese).for_status(Some(500)),
            "服务端出错了"
        );
    }
}
