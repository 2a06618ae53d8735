//! Logging infrastructure for Repofs
//!
//! Structured events go through `tracing` when the `logging` feature is
//! enabled; the host installs whatever subscriber it wants as the sink.
//! Without the feature every logging macro expands to nothing.
//!
//! # Log Levels
//!
//! - **WARN**: Partially applied compound operations (rename)
//! - **DEBUG**: One event per remote call (method, URL, status)
//! - **TRACE**: Create-vs-update selection, glob expansion results
//!
//! # Security
//!
//! Access tokens travel in request headers and are never logged. URLs are
//! passed through [`LogConfig::redact_url`] before logging.

use std::borrow::Cow;
use std::collections::HashSet;

#[cfg(feature = "logging")]
macro_rules! log_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => { tracing::trace!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {};
}

/// Configuration for log redaction.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether to redact sensitive data from logs (default: true)
    pub redact_sensitive: bool,

    /// Query parameter names whose values are redacted (case-insensitive)
    pub redact_params: HashSet<String>,

    /// Maximum length of logged values before truncation (default: 200)
    pub max_value_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        let mut redact_params = HashSet::new();
        for pattern in &["TOKEN", "ACCESS_TOKEN", "KEY", "SECRET", "SIG", "SIGNATURE", "AUTH"] {
            redact_params.insert(pattern.to_string());
        }
        Self {
            redact_sensitive: true,
            redact_params,
            max_value_length: 200,
        }
    }
}

impl LogConfig {
    /// Create a new log configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable sensitive data redaction (UNSAFE - use only for debugging)
    pub fn unsafe_disable_redaction(mut self) -> Self {
        self.redact_sensitive = false;
        self
    }

    /// Add a query parameter name to redact
    pub fn redact_param(mut self, name: &str) -> Self {
        self.redact_params.insert(name.to_uppercase());
        self
    }

    /// Set maximum length for logged values
    pub fn max_value_length(mut self, len: usize) -> Self {
        self.max_value_length = len;
        self
    }

    /// Redact a value if it appears sensitive
    pub fn redact_value<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if !self.redact_sensitive {
            return self.truncate(value);
        }

        let lower = value.to_lowercase();
        if lower.starts_with("bearer ")
            || lower.starts_with("basic ")
            || lower.starts_with("token ")
            || is_likely_secret(value)
        {
            return Cow::Borrowed("[REDACTED]");
        }

        self.truncate(value)
    }

    /// Redact URL credentials.
    ///
    /// Removes userinfo (username:password) and the values of sensitive
    /// query parameters before logging.
    pub fn redact_url<'a>(&self, url: &'a str) -> Cow<'a, str> {
        if !self.redact_sensitive {
            return self.truncate(url);
        }

        let mut out: Cow<'a, str> = Cow::Borrowed(url);

        if let Some(scheme_end) = url.find("://") {
            let rest = &url[scheme_end + 3..];
            let authority_end = rest.find('/').unwrap_or(rest.len());
            if let Some(at_pos) = rest[..authority_end].find('@') {
                let scheme = &url[..scheme_end + 3];
                let host_part = &rest[at_pos + 1..];
                out = Cow::Owned(format!("{}[REDACTED]@{}", scheme, host_part));
            }
        }

        if let Some(q) = out.find('?') {
            let (base, query) = out.split_at(q + 1);
            let redacted: Vec<String> = query
                .split('&')
                .map(|pair| match pair.split_once('=') {
                    Some((name, _)) if self.should_redact_param(name) => {
                        format!("{}=[REDACTED]", name)
                    }
                    _ => pair.to_string(),
                })
                .collect();
            let joined = redacted.join("&");
            if joined != query {
                out = Cow::Owned(format!("{}{}", base, joined));
            }
        }

        match out {
            Cow::Borrowed(s) => self.truncate(s),
            Cow::Owned(s) => Cow::Owned(self.truncate(&s).into_owned()),
        }
    }

    fn should_redact_param(&self, name: &str) -> bool {
        let upper = name.to_uppercase();
        self.redact_params.iter().any(|p| upper.contains(p))
    }

    /// Truncate value if it exceeds max length
    ///
    /// Handles UTF-8 char boundaries properly to avoid panics on multi-byte chars.
    fn truncate<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if value.len() <= self.max_value_length {
            Cow::Borrowed(value)
        } else {
            let mut end = self.max_value_length;
            while end > 0 && !value.is_char_boundary(end) {
                end -= 1;
            }
            Cow::Owned(format!(
                "{}...[truncated {} bytes]",
                &value[..end],
                value.len() - end
            ))
        }
    }
}

/// Check if a value looks like a secret (high entropy, specific formats)
fn is_likely_secret(value: &str) -> bool {
    let trimmed = value.trim();

    // JWT format: three base64 parts separated by dots
    if trimmed.matches('.').count() == 2 {
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.iter().all(|p| p.len() > 10 && is_base64_like(p)) {
            return true;
        }
    }

    // GitHub token prefixes and other common API key shapes
    let prefixes = [
        "ghp_", "gho_", "ghu_", "ghs_", "ghr_", "github_pat_", "sk-", "sk_live_", "sk_test_",
        "eyJ",
    ];
    for prefix in prefixes {
        if trimmed.starts_with(prefix) && trimmed.len() > prefix.len() + 10 {
            return true;
        }
    }

    if trimmed.len() >= 32 && is_high_entropy(trimmed) {
        return true;
    }

    false
}

/// Check if string looks like base64
fn is_base64_like(s: &str) -> bool {
    s.chars().all(|c| {
        c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=' || c == '_' || c == '-'
    })
}

/// Simple entropy check - high ratio of unique chars suggests random data
fn is_high_entropy(s: &str) -> bool {
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return false;
    }

    let unique: HashSet<char> = s.chars().collect();
    let ratio = unique.len() as f64 / s.len() as f64;

    ratio > 0.5 && unique.len() > 15
}

/// Escape control characters so a virtual path cannot forge log lines.
pub fn sanitize_for_log(input: &str) -> String {
    input
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .chars()
        .filter(|c| !c.is_control() || *c == ' ')
        .collect()
}
