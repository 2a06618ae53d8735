//! Network layer for Repofs
//!
//! One HTTP client type shared by both remote backends. Credentials are
//! attached per request by the backend binding; the client itself holds no
//! secrets.

mod client;

pub use client::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT, HttpClient, HttpConfig, Method, Response,
};
