//! Reqwest-based [`BackendProvider`] for the Care Connect REST backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use careconnect_core::{SessionGate, session::MemoryStore};
//! use careconnect_reqwest::{ReqwestClient, ReqwestConfig};
//!
//! let client = ReqwestClient::new(ReqwestConfig::default())?;
//! let service = client.into_service(SessionGate::new(MemoryStore::new()));
//!
//! service.sign_in("ada@example.com", "secret").await?;
//! ```
//!
//! [`BackendProvider`]: careconnect_core::BackendProvider

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod client;
mod config;
mod error;
mod service;

pub use crate::client::{ReqwestClient, TRACING_TARGET};
pub use crate::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, ReqwestConfig};
pub use crate::error::{Error, Result};
