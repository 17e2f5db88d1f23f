#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod availability;
pub mod backend;
mod error;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
#[doc(hidden)]
pub mod prelude;
pub mod session;
pub mod types;

pub use backend::{BackendProvider, BackendService};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use session::{Session, SessionGate};
