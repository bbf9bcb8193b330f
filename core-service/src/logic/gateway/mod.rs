//! Request Gateway Module
//!
//! This module handles:
//! - Bearer credential injection
//! - Response decoding into explicit schemas
//! - Failure classification (Unauthorized / Validation / Unavailable / Unknown)

pub mod client;
pub mod error;

pub use client::RequestGateway;
pub use error::{ApiError, ErrorInfo, ErrorKind};
