//! Type definitions for the Messenger Remote API
//!
//! This module contains the main data structures used for requests and responses.

pub mod request;
pub mod response;
pub mod status;

pub use request::{ConfirmRequest, LoginRequest, SendQuery};
pub use response::{ErrorResponse, PingResponse, ServiceStatus};
pub use status::SessionStatus;
