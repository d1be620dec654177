//! Application Layer
//!
//! The send/refresh/retry state machine and its configuration.

pub mod config;
pub mod send;
pub mod session_manager;
pub mod sign_in;

pub use config::ClientConfig;
pub use send::RequestClient;
pub use session_manager::{RefreshOutcome, SessionManager};
pub use sign_in::SignInInput;
