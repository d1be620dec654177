//! Request Client
//!
//! Authenticated HTTP client used by every UI call site:
//! - `domain/` - Session, request envelope, storage and navigation ports
//! - `application/` - `RequestClient` (send / retry state machine),
//!   `SessionManager` (single-flight refresh), configuration
//! - `infra/` - Session stores (memory, JSON file) and sign-in redirects
//! - `api` - Typed calls for the community / post / dataset / join-request
//!   resources
//!
//! ## Credential model
//! - Every call carries `Authorization: Bearer <access_token>` when a
//!   session exists
//! - A 401 triggers at most one refresh and at most one retry
//! - Concurrent 401s share a single in-flight refresh
//! - A failed refresh clears the session and redirects to sign-in; the
//!   caller still receives the original 401

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::config::ClientConfig;
pub use application::send::RequestClient;
pub use application::session_manager::{RefreshOutcome, SessionManager};
pub use domain::navigation::SignInRedirect;
pub use domain::request::{FormPart, RequestBody, RequestEnvelope};
pub use domain::session::{AccessToken, RefreshToken, Session};
pub use domain::store::SessionStore;
pub use error::{ClientError, ClientResult};
pub use infra::file::FileSessionStore;
pub use infra::memory::MemorySessionStore;
pub use infra::redirect::{TracingRedirect, WatchRedirect};

pub use kernel::envelope::ApiEnvelope;
