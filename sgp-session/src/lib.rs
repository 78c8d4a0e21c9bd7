//! SGP Session - Session store accessor
//!
//! Wraps persistent key/value storage holding the authentication state
//! (token, username, role) and exposes the guard, logout and authenticated
//! fetch used by every protected page.
//!
//! ## Architecture
//!
//! - **storage**: raw string storage ([`KeyValueStore`]) with memory and file backends
//! - **repository**: the three session keys as one [`Session`](sgp_core::Session)
//! - **navigator**: where redirects go
//! - **http**: the transport behind `auth_fetch`
//! - **accessor**: [`SessionAccessor`], the public face of the above

pub mod accessor;
pub mod http;
pub mod navigator;
pub mod repository;
pub mod storage;

pub use accessor::{AuthGate, SessionAccessor};
pub use http::{
    create_http_client, FetchRequest, FetchResponse, HttpTransport, ReqwestTransport,
    StubTransport,
};
pub use navigator::{Navigator, RecordingNavigator};
pub use repository::{SessionRepository, StoredSessionRepository};
pub use storage::{
    FileStore, KeyValueStore, MemoryStore, ROLE_KEY, SIDEBAR_COLLAPSED_KEY, TOKEN_KEY,
    USERNAME_KEY,
};

pub use reqwest::{Method, StatusCode};
