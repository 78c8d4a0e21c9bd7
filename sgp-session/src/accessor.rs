//! Session store accessor
//!
//! The single entry point protected pages use to check, read and end the
//! session, and to talk to the backend with the stored bearer token.

use crate::http::{FetchRequest, FetchResponse, HttpTransport};
use crate::navigator::Navigator;
use crate::repository::SessionRepository;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use sgp_core::{
    not_authenticated_error, ErrorContext, PortalError, PortalResult, Role, RouteConfig, Session,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of the page guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGate {
    /// A token is present; the page may render
    Authenticated,
    /// The browsing context was sent to the login page; stop here
    Redirected,
}

impl AuthGate {
    pub fn is_redirected(self) -> bool {
        self == AuthGate::Redirected
    }
}

pub struct SessionAccessor {
    repository: Arc<dyn SessionRepository>,
    navigator: Arc<dyn Navigator>,
    transport: Arc<dyn HttpTransport>,
    routes: RouteConfig,
    api_base_url: String,
}

impl SessionAccessor {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        navigator: Arc<dyn Navigator>,
        transport: Arc<dyn HttpTransport>,
        routes: RouteConfig,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            navigator,
            transport,
            routes,
            api_base_url: api_base_url.into(),
        }
    }

    pub fn routes(&self) -> &RouteConfig {
        &self.routes
    }

    pub fn repository(&self) -> &Arc<dyn SessionRepository> {
        &self.repository
    }

    /// True iff a token is stored. No expiry check, no network call.
    pub async fn is_authenticated(&self) -> bool {
        match self.repository.token().await {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "Token lookup failed; treating session as absent");
                false
            }
        }
    }

    /// Current session; unreadable storage yields an empty session
    pub async fn current_user(&self) -> Session {
        match self.repository.read().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Session lookup failed; treating session as absent");
                Session::anonymous()
            }
        }
    }

    /// Redirect to the login page unless a token is stored
    pub async fn require_auth(&self) -> AuthGate {
        if self.is_authenticated().await {
            AuthGate::Authenticated
        } else {
            info!(login = %self.routes.login_path, "No session token, redirecting to login");
            self.navigator.redirect(&self.routes.login_path).await;
            AuthGate::Redirected
        }
    }

    /// Clear the session and go to the login page. Safe to repeat.
    ///
    /// The redirect happens even when clearing storage fails; the failure is
    /// returned afterwards.
    pub async fn logout(&self) -> PortalResult<()> {
        let cleared = self.repository.clear().await;
        if let Err(e) = &cleared {
            warn!(error = %e, "Failed to clear session storage");
        }

        info!("Logged out");
        self.navigator.redirect(&self.routes.login_path).await;
        cleared
    }

    /// Landing page for a role; absent or unknown roles get the operator page
    pub fn default_page_for_role(&self, role: Option<&Role>) -> &str {
        self.routes.landing_page(role)
    }

    /// Landing page for whoever is signed in
    pub async fn default_page(&self) -> String {
        let session = self.current_user().await;
        self.default_page_for_role(session.role.as_ref()).to_string()
    }

    /// Resolve a request URL against the API base URL.
    ///
    /// Absolute URLs pass through unchanged.
    pub fn resolve_url(&self, url: &str) -> PortalResult<url::Url> {
        match url::Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let joined = format!(
                    "{}/{}",
                    self.api_base_url.trim_end_matches('/'),
                    url.trim_start_matches('/')
                );
                url::Url::parse(&joined).map_err(|e| invalid_url(&joined, e))
            }
            Err(e) => Err(invalid_url(url, e)),
        }
    }

    /// Perform a request carrying `Authorization: Bearer <token>`.
    ///
    /// Without a stored token, or with an empty one, this fails with
    /// `NotAuthenticated` before the transport is touched. A 401 response logs
    /// the user out but is still returned as-is; callers check the status
    /// themselves.
    pub async fn auth_fetch(&self, mut request: FetchRequest) -> PortalResult<FetchResponse> {
        let token = self
            .repository
            .token()
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Token lookup failed");
                None
            })
            .filter(|token| !token.is_empty())
            .ok_or_else(|| not_authenticated_error!("session_accessor"))?;

        let bearer = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            PortalError::Validation {
                message: format!("Stored token cannot be sent as a header: {}", e),
                field: Some("token".to_string()),
                context: ErrorContext::new("session_accessor").with_operation("auth_fetch"),
            }
        })?;

        request.url = self.resolve_url(&request.url)?.to_string();
        request.headers.insert(AUTHORIZATION, bearer);

        let response = self.transport.send(request).await?;

        if response.is_unauthorized() {
            warn!("Request rejected with 401, ending session");
            if let Err(e) = self.logout().await {
                e.log();
            }
        }

        Ok(response)
    }
}

fn invalid_url(url: &str, e: url::ParseError) -> PortalError {
    PortalError::Validation {
        message: format!("Invalid request URL '{}': {}", url, e),
        field: Some("url".to_string()),
        context: ErrorContext::new("session_accessor").with_operation("resolve_url"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StubTransport;
    use crate::navigator::RecordingNavigator;
    use crate::repository::StoredSessionRepository;
    use crate::storage::{MemoryStore, ROLE_KEY, TOKEN_KEY, USERNAME_KEY};
    use reqwest::StatusCode;

    struct Fixture {
        store: MemoryStore,
        navigator: RecordingNavigator,
        transport: StubTransport,
        accessor: SessionAccessor,
    }

    fn fixture(entries: &[(&str, &str)]) -> Fixture {
        let store = MemoryStore::with_entries(entries.iter().copied());
        let navigator = RecordingNavigator::new();
        let transport = StubTransport::new();
        let accessor = SessionAccessor::new(
            Arc::new(StoredSessionRepository::new(Arc::new(store.clone()))),
            Arc::new(navigator.clone()),
            Arc::new(transport.clone()),
            RouteConfig::default(),
            "http://localhost:8001/api",
        );

        Fixture {
            store,
            navigator,
            transport,
            accessor,
        }
    }

    #[tokio::test]
    async fn test_token_presence_is_authentication() {
        let f = fixture(&[(TOKEN_KEY, "t1")]);
        assert!(f.accessor.is_authenticated().await);

        let f = fixture(&[(USERNAME_KEY, "ana"), (ROLE_KEY, "operator")]);
        assert!(!f.accessor.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_require_auth_redirects_without_token() {
        let f = fixture(&[]);
        assert_eq!(f.accessor.require_auth().await, AuthGate::Redirected);
        assert_eq!(
            f.navigator.redirects().await,
            vec!["../login/login.html".to_string()]
        );
    }

    #[tokio::test]
    async fn test_require_auth_is_noop_with_token() {
        let f = fixture(&[(TOKEN_KEY, "t1")]);
        assert_eq!(f.accessor.require_auth().await, AuthGate::Authenticated);
        assert!(f.navigator.redirects().await.is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_and_redirects_even_when_logged_out() {
        let f = fixture(&[(TOKEN_KEY, "t1"), (USERNAME_KEY, "bo"), (ROLE_KEY, "admin")]);

        f.accessor.logout().await.unwrap();
        assert!(!f.accessor.is_authenticated().await);
        assert!(f.store.snapshot().await.is_empty());

        f.accessor.logout().await.unwrap();
        assert!(!f.accessor.is_authenticated().await);
        assert_eq!(f.navigator.redirects().await.len(), 2);
    }

    #[tokio::test]
    async fn test_current_user_with_partial_storage() {
        let f = fixture(&[(ROLE_KEY, "supervisor")]);
        let session = f.accessor.current_user().await;
        assert_eq!(session.token, None);
        assert_eq!(session.username, None);
        assert_eq!(session.role, Some(Role::Supervisor));
    }

    #[tokio::test]
    async fn test_default_pages() {
        let f = fixture(&[(TOKEN_KEY, "t1"), (ROLE_KEY, "admin")]);
        assert_eq!(f.accessor.default_page().await, "../page_03/page_03.html");
        assert_eq!(
            f.accessor.default_page_for_role(Some(&Role::Operator)),
            "../page_01/page_01.html"
        );
        assert_eq!(
            f.accessor.default_page_for_role(None),
            "../page_01/page_01.html"
        );
    }

    #[test]
    fn test_resolve_url() {
        let f = fixture(&[]);
        assert_eq!(
            f.accessor.resolve_url("/orders?line=2").unwrap().as_str(),
            "http://localhost:8001/api/orders?line=2"
        );
        assert_eq!(
            f.accessor.resolve_url("orders").unwrap().as_str(),
            "http://localhost:8001/api/orders"
        );
        assert_eq!(
            f.accessor
                .resolve_url("https://other.example.com/x")
                .unwrap()
                .as_str(),
            "https://other.example.com/x"
        );
    }

    #[tokio::test]
    async fn test_auth_fetch_without_token_never_reaches_transport() {
        let f = fixture(&[(USERNAME_KEY, "ana")]);

        let result = f.accessor.auth_fetch(FetchRequest::get("/orders")).await;
        assert!(matches!(result, Err(PortalError::NotAuthenticated { .. })));
        assert!(f.transport.requests().await.is_empty());
        assert!(f.navigator.redirects().await.is_empty());
    }

    #[tokio::test]
    async fn test_auth_fetch_refuses_empty_token() {
        let f = fixture(&[(TOKEN_KEY, "")]);

        // Presence alone still counts for the page guard
        assert!(f.accessor.is_authenticated().await);

        let result = f.accessor.auth_fetch(FetchRequest::get("/orders")).await;
        assert!(matches!(result, Err(PortalError::NotAuthenticated { .. })));
        assert!(f.transport.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_auth_fetch_merges_headers() {
        let f = fixture(&[(TOKEN_KEY, "t1")]);
        f.transport
            .push_response(FetchResponse::new(StatusCode::OK, "[]"))
            .await;

        let request = FetchRequest::get("/orders")
            .header("X-Line", "3")
            .unwrap()
            .header("Authorization", "Basic stale")
            .unwrap();
        let response = f.accessor.auth_fetch(request).await.unwrap();
        assert!(response.is_success());

        let sent = f.transport.requests().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "http://localhost:8001/api/orders");
        assert_eq!(sent[0].headers.get("x-line").unwrap(), "3");
        let auth: Vec<_> = sent[0].headers.get_all(AUTHORIZATION).iter().collect();
        assert_eq!(auth, vec!["Bearer t1"]);
    }

    #[tokio::test]
    async fn test_auth_fetch_401_logs_out_and_returns_response() {
        let f = fixture(&[(TOKEN_KEY, "t1"), (USERNAME_KEY, "ana"), (ROLE_KEY, "operator")]);
        f.transport
            .push_response(FetchResponse::new(StatusCode::UNAUTHORIZED, "expired"))
            .await;

        let response = f
            .accessor
            .auth_fetch(FetchRequest::get("/orders"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.text(), "expired");
        assert!(f.store.snapshot().await.is_empty());
        assert_eq!(
            f.navigator.last_redirect().await.as_deref(),
            Some("../login/login.html")
        );
    }

    #[tokio::test]
    async fn test_auth_fetch_propagates_transport_errors() {
        let f = fixture(&[(TOKEN_KEY, "t1")]);

        // Stub has nothing queued, so the send fails
        let result = f.accessor.auth_fetch(FetchRequest::get("/orders")).await;
        assert!(matches!(result, Err(PortalError::Network { .. })));
        assert!(f.accessor.is_authenticated().await);
    }
}
