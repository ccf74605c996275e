//! Static auth provider.
//!
//! Holds whatever session it was last given. Used by the CLI and in tests in
//! place of a hosted identity service.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use recipebox_core::social::AuthSession;
use recipebox_core::storage::AuthProvider;

#[derive(Debug, Clone, Default)]
pub struct StaticAuthProvider {
    session: Arc<RwLock<Option<AuthSession>>>,
}

impl StaticAuthProvider {
    /// Creates a provider with nobody signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Creates a provider already signed in as `session`.
    pub fn signed_in(session: AuthSession) -> Self {
        Self {
            session: Arc::new(RwLock::new(Some(session))),
        }
    }

    pub async fn sign_in(&self, session: AuthSession) {
        tracing::debug!(user_id = %session.user_id, provider = %session.provider, "Signed in");
        *self.session.write().await = Some(session);
    }

    pub async fn sign_out(&self) {
        if let Some(session) = self.session.write().await.take() {
            tracing::debug!(user_id = %session.user_id, "Signed out");
        }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_session(&self) -> Option<AuthSession> {
        self.session.read().await.clone()
    }
}

/// Builds a verified password session for a user id (useful for testing).
pub fn password_session(user_id: impl Into<String>, email: impl Into<String>) -> AuthSession {
    AuthSession {
        user_id: user_id.into(),
        email: email.into(),
        display_name: None,
        email_verified: true,
        provider: "password".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let auth = StaticAuthProvider::signed_out();
        assert!(auth.current_session().await.is_none());

        auth.sign_in(password_session("u1", "u1@example.com")).await;
        assert_eq!(
            auth.current_session().await.map(|s| s.user_id),
            Some("u1".to_string())
        );

        auth.sign_out().await;
        assert!(auth.current_session().await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_session() {
        let auth = StaticAuthProvider::signed_out();
        let clone = auth.clone();

        clone.sign_in(password_session("u2", "u2@example.com")).await;

        assert!(auth.current_session().await.is_some());
    }
}
