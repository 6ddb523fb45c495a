//! Token-based credential service backed by configured users.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::UserConfig;
use crate::infrastructure::error::AuthError;
use crate::infrastructure::traits::{Caller, CredentialService, Session};

/// Lowercase hex SHA-256 of a password, the format stored in `users[].password_sha256`.
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Issues one opaque token per user and keeps it until logout.
///
/// Logging in again while a token is live returns the same token.
#[derive(Debug)]
pub struct TokenCredentialService {
    users: Vec<UserConfig>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl TokenCredentialService {
    pub fn new(users: Vec<UserConfig>) -> Self {
        Self {
            users,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn user(&self, username: &str, password: &str) -> Option<&UserConfig> {
        let digest = password_digest(password);
        self.users.iter().find(|u| {
            u.username == username && u.password_sha256.eq_ignore_ascii_case(&digest)
        })
    }
}

impl CredentialService for TokenCredentialService {
    fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let Some(user) = self.user(username, password) else {
            warn!(username, "rejected login");
            return Err(AuthError::InvalidCredentials);
        };

        let mut sessions = self.sessions.write().map_err(|_| AuthError::Poisoned)?;
        if let Some(existing) = sessions.values().find(|s| s.user_id == user.id) {
            let age = Utc::now().signed_duration_since(existing.issued_at);
            debug!(
                username,
                issued_at = %existing.issued_at,
                age_secs = age.num_seconds(),
                "reusing live token"
            );
            return Ok(existing.clone());
        }

        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            issued_at: Utc::now(),
        };
        sessions.insert(session.token.clone(), session.clone());
        info!(username, issued_at = %session.issued_at, "issued token");
        Ok(session)
    }

    fn identify(&self, token: &str) -> Option<Caller> {
        let sessions = self.sessions.read().ok()?;
        sessions.get(token).map(Session::caller)
    }

    fn logout(&self, token: &str) -> bool {
        match self.sessions.write() {
            Ok(mut sessions) => sessions.remove(token).is_some(),
            Err(_) => false,
        }
    }
}
