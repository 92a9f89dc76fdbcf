//! Caller identity: bearer-token verification and the per-request auth context.

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::ServiceError;

pub mod jwt;

/// A verified caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subject {
    pub user_id: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("{0}")]
    InvalidCredential(String),
    #[error("identity verifier misconfigured: {0}")]
    Config(String),
}

impl From<IdentityError> for ServiceError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::InvalidCredential(msg) => ServiceError::InvalidCredential(msg),
            IdentityError::Config(msg) => ServiceError::IdentityUnavailable(msg),
        }
    }
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, bearer_token: &str) -> Result<Subject, IdentityError>;
}

/// Outcome of credential extraction for one request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthContext {
    /// No credential supplied.
    #[default]
    Anonymous,
    Authenticated(Subject),
    /// A credential was supplied but did not verify.
    Rejected(String),
    /// A credential was supplied but the verifier could not check it.
    Unavailable(String),
}

impl AuthContext {
    /// Verify `token` if present.
    pub async fn resolve(verifier: &dyn IdentityVerifier, token: Option<&str>) -> Self {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            None => Self::Anonymous,
            Some(t) => match verifier.verify(t).await {
                Ok(subject) => Self::Authenticated(subject),
                Err(IdentityError::Config(msg)) => Self::Unavailable(msg),
                Err(e) => Self::Rejected(e.to_string()),
            },
        }
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self::Authenticated(Subject { user_id: user_id.into(), session_id: None })
    }

    /// Subject required; missing → `Unauthorized`, bad → `InvalidCredential`,
    /// unverifiable → `IdentityUnavailable`.
    pub fn require_subject(&self) -> Result<&Subject, ServiceError> {
        match self {
            Self::Authenticated(s) => Ok(s),
            Self::Anonymous => Err(ServiceError::Unauthorized),
            Self::Rejected(reason) => Err(ServiceError::InvalidCredential(reason.clone())),
            Self::Unavailable(cause) => Err(ServiceError::IdentityUnavailable(cause.clone())),
        }
    }

    /// Subject if verified; rejected or unverifiable credentials count as anonymous.
    pub fn optional_subject(&self) -> Option<&Subject> {
        match self {
            Self::Authenticated(s) => Some(s),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> { self.optional_subject().map(|s| s.user_id.as_str()) }
}

pub mod mock {
    use super::*;
    use std::collections::HashMap;

    /// Accepts a fixed set of tokens, each mapped to a user id.
    #[derive(Default)]
    pub struct StaticTokenVerifier {
        tokens: HashMap<String, String>,
    }

    impl StaticTokenVerifier {
        pub fn with_token(mut self, token: &str, user_id: &str) -> Self {
            self.tokens.insert(token.to_string(), user_id.to_string());
            self
        }
    }

    #[async_trait]
    impl IdentityVerifier for StaticTokenVerifier {
        async fn verify(&self, bearer_token: &str) -> Result<Subject, IdentityError> {
            self.tokens
                .get(bearer_token)
                .map(|uid| Subject { user_id: uid.clone(), session_id: None })
                .ok_or_else(|| IdentityError::InvalidCredential("unknown token".into()))
        }
    }

    /// Fails every call as a misconfigured verifier would.
    pub struct MisconfiguredVerifier;

    #[async_trait]
    impl IdentityVerifier for MisconfiguredVerifier {
        async fn verify(&self, _bearer_token: &str) -> Result<Subject, IdentityError> {
            Err(IdentityError::Config("no verification key".into()))
        }
    }
}
