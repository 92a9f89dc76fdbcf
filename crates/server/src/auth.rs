use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use service::identity::{AuthContext, IdentityVerifier};
use tracing::warn;

/// Session cookie set by the identity provider's frontend SDK.
pub const SESSION_COOKIE: &str = "__session";

enum Credential {
    None,
    Token(String),
    Malformed,
}

/// `Authorization: Bearer <token>` first, then the session cookie.
fn credential(headers: &HeaderMap, jar: &CookieJar) -> Credential {
    if let Some(h) = headers.get(AUTHORIZATION) {
        let Ok(value) = h.to_str() else { return Credential::Malformed };
        return match value.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
                Credential::Token(token.trim().to_string())
            }
            _ => Credential::Malformed,
        };
    }
    match jar.get(SESSION_COOKIE) {
        Some(c) if !c.value().is_empty() => Credential::Token(c.value().to_string()),
        _ => Credential::None,
    }
}

/// Resolve the caller for one request. Never fails; callers decide whether
/// a subject is required.
pub async fn auth_context(verifier: &dyn IdentityVerifier, headers: &HeaderMap, jar: &CookieJar) -> AuthContext {
    match credential(headers, jar) {
        Credential::None => AuthContext::Anonymous,
        Credential::Token(t) => {
            let ctx = AuthContext::resolve(verifier, Some(&t)).await;
            match &ctx {
                AuthContext::Rejected(reason) => warn!(event = "credential_rejected", %reason),
                AuthContext::Unavailable(cause) => warn!(event = "verifier_unavailable", %cause),
                _ => {}
            }
            ctx
        }
        Credential::Malformed => {
            warn!(event = "credential_rejected", reason = "invalid Authorization format (expect Bearer)");
            AuthContext::Rejected("invalid Authorization format (expect Bearer)".into())
        }
    }
}
