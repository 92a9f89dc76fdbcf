use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::debug;

use super::{IdentityError, IdentityVerifier, Subject};

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    sid: Option<String>,
}

/// Verifies session JWTs with either a shared secret (HS256) or the identity
/// provider's RSA public key (RS256).
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn hs256(secret: &str) -> Self {
        Self::with_key(DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
    }

    /// PEM may arrive with literal `\n` sequences when read from an env var.
    pub fn rs256_pem(pem: &str) -> Result<Self, IdentityError> {
        let pem = pem.replace("\\n", "\n");
        let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| IdentityError::Config(e.to_string()))?;
        Ok(Self::with_key(key, Algorithm::RS256))
    }

    /// Public key wins over the shared secret when both are set.
    pub fn from_config(cfg: &configs::AuthConfig) -> Result<Self, IdentityError> {
        let mut verifier = match (&cfg.jwt_public_key_pem, &cfg.jwt_secret) {
            (Some(pem), _) if !pem.trim().is_empty() => Self::rs256_pem(pem)?,
            (_, Some(secret)) if !secret.is_empty() => Self::hs256(secret),
            _ => return Err(IdentityError::Config("no jwt key material configured".into())),
        };
        verifier.validation.leeway = cfg.leeway_secs;
        if let Some(iss) = cfg.issuer.as_deref().filter(|i| !i.is_empty()) {
            verifier.validation.set_issuer(&[iss]);
        }
        Ok(verifier)
    }

    fn with_key(key: DecodingKey, alg: Algorithm) -> Self {
        let mut validation = Validation::new(alg);
        validation.validate_exp = true;
        validation.validate_aud = false;
        Self { key, validation }
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, bearer_token: &str) -> Result<Subject, IdentityError> {
        let header = decode_header(bearer_token).map_err(|e| IdentityError::InvalidCredential(e.to_string()))?;
        if header.alg != self.validation.algorithms[0] {
            return Err(IdentityError::InvalidCredential(format!("unexpected algorithm {:?}", header.alg)));
        }
        let data = decode::<Claims>(bearer_token, &self.key, &self.validation).map_err(|e| {
            debug!(err = %e, "token validation failed");
            IdentityError::InvalidCredential(e.to_string())
        })?;
        if data.claims.sub.trim().is_empty() {
            return Err(IdentityError::InvalidCredential("empty subject".into()));
        }
        Ok(Subject { user_id: data.claims.sub, session_id: data.claims.sid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        sid: &'a str,
        exp: i64,
        iss: &'a str,
    }

    fn token(secret: &str, exp_offset: i64, iss: &str) -> String {
        let claims = TestClaims { sub: "user_42", sid: "sess_1", exp: chrono::Utc::now().timestamp() + exp_offset, iss };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn auth_cfg(secret: &str) -> configs::AuthConfig {
        configs::AuthConfig {
            jwt_secret: Some(secret.into()),
            jwt_public_key_pem: None,
            issuer: Some("https://clerk.example".into()),
            leeway_secs: 0,
        }
    }

    #[tokio::test]
    async fn valid_token_yields_subject() {
        let v = JwtVerifier::from_config(&auth_cfg("s3cret")).unwrap();
        let s = v.verify(&token("s3cret", 600, "https://clerk.example")).await.unwrap();
        assert_eq!(s.user_id, "user_42");
        assert_eq!(s.session_id.as_deref(), Some("sess_1"));
    }

    #[tokio::test]
    async fn wrong_secret_expired_or_foreign_issuer_rejected() {
        let v = JwtVerifier::from_config(&auth_cfg("s3cret")).unwrap();
        assert!(v.verify(&token("other", 600, "https://clerk.example")).await.is_err());
        assert!(v.verify(&token("s3cret", -600, "https://clerk.example")).await.is_err());
        assert!(v.verify(&token("s3cret", 600, "https://evil.example")).await.is_err());
        assert!(v.verify("not-a-jwt").await.is_err());
    }

    #[test]
    fn missing_key_material_is_config_error() {
        let cfg = configs::AuthConfig { jwt_secret: None, jwt_public_key_pem: None, issuer: None, leeway_secs: 60 };
        assert!(matches!(JwtVerifier::from_config(&cfg), Err(IdentityError::Config(_))));
        assert!(JwtVerifier::rs256_pem("-----BEGIN PUBLIC KEY-----\\ngarbage\\n-----END PUBLIC KEY-----").is_err());
    }
}
