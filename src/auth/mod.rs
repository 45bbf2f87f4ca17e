use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::CallerIdentity;

const BEARER_PREFIX: &str = "Bearer ";

/// Claims read from an inbound bearer token. Only `sub` matters here;
/// `exp` is optional but enforced by the validator whenever it is present.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must use Bearer token format")]
    WrongScheme,

    #[error("empty bearer token")]
    EmptyToken,

    #[error("token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),

    #[error("token has no subject")]
    EmptySubject,
}

/// Stateless HS256 bearer-token verifier.
///
/// Holds the decoding key derived from the server secret. Tokens naming any
/// other algorithm fail validation before the signature is checked.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is honoured when present but not required
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.leeway = 0;
        // audience is not part of the contract; tokens carrying one still verify
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify the raw `Authorization` header value and return the caller identity.
    pub fn verify(&self, header: Option<&str>) -> Result<CallerIdentity, AuthError> {
        let header = header.ok_or(AuthError::MissingHeader)?;
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or(AuthError::WrongScheme)?;

        if token.trim().is_empty() {
            return Err(AuthError::EmptyToken);
        }

        let token_data = decode::<Claims>(token, &self.key, &self.validation)?;

        match token_data.claims.sub {
            Some(sub) if !sub.is_empty() => Ok(CallerIdentity::new(sub)),
            _ => Err(AuthError::EmptySubject),
        }
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "unit-test-secret";

    fn sign(claims: serde_json::Value, alg: Algorithm, secret: &str) -> String {
        encode(&Header::new(alg), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    #[test]
    fn accepts_valid_token_and_extracts_subject() {
        let verifier = TokenVerifier::new(SECRET);
        let exp = (Utc::now() + Duration::minutes(60)).timestamp();
        let token = sign(json!({ "sub": "user@test.com", "exp": exp }), Algorithm::HS256, SECRET);

        let identity = verifier.verify(Some(&bearer(&token))).unwrap();
        assert_eq!(identity.as_str(), "user@test.com");
    }

    #[test]
    fn accepts_token_without_expiry() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign(json!({ "sub": "user@test.com" }), Algorithm::HS256, SECRET);

        assert!(verifier.verify(Some(&bearer(&token))).is_ok());
    }

    #[test]
    fn rejects_missing_header_and_wrong_scheme() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign(json!({ "sub": "user@test.com" }), Algorithm::HS256, SECRET);

        assert!(matches!(verifier.verify(None), Err(AuthError::MissingHeader)));
        assert!(matches!(
            verifier.verify(Some(&format!("Token {}", token))),
            Err(AuthError::WrongScheme)
        ));
        assert!(matches!(
            verifier.verify(Some(&format!("bearer {}", token))),
            Err(AuthError::WrongScheme)
        ));
        assert!(matches!(verifier.verify(Some("Bearer ")), Err(AuthError::EmptyToken)));
    }

    #[test]
    fn rejects_token_signed_with_another_secret() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign(json!({ "sub": "user@test.com" }), Algorithm::HS256, "other-secret");

        assert!(matches!(verifier.verify(Some(&bearer(&token))), Err(AuthError::Rejected(_))));
    }

    #[test]
    fn rejects_other_algorithms() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign(json!({ "sub": "user@test.com" }), Algorithm::HS512, SECRET);

        assert!(matches!(verifier.verify(Some(&bearer(&token))), Err(AuthError::Rejected(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let verifier = TokenVerifier::new(SECRET);
        let exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = sign(json!({ "sub": "user@test.com", "exp": exp }), Algorithm::HS256, SECRET);

        assert!(matches!(verifier.verify(Some(&bearer(&token))), Err(AuthError::Rejected(_))));
    }

    #[test]
    fn rejects_token_expired_seconds_ago() {
        let verifier = TokenVerifier::new(SECRET);
        let exp = Utc::now().timestamp() - 5;
        let token = sign(json!({ "sub": "user@test.com", "exp": exp }), Algorithm::HS256, SECRET);

        assert!(matches!(verifier.verify(Some(&bearer(&token))), Err(AuthError::Rejected(_))));
    }

    #[test]
    fn accepts_token_with_audience_claim() {
        let verifier = TokenVerifier::new(SECRET);
        let exp = (Utc::now() + Duration::minutes(5)).timestamp();
        let token = sign(
            json!({ "sub": "user@test.com", "exp": exp, "aud": "tasks-web" }),
            Algorithm::HS256,
            SECRET,
        );

        let identity = verifier.verify(Some(&bearer(&token))).unwrap();
        assert_eq!(identity.as_str(), "user@test.com");
    }

    #[test]
    fn rejects_missing_or_empty_subject() {
        let verifier = TokenVerifier::new(SECRET);

        let token = sign(json!({ "name": "nobody" }), Algorithm::HS256, SECRET);
        assert!(matches!(verifier.verify(Some(&bearer(&token))), Err(AuthError::EmptySubject)));

        let token = sign(json!({ "sub": "" }), Algorithm::HS256, SECRET);
        assert!(matches!(verifier.verify(Some(&bearer(&token))), Err(AuthError::EmptySubject)));
    }

    #[test]
    fn rejects_garbage() {
        let verifier = TokenVerifier::new(SECRET);
        assert!(matches!(
            verifier.verify(Some("Bearer not.a.jwt")),
            Err(AuthError::Rejected(_))
        ));
    }
}
