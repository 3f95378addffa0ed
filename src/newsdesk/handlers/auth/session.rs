//! HS256 session authority: typed claims, token issuance and verification,
//! and the refresh-token cookie.
//!
//! Access tokens live for 15 minutes and travel in headers; refresh tokens
//! live for 7 days and travel only in an `HttpOnly` cookie. Both are signed
//! with the process-wide secret; validation pins the algorithm to HS256 so a
//! token asserting any other algorithm is rejected outright.

use axum::http::{header::InvalidHeaderValue, HeaderValue};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::error::AuthError;

pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Signed claim set carried by both token kinds.
///
/// Unknown fields are rejected at deserialization, so a token minted with a
/// widened claim map by some other tool does not pass as ours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    pub sub: String,
    pub admin: bool,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and validates admin session tokens. Holds no mutable state.
pub struct SessionAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    production: bool,
}

impl SessionAuthority {
    #[must_use]
    pub fn new(secret: &SecretString, production: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
            production,
        }
    }

    /// Issue a fresh access/refresh pair for `username`.
    ///
    /// # Errors
    /// Fails with `StoreUnavailable` if signing fails.
    pub fn issue_pair(&self, username: &str) -> Result<TokenPair, AuthError> {
        let now = Utc::now().timestamp();
        let access = self.sign(username, now, now + ACCESS_TOKEN_TTL_SECS)?;
        let refresh = self.sign(username, now, now + REFRESH_TOKEN_TTL_SECS)?;

        Ok(TokenPair { access, refresh })
    }

    fn sign(&self, username: &str, iat: i64, exp: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: username.to_string(),
            admin: true,
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|err| {
            error!("Failed to sign token: {err}");
            AuthError::StoreUnavailable
        })
    }

    /// Validate signature, algorithm and expiry, returning the claims.
    ///
    /// # Errors
    /// Any malformed, tampered, expired or wrong-algorithm token maps to
    /// `InvalidToken`; the caller never learns which check failed.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Build the `Set-Cookie` value carrying a refresh token.
    ///
    /// Development uses `SameSite=Lax`; production switches to
    /// `SameSite=None; Secure` because the admin UI is served from another
    /// origin.
    ///
    /// # Errors
    /// Returns an error if the token contains bytes not valid in a header.
    pub fn refresh_cookie(&self, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{REFRESH_COOKIE}={token}; Path=/; HttpOnly; Max-Age={REFRESH_TOKEN_TTL_SECS}"
        );
        if self.production {
            cookie.push_str("; SameSite=None; Secure");
        } else {
            cookie.push_str("; SameSite=Lax");
        }
        HeaderValue::from_str(&cookie)
    }

    /// Build the `Set-Cookie` value that clears the refresh cookie.
    ///
    /// # Errors
    /// Returns an error if the value is not a valid header value.
    pub fn clear_refresh_cookie(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{REFRESH_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
        if self.production {
            cookie.push_str("; SameSite=None; Secure");
        } else {
            cookie.push_str("; SameSite=Lax");
        }
        HeaderValue::from_str(&cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn authority() -> SessionAuthority {
        SessionAuthority::new(&SecretString::from("test-secret".to_string()), false)
    }

    #[test]
    fn issue_then_verify_round_trips() -> Result<()> {
        let authority = authority();
        let pair = authority.issue_pair("admin").map_err(|e| anyhow::anyhow!("{e:?}"))?;

        let access = authority
            .verify(&pair.access)
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        assert_eq!(access.sub, "admin");
        assert!(access.admin);
        assert_eq!(access.exp - access.iat, ACCESS_TOKEN_TTL_SECS);

        let refresh = authority
            .verify(&pair.refresh)
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        assert_eq!(refresh.exp - refresh.iat, REFRESH_TOKEN_TTL_SECS);

        Ok(())
    }

    #[test]
    fn wrong_secret_is_rejected() -> Result<()> {
        let pair = authority()
            .issue_pair("admin")
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;

        let other = SessionAuthority::new(&SecretString::from("other-secret".to_string()), false);
        assert_eq!(other.verify(&pair.access), Err(AuthError::InvalidToken));

        Ok(())
    }

    #[test]
    fn non_hs256_algorithm_is_rejected() -> Result<()> {
        // Same secret, different MAC algorithm: algorithm substitution must
        // not be accepted.
        let claims = Claims {
            sub: "admin".to_string(),
            admin: true,
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )?;

        assert_eq!(authority().verify(&token), Err(AuthError::InvalidToken));

        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> Result<()> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "admin".to_string(),
            admin: true,
            iat: now - 3600,
            // Past the default validation leeway.
            exp: now - 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )?;

        assert_eq!(authority().verify(&token), Err(AuthError::InvalidToken));

        Ok(())
    }

    #[test]
    fn unknown_claim_fields_are_rejected() -> Result<()> {
        #[derive(Serialize)]
        struct WideClaims {
            sub: String,
            admin: bool,
            iat: i64,
            exp: i64,
            scope: String,
        }

        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &WideClaims {
                sub: "admin".to_string(),
                admin: true,
                iat: now,
                exp: now + 600,
                scope: "everything".to_string(),
            },
            &EncodingKey::from_secret(b"test-secret"),
        )?;

        assert_eq!(authority().verify(&token), Err(AuthError::InvalidToken));

        Ok(())
    }

    #[test]
    fn missing_claim_fields_are_rejected() -> Result<()> {
        #[derive(Serialize)]
        struct NarrowClaims {
            sub: String,
            exp: i64,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &NarrowClaims {
                sub: "admin".to_string(),
                exp: Utc::now().timestamp() + 600,
            },
            &EncodingKey::from_secret(b"test-secret"),
        )?;

        assert_eq!(authority().verify(&token), Err(AuthError::InvalidToken));

        Ok(())
    }

    #[test]
    fn development_cookie_attributes() -> Result<()> {
        let cookie = authority().refresh_cookie("tok")?;
        let value = cookie.to_str()?;
        assert!(value.starts_with("refresh_token=tok; "));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Max-Age=604800"));
        assert!(value.contains("SameSite=Lax"));
        assert!(!value.contains("Secure"));
        Ok(())
    }

    #[test]
    fn production_cookie_attributes() -> Result<()> {
        let authority =
            SessionAuthority::new(&SecretString::from("test-secret".to_string()), true);
        let value = authority.refresh_cookie("tok")?;
        let value = value.to_str()?;
        assert!(value.contains("SameSite=None"));
        assert!(value.contains("Secure"));
        Ok(())
    }

    #[test]
    fn clear_cookie_expires_immediately() -> Result<()> {
        let cookie = authority().clear_refresh_cookie()?;
        let value = cookie.to_str()?;
        assert!(value.starts_with("refresh_token=;"));
        assert!(value.contains("Max-Age=0"));
        Ok(())
    }
}
