use crate::error::AppResult;
use crate::models::SessionState;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "checkout_session";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub session: SessionState,
    pub exp: i64,
    pub iat: i64,
}

/// Signs the checkout session state into a cookie value and reads it back.
#[derive(Clone)]
pub struct SessionTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: i64,
    admin_expires_in: i64,
    secure_cookie: bool,
}

impl SessionTokenService {
    pub fn new(secret: &str, expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
            admin_expires_in: expires_in,
            secure_cookie: true,
        }
    }

    /// Caps the lifetime of tokens carrying an admin login. The token cannot be
    /// revoked, so this bounds how long a copied cookie stays useful.
    pub fn with_admin_ttl(mut self, admin_expires_in: i64) -> Self {
        self.admin_expires_in = admin_expires_in;
        self
    }

    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    pub fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }

    pub fn encode_session(&self, session: &SessionState) -> AppResult<String> {
        let now = Utc::now();
        let ttl = if session.admin_authenticated {
            self.expires_in.min(self.admin_expires_in)
        } else {
            self.expires_in
        };
        let exp = now + Duration::seconds(ttl);

        let claims = SessionClaims {
            session: session.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn decode_session(&self, token: &str) -> AppResult<SessionState> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims.session)
    }
}
