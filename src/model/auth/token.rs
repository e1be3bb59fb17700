use chrono::{serde::ts_seconds, DateTime, Duration, Utc};
use jsonwebtoken::{errors::Error as JwtError, DecodingKey, EncodingKey, Header, Validation};
use rocket::{
    http::Status,
    outcome::try_outcome,
    request::{self, FromRequest},
    Request, State,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::model::common::identity::Identity;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// A verified claim that the bearer is a particular [`Identity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "sub")]
    identity: Identity,
}

impl AuthToken {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    /// The authenticated caller.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Sign this token as a JWT valid for `ttl` from now.
    pub fn encode(self, secret: &[u8], ttl: Duration) -> Result<String, JwtError> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + ttl,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
    }

    /// Sign this token with the configured secret and lifetime.
    pub fn into_jwt(self, config: &Config) -> Result<String, JwtError> {
        self.encode(config.jwt_secret(), config.auth_ttl())
    }

    /// Verify a JWT and extract the token. Fails if the signature is wrong or
    /// the token has expired.
    pub fn from_jwt(jwt: &str, config: &Config) -> Result<Self, JwtError> {
        jsonwebtoken::decode::<Claims>(
            jwt,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|data| data.claims.token)
    }
}

/// JWT claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no bearer token or auth cookie supplied")]
    Missing,
    #[error("invalid auth token: {0}")]
    Invalid(#[from] JwtError),
    #[error("auth token names an empty identity")]
    EmptyIdentity,
    #[error("application config is not available")]
    Unconfigured,
}

/// Read the raw JWT from the `Authorization: Bearer` header, or failing that
/// from the auth cookie.
fn raw_token<'r>(req: &'r Request<'_>) -> Option<&'r str> {
    req.headers()
        .get_one("Authorization")
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .or_else(|| req.cookies().get(AUTH_TOKEN_COOKIE).map(|c| c.value()))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = AuthError;

    /// Authenticate the caller. Any failure is a 401.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config = try_outcome!(req
            .guard::<&State<Config>>()
            .await
            .map_error(|(status, ())| (status, AuthError::Unconfigured)));

        let token = raw_token(req)
            .ok_or(AuthError::Missing)
            .and_then(|jwt| Ok(Self::from_jwt(jwt, config)?))
            .and_then(|token| {
                if token.identity.as_str().trim().is_empty() {
                    Err(AuthError::EmptyIdentity)
                } else {
                    Ok(token)
                }
            });

        match token {
            Ok(token) => request::Outcome::Success(token),
            Err(err) => request::Outcome::Error((Status::Unauthorized, err)),
        }
    }
}
