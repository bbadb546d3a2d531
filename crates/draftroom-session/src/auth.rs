//! Turning a bearer token into an identity.
//!
//! The draft room does not issue tokens; an external identity service
//! does. The gateway only needs to know who a token belongs to and whether
//! that user may run the draft, which is what [`Authenticator`] answers.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use draftroom_protocol::UserId;

use crate::SessionError;

/// The authenticated user behind a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    /// Set when the token itself grants owner rights. A league may also
    /// list owners by user id.
    pub is_owner: bool,
}

/// Validates a client's bearer token and returns their identity.
///
/// Implementations must fail closed: anything that can't be positively
/// verified is an [`SessionError::AuthFailed`].
///
/// # Example
///
/// ```rust
/// use draftroom_protocol::UserId;
/// use draftroom_session::{Authenticator, Identity, SessionError};
///
/// /// Trusts the token as the user id. Local development only.
/// struct DevAuthenticator;
///
/// impl Authenticator for DevAuthenticator {
///     async fn authenticate(
///         &self,
///         token: &str,
///     ) -> Result<Identity, SessionError> {
///         if token.is_empty() {
///             return Err(SessionError::AuthFailed("empty token".into()));
///         }
///         Ok(Identity {
///             user_id: UserId::from(token),
///             is_owner: false,
///         })
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Validates the token and returns who it belongs to.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Identity, SessionError>> + Send;
}

/// Claims carried by draft room access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    #[serde(default, rename = "isOwner", alias = "is_owner")]
    pub is_owner: bool,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// An [`Authenticator`] for HS256-signed JWTs.
///
/// Signature and `exp` are always checked. A token with an empty `sub` is
/// rejected even when it is otherwise valid.
pub struct JwtAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    /// Creates an authenticator that verifies tokens signed with `secret`.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Decodes and validates a token synchronously.
    pub fn verify(&self, token: &str) -> Result<Identity, SessionError> {
        if token.is_empty() {
            return Err(SessionError::AuthFailed("missing token".into()));
        }

        let data =
            decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                SessionError::AuthFailed("invalid token".into())
            })?;

        if data.claims.sub.trim().is_empty() {
            return Err(SessionError::AuthFailed("token has no subject".into()));
        }

        Ok(Identity {
            user_id: UserId::from(data.claims.sub),
            is_owner: data.claims.is_owner,
        })
    }
}

impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Identity, SessionError> {
        self.verify(token)
    }
}
