//! The single enforcement point for permission checks

use casting_jose::JwtRef;

use crate::{AuthError, PermissionRef, TokenVerifier, VerifiedToken};

/// Authorizes operations that each require one permission
#[derive(Debug, Clone)]
pub struct Gate {
    verifier: TokenVerifier,
}

impl Gate {
    /// Constructs a gate around a verifier
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// The verifier consulted by this gate
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Verifies `token` and checks that it grants `required`
    ///
    /// # Errors
    ///
    /// Returns the verifier's error unchanged if the token is not valid, or
    /// [`AuthError::InsufficientPermission`] if it is valid but does not
    /// grant `required`.
    pub async fn authorize(
        &self,
        token: &JwtRef,
        required: &PermissionRef,
    ) -> Result<VerifiedToken, AuthError> {
        let verified = match self.verifier.verify(token).await {
            Ok(verified) => verified,
            Err(err) => {
                tracing::debug!(reason = err.reason(), %required, "token rejected");
                return Err(err);
            }
        };

        if !verified.has_permission(required) {
            tracing::debug!(
                subject = %verified.subject(),
                %required,
                "token lacks required permission"
            );
            return Err(AuthError::InsufficientPermission {
                required: required.to_owned(),
            });
        }

        tracing::debug!(subject = %verified.subject(), %required, "authorized");
        Ok(verified)
    }
}
