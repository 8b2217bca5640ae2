mod functions;
mod traits;
mod types;
mod validation;

pub use functions::{
    calculate_expiry, is_session_expired, EntropySource, OsEntropy, TokenGenerator, TOKEN_BYTES,
};
pub use traits::{AuthorizationUrlBuilder, CodeExchanger, IdTokenVerifier, SessionRepository};
pub use types::{CompletedLogin, IdTokenClaims, LoginRedirect, Session, SessionId, TokenSet};
pub use validation::{validate_return_to, DEFAULT_RETURN_TO};
