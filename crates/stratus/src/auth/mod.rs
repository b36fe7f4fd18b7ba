//! Authentication: credentials, tokens, and the session that owns them.
//!
//! Every resource request flows through an [`AuthSession`], which guarantees
//! that by the time a request is sent the client either holds a verified
//! access token or a definitive authentication failure has been raised.

mod credentials;
mod session;
mod tokens;

pub use credentials::Credentials;
pub use session::AuthSession;
pub use tokens::{AccessToken, RefreshToken};
