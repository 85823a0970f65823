mod host;
mod oauth;
mod provider;
mod status;

pub use host::{HostError, IdentityHost};
pub use oauth::OAuthIdentity;
pub use provider::{AuthError, AuthToken, TokenProvider};
pub use status::AuthStatus;
