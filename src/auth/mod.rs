//! Authentication module
//!
//! The HTTP endpoint (login, logout, refresh, me), the guard trait it
//! delegates to, and the bundled JWT guard.

mod endpoint;
mod guard;
mod jwt_guard;
mod models;
mod revocation;
mod token;
mod users;

pub mod handlers;

pub use endpoint::{AuthEndpoint, LOGIN_FORBIDDEN, LOGIN_SUCCESS, LOGOUT_SUCCESS, REFRESH_SUCCESS};
pub use guard::AuthGuard;
pub use handlers::routes;
pub use jwt_guard::{Claims, JwtGuard};
pub use models::{Credentials, Principal, Token, TokenPayload, TOKEN_TYPE_BEARER};
pub use revocation::RevocationList;
pub use token::RequestToken;
pub use users::{password_digest, UserDirectory};
