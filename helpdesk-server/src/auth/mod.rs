//! Authentication and authorization
//!
//! - [`JwtService`] - token issue / verify
//! - [`authenticate`] - the authorization gate
//! - [`CurrentUser`] - resolved caller identity
//! - [`require_auth`] - gate as router middleware
//! - [`IdentityService`] - register / login / profile

pub mod extractor;
pub mod identity;
pub mod jwt;
pub mod middleware;

pub use extractor::{CurrentUser, authenticate};
pub use identity::IdentityService;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
