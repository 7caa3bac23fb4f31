pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{extract_bearer_token, issue_token, validate_token, JwtClaims, TOKEN_ISSUER};
pub use middleware::auth_middleware;
pub use models::AuthenticatedUser;
