/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: HS256 access/refresh token creation and validation
/// - [`middleware`]: the per-request actor context injected after the
///   bearer token is verified and resolved to a live user row
///
/// Authorization itself lives in [`crate::policy`]; this module only
/// establishes who the actor is.

pub mod jwt;
pub mod middleware;
pub mod password;
