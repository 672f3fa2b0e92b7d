//! Authentication primitives.
//!
//! Tokens are issued by the identity service; this server only validates
//! them. [`jwt::generate_access_token`] exists for tests and local tooling.

pub mod jwt;
