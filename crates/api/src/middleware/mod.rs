//! Request extractors for identity and role checks.
//!
//! - [`auth::AuthUser`] resolves the local account behind an identity-provider token.
//! - [`rbac::RequireAdmin`] and [`rbac::RequireReviewer`] add a role gate on top.

pub mod auth;
pub mod rbac;
