//! Identity-provider token validation.
//!
//! Sessions and sign-in live with the external identity provider. The API
//! only verifies the signed tokens it issues and maps their subject onto a
//! local user row.

pub mod identity;
