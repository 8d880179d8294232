//! Token secrets and the JSON payloads exchanged with the auth endpoints.

pub mod grant;
pub mod secret;
