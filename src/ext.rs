//! Public extension contracts (logout handling, request signing).
//!
//! Hosts decide what "redirect to the login entry point" means for them, so forced logout is
//! surfaced through [`LogoutHandler`]. Bearer attachment is exposed through [`RequestSignerExt`] so the same
//! signing rules can be applied to requests built outside the client.

pub mod logout;
pub mod request_signer;

pub use logout::*;
pub use request_signer::*;
