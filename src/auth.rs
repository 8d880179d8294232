//! Session credentials, token secrets, and auth endpoint payloads.

pub mod session;
pub mod token;

pub use session::*;
pub use token::{grant::*, secret::*};
