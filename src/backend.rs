//! Backend-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated connection metadata ([`BackendDescriptor`]): the base URL,
//! the API prefix resources live under, the token/refresh endpoint paths, the login entry point
//! handed to logout handlers, and the refresh policy. `strategy` defines [`BackendStrategy`],
//! an HTTP-client-agnostic hook used by flows to turn error bodies into caller-facing detail.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
