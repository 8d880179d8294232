//! Resource addressing under the API prefix, list normalization, and CRUD collection handles.

pub mod collection;
pub mod listing;
pub mod path;

pub use collection::*;
pub use listing::*;
pub use path::*;
