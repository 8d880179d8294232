//! Normalization of list responses, which arrive either as bare arrays or as paginated pages.

// self
use crate::_prelude::*;

/// Paginated list envelope: `{count, next, previous, results}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
	/// Total number of items across all pages, when reported.
	#[serde(default)]
	pub count: Option<u64>,
	/// URL of the next page.
	#[serde(default)]
	pub next: Option<String>,
	/// URL of the previous page.
	#[serde(default)]
	pub previous: Option<String>,
	/// Items on this page.
	#[serde(default = "Vec::new")]
	pub results: Vec<T>,
}

/// Either shape a list endpoint may answer with.
///
/// Objects without a `results` field normalize to an empty list.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
	/// Bare JSON array.
	Bare(Vec<T>),
	/// Paginated envelope.
	Paged(Page<T>),
}
impl<T> Listing<T> {
	/// Returns the items regardless of the response shape.
	pub fn into_items(self) -> Vec<T> {
		match self {
			Listing::Bare(items) => items,
			Listing::Paged(page) => page.results,
		}
	}

	/// Returns `true` when more pages are available.
	pub fn has_next(&self) -> bool {
		matches!(self, Listing::Paged(Page { next: Some(_), .. }))
	}
}
impl<T> From<Listing<T>> for Vec<T> {
	fn from(listing: Listing<T>) -> Self {
		listing.into_items()
	}
}
