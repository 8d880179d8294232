//! Validated resource paths and the backend's known router collections.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

const RESOURCE_PATH_MAX_LEN: usize = 2048;

/// Error returned when resource path validation fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ResourcePathError {
	/// The path was empty once the leading slash was removed.
	#[error("Resource path cannot be empty.")]
	Empty,
	/// The path contains whitespace characters.
	#[error("Resource path contains whitespace.")]
	ContainsWhitespace,
	/// The path is an absolute URL instead of a path relative to the API prefix.
	#[error("Resource path must be relative to the API prefix, not an absolute URL.")]
	AbsoluteUrl,
	/// The path tries to climb out of the API prefix.
	#[error("Resource path cannot contain `..` segments.")]
	ParentSegment,
	/// The path exceeded the allowed length.
	#[error("Resource path exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted length.
		max: usize,
	},
}

/// Path of a resource relative to the API prefix, e.g. `productos/` or `marcas/3/`.
///
/// A single leading slash is stripped; trailing slashes and query strings are kept verbatim
/// because the backend's router distinguishes `productos` from `productos/`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourcePath(String);
impl ResourcePath {
	/// Creates a new path after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, ResourcePathError> {
		let view = value.as_ref();
		let view = view.strip_prefix('/').unwrap_or(view);

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}

	/// Returns the path as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Path of one item inside this collection: `<collection>/<id>/`.
	pub fn item(&self, id: impl Display) -> Result<Self, ResourcePathError> {
		let base = self.0.split('?').next().unwrap_or_default().trim_end_matches('/');

		Self::new(format!("{base}/{id}/"))
	}
}
impl Deref for ResourcePath {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ResourcePath {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for ResourcePath {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ResourcePath({})", self.0)
	}
}
impl Display for ResourcePath {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl TryFrom<&str> for ResourcePath {
	type Error = ResourcePathError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl From<Resource> for ResourcePath {
	fn from(resource: Resource) -> Self {
		Self(resource.path().to_owned())
	}
}

/// Collections registered on the backend's router.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
	/// Inventory items (`productos/`).
	Products,
	/// Product categories (`categorias/`).
	Categories,
	/// Brands (`marcas/`).
	Brands,
	/// Brand models (`modelos/`).
	Models,
	/// Suppliers (`proveedores/`).
	Suppliers,
	/// Branches (`sucursales/`).
	Branches,
	/// Item states (`estados/`).
	States,
	/// Stock movements (`movimientos/`).
	StockMovements,
	/// User notifications (`notificaciones/`).
	Notifications,
	/// Users (`usuarios/`).
	Users,
	/// Item assignments (`asignaciones/`).
	Assignments,
	/// Maintenance records (`mantenciones/`).
	Maintenance,
	/// State change history (`historial-estados/`).
	StateHistory,
	/// Attached documents (`documentaciones/`).
	Documents,
	/// Access logs (`logs-acceso/`).
	AccessLogs,
}
impl Resource {
	/// Every known collection.
	pub const ALL: [Resource; 15] = [
		Resource::Products,
		Resource::Categories,
		Resource::Brands,
		Resource::Models,
		Resource::Suppliers,
		Resource::Branches,
		Resource::States,
		Resource::StockMovements,
		Resource::Notifications,
		Resource::Users,
		Resource::Assignments,
		Resource::Maintenance,
		Resource::StateHistory,
		Resource::Documents,
		Resource::AccessLogs,
	];

	/// Collection path relative to the API prefix.
	pub const fn path(self) -> &'static str {
		match self {
			Resource::Products => "productos/",
			Resource::Categories => "categorias/",
			Resource::Brands => "marcas/",
			Resource::Models => "modelos/",
			Resource::Suppliers => "proveedores/",
			Resource::Branches => "sucursales/",
			Resource::States => "estados/",
			Resource::StockMovements => "movimientos/",
			Resource::Notifications => "notificaciones/",
			Resource::Users => "usuarios/",
			Resource::Assignments => "asignaciones/",
			Resource::Maintenance => "mantenciones/",
			Resource::StateHistory => "historial-estados/",
			Resource::Documents => "documentaciones/",
			Resource::AccessLogs => "logs-acceso/",
		}
	}
}
impl Display for Resource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.path())
	}
}

fn validate_view(view: &str) -> Result<(), ResourcePathError> {
	if view.is_empty() {
		return Err(ResourcePathError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(ResourcePathError::ContainsWhitespace);
	}
	if view.contains("://") || view.starts_with('/') {
		return Err(ResourcePathError::AbsoluteUrl);
	}

	let path_part = view.split('?').next().unwrap_or_default();

	if path_part.split('/').any(|segment| segment == "..") {
		return Err(ResourcePathError::ParentSegment);
	}
	if view.len() > RESOURCE_PATH_MAX_LEN {
		return Err(ResourcePathError::TooLong { max: RESOURCE_PATH_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn leading_slash_is_stripped() {
		let path = ResourcePath::new("/productos/").expect("Path fixture should be valid.");

		assert_eq!(path.as_str(), "productos/");
		assert_eq!(
			ResourcePath::new("productos/").expect("Path fixture should be valid."),
			path
		);
	}

	#[test]
	fn invalid_paths_are_rejected() {
		assert_eq!(ResourcePath::new(""), Err(ResourcePathError::Empty));
		assert_eq!(ResourcePath::new("/"), Err(ResourcePathError::Empty));
		assert_eq!(ResourcePath::new("marcas /"), Err(ResourcePathError::ContainsWhitespace));
		assert_eq!(
			ResourcePath::new("http://evil.test/productos/"),
			Err(ResourcePathError::AbsoluteUrl)
		);
		assert_eq!(ResourcePath::new("//evil.test/"), Err(ResourcePathError::AbsoluteUrl));
		assert_eq!(ResourcePath::new("../admin/"), Err(ResourcePathError::ParentSegment));
		assert!(matches!(
			ResourcePath::new("a".repeat(RESOURCE_PATH_MAX_LEN + 1)),
			Err(ResourcePathError::TooLong { .. })
		));
	}

	#[test]
	fn item_paths_append_the_id() {
		let products = ResourcePath::from(Resource::Products);

		assert_eq!(products.item(12).expect("Item path should be valid.").as_str(), "productos/12/");

		let filtered =
			ResourcePath::new("productos/?search=x").expect("Filtered path should be valid.");

		assert_eq!(filtered.item("7").expect("Item path should be valid.").as_str(), "productos/7/");
	}

	#[test]
	fn every_known_resource_is_a_valid_path() {
		for resource in Resource::ALL {
			ResourcePath::new(resource.path()).expect("Known resource paths should validate.");
		}
	}
}
