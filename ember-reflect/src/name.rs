use std::fmt;
use std::sync::Arc;


/// Identifier of an exported reflected object. Compares and hashes by
/// contents; the empty name means "unnamed".
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(Arc<str>);

impl Name {
	pub fn new(s: &str) -> Name {
		Name(Arc::from(s))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl Default for Name {
	fn default() -> Name {
		Name(Arc::from(""))
	}
}

impl From<&str> for Name {
	fn from(s: &str) -> Name {
		Name::new(s)
	}
}

impl From<String> for Name {
	fn from(s: String) -> Name {
		Name(Arc::from(s))
	}
}

impl fmt::Debug for Name {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Name({})", self.0)
	}
}

impl fmt::Display for Name {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
