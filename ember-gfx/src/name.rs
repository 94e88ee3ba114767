use std::fmt;
use std::sync::Arc;


/// Cheap shared identifier used for vertex semantics, value block fields
/// and resource debug names. Comparison and hashing go through the string
/// contents, so two independently constructed names compare equal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(Arc<str>);

impl Name {
	pub fn new(s: &str) -> Name {
		assert!(!s.is_empty());
		Name(Arc::from(s))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<&str> for Name {
	fn from(s: &str) -> Name {
		Name::new(s)
	}
}

impl From<String> for Name {
	fn from(s: String) -> Name {
		assert!(!s.is_empty());
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
