use fnv::FnvHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::meta_class::MetaClass;
use crate::name::Name;
use crate::object::ObjectRef;


// Classes register during startup and live for the rest of the process,
// like the other global registries of the engine.
static CLASS_DATABASE: Lazy<RwLock<FnvHashMap<&'static str, &'static MetaClass>>> =
	Lazy::new(|| RwLock::new(FnvHashMap::default()));

/// Registers a meta-class and returns its process-lifetime handle.
pub fn register_meta_class(class: MetaClass) -> &'static MetaClass {
	let mut database = CLASS_DATABASE.write();
	assert!(
		!database.contains_key(class.name()),
		"meta class '{}' is already registered",
		class.name()
	);

	let class: &'static MetaClass = Box::leak(Box::new(class));
	database.insert(class.name(), class);
	class
}

pub fn meta_class_ifp(name: &str) -> Option<&'static MetaClass> {
	CLASS_DATABASE.read().get(name).copied()
}

pub fn registered_meta_class_count() -> usize {
	CLASS_DATABASE.read().len()
}


/// Named objects available for import resolution when a serialized file
/// references objects outside its own transaction.
#[derive(Default)]
pub struct AtomDatabase {
	objects: FnvHashMap<Name, ObjectRef>,
}

impl AtomDatabase {
	pub fn new() -> AtomDatabase {
		AtomDatabase::default()
	}

	pub fn len(&self) -> usize {
		self.objects.len()
	}

	pub fn is_empty(&self) -> bool {
		self.objects.is_empty()
	}

	pub fn register(&mut self, name: Name, object: ObjectRef) {
		assert!(!name.is_empty());
		assert!(!self.objects.contains_key(&name), "'{name}' is already registered");
		self.objects.insert(name, object);
	}

	pub fn get_ifp(&self, name: &Name) -> Option<&ObjectRef> {
		self.objects.get(name)
	}
}

impl std::fmt::Debug for AtomDatabase {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AtomDatabase").field("objects", &self.objects.len()).finish()
	}
}
