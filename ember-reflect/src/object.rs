use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::meta_class::MetaClass;
use crate::name::Name;


/// A reflected object: anything the serializer can walk. Implementations
/// expose their meta-class and the `Any` hooks property accessors downcast
/// through, plus the optional export name.
pub trait MetaObject: Any {
	fn meta_class(&self) -> &'static MetaClass;

	fn as_any(&self) -> &dyn Any;
	fn as_any_mut(&mut self) -> &mut dyn Any;

	fn object_name(&self) -> Option<&Name>;
	fn set_object_name(&mut self, name: Name);

	fn is_exported(&self) -> bool {
		self.object_name().is_some()
	}
}

/// Shared handle to a reflected object. The reflection layer is
/// single-threaded; interior mutability covers property writes during
/// deserialization.
pub type ObjectRef = Rc<RefCell<dyn MetaObject>>;

pub fn new_object<T: MetaObject>(object: T) -> ObjectRef {
	Rc::new(RefCell::new(object))
}

/// Identity key for object deduplication tables.
pub fn object_identity(object: &ObjectRef) -> usize {
	Rc::as_ptr(object) as *const () as usize
}
