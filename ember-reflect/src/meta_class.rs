use crate::atom::{Atom, ReflectType};
use crate::object::{MetaObject, ObjectRef};
use crate::reflected::ReflectedValue;


type WrapCopyFn = Box<dyn Fn(&dyn MetaObject) -> Atom + Send + Sync>;
type UnwrapMoveFn = Box<dyn Fn(&mut dyn MetaObject, Atom) + Send + Sync>;
type IsDefaultFn = Box<dyn Fn(&dyn MetaObject) -> bool + Send + Sync>;

/// One reflected property: a name, a type descriptor and the accessors
/// bridging objects and atoms.
pub struct MetaProperty {
	name: &'static str,
	ty: ReflectType,
	wrap_copy: WrapCopyFn,
	unwrap_move: UnwrapMoveFn,
	is_default: IsDefaultFn,
}

impl MetaProperty {
	/// Builds a property from plain field accessors.
	pub fn new<C, T>(name: &'static str, get: fn(&C) -> &T, set: fn(&mut C, T)) -> MetaProperty
	where
		C: MetaObject,
		T: ReflectedValue,
	{
		MetaProperty {
			name,
			ty: T::reflect_type(),
			wrap_copy: Box::new(move |object| {
				let object = object.as_any().downcast_ref::<C>().expect("object class mismatch");
				get(object).to_atom()
			}),
			unwrap_move: Box::new(move |object, atom| {
				let value = T::from_atom(atom).expect("atom type mismatch");
				let object = object
					.as_any_mut()
					.downcast_mut::<C>()
					.expect("object class mismatch");
				set(object, value);
			}),
			is_default: Box::new(move |object| {
				let object = object.as_any().downcast_ref::<C>().expect("object class mismatch");
				get(object).is_default_value()
			}),
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn reflect_type(&self) -> &ReflectType {
		&self.ty
	}

	pub fn type_id(&self) -> u32 {
		self.ty.type_id()
	}

	pub fn wrap_copy(&self, object: &dyn MetaObject) -> Atom {
		(self.wrap_copy)(object)
	}

	pub fn unwrap_move(&self, object: &mut dyn MetaObject, atom: Atom) {
		(self.unwrap_move)(object, atom)
	}

	pub fn is_default_value(&self, object: &dyn MetaObject) -> bool {
		(self.is_default)(object)
	}
}

impl std::fmt::Debug for MetaProperty {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MetaProperty")
			.field("name", &self.name)
			.field("type", &self.ty)
			.finish()
	}
}


/// A reflected class: its own property list, the parent link and the
/// instance factory used when deserializing.
pub struct MetaClass {
	name: &'static str,
	parent: Option<&'static MetaClass>,
	properties: Vec<MetaProperty>,
	factory: fn() -> ObjectRef,
}

impl MetaClass {
	pub fn new(
		name: &'static str,
		parent: Option<&'static MetaClass>,
		properties: Vec<MetaProperty>,
		factory: fn() -> ObjectRef,
	) -> MetaClass {
		MetaClass { name, parent, properties, factory }
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn parent(&self) -> Option<&'static MetaClass> {
		self.parent
	}

	/// Own properties only; walk [`chain`](Self::chain) for the full set.
	pub fn properties(&self) -> &[MetaProperty] {
		&self.properties
	}

	pub fn property_ifp(&self, name: &str) -> Option<&MetaProperty> {
		self.properties.iter().find(|p| p.name == name)
	}

	pub fn create_instance(&self) -> ObjectRef {
		(self.factory)()
	}

	/// Most-derived to root.
	pub fn chain(&'static self) -> MetaClassChain {
		MetaClassChain { current: Some(self) }
	}
}

impl std::fmt::Debug for MetaClass {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MetaClass")
			.field("name", &self.name)
			.field("parent", &self.parent.map(MetaClass::name))
			.field("properties", &self.properties.len())
			.finish()
	}
}

pub struct MetaClassChain {
	current: Option<&'static MetaClass>,
}

impl Iterator for MetaClassChain {
	type Item = &'static MetaClass;

	fn next(&mut self) -> Option<&'static MetaClass> {
		let current = self.current?;
		self.current = current.parent;
		Some(current)
	}
}
