use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::atom::{Atom, ReflectType, WString};
use crate::name::Name;
use crate::object::ObjectRef;


/// Insertion-ordered key/value container of the native type set. A
/// dedicated type rather than `Vec<(K, V)>` so dictionaries and vectors of
/// pairs stay distinct property types.
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary<K, V>(pub Vec<(K, V)>);

impl<K, V> Dictionary<K, V> {
	pub fn new() -> Dictionary<K, V> {
		Dictionary(Vec::new())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn insert(&mut self, key: K, value: V) {
		self.0.push((key, value));
	}

	pub fn iter(&self) -> impl Iterator<Item = &(K, V)> {
		self.0.iter()
	}
}

impl<K, V> Default for Dictionary<K, V> {
	fn default() -> Dictionary<K, V> {
		Dictionary::new()
	}
}


/// A concrete Rust type that maps onto the atom layer. Property accessors
/// are written against this trait; the serializer never sees the concrete
/// types.
pub trait ReflectedValue: Clone + 'static {
	fn reflect_type() -> ReflectType;
	fn to_atom(&self) -> Atom;
	fn from_atom(atom: Atom) -> Option<Self>;
	fn is_default_value(&self) -> bool;
}

macro_rules! impl_reflected_scalar {
	($ty:ty, $variant:ident) => {
		impl ReflectedValue for $ty {
			fn reflect_type() -> ReflectType {
				ReflectType::$variant
			}

			fn to_atom(&self) -> Atom {
				Atom::$variant(self.clone())
			}

			fn from_atom(atom: Atom) -> Option<$ty> {
				match atom {
					Atom::$variant(value) => Some(value),
					_ => None,
				}
			}

			fn is_default_value(&self) -> bool {
				*self == <$ty>::default()
			}
		}
	};
}

impl_reflected_scalar!(bool, Bool);
impl_reflected_scalar!(i8, I8);
impl_reflected_scalar!(u8, U8);
impl_reflected_scalar!(i16, I16);
impl_reflected_scalar!(u16, U16);
impl_reflected_scalar!(i32, I32);
impl_reflected_scalar!(u32, U32);
impl_reflected_scalar!(i64, I64);
impl_reflected_scalar!(u64, U64);
impl_reflected_scalar!(f32, F32);
impl_reflected_scalar!(f64, F64);
impl_reflected_scalar!(String, Str);
impl_reflected_scalar!(WString, WStr);
impl_reflected_scalar!(Name, Name);
impl_reflected_scalar!(Vec2, Float2);
impl_reflected_scalar!(Vec3, Float3);
impl_reflected_scalar!(Vec4, Float4);

// glam matrices default to identity, which is also the wire default
impl_reflected_scalar!(Mat3, Float3x3);
impl_reflected_scalar!(Mat4, Float4x4);

impl<A: ReflectedValue, B: ReflectedValue> ReflectedValue for (A, B) {
	fn reflect_type() -> ReflectType {
		ReflectType::Pair(Box::new((A::reflect_type(), B::reflect_type())))
	}

	fn to_atom(&self) -> Atom {
		Atom::Pair(Box::new(self.0.to_atom()), Box::new(self.1.to_atom()))
	}

	fn from_atom(atom: Atom) -> Option<(A, B)> {
		match atom {
			Atom::Pair(first, second) => Some((A::from_atom(*first)?, B::from_atom(*second)?)),
			_ => None,
		}
	}

	fn is_default_value(&self) -> bool {
		self.0.is_default_value() && self.1.is_default_value()
	}
}

impl<T: ReflectedValue> ReflectedValue for Vec<T> {
	fn reflect_type() -> ReflectType {
		ReflectType::Vector(Box::new(T::reflect_type()))
	}

	fn to_atom(&self) -> Atom {
		Atom::Vector(T::reflect_type(), self.iter().map(ReflectedValue::to_atom).collect())
	}

	fn from_atom(atom: Atom) -> Option<Vec<T>> {
		match atom {
			Atom::Vector(_, items) => items.into_iter().map(T::from_atom).collect(),
			_ => None,
		}
	}

	fn is_default_value(&self) -> bool {
		self.is_empty()
	}
}

impl<K: ReflectedValue, V: ReflectedValue> ReflectedValue for Dictionary<K, V> {
	fn reflect_type() -> ReflectType {
		ReflectType::Dictionary(Box::new((K::reflect_type(), V::reflect_type())))
	}

	fn to_atom(&self) -> Atom {
		Atom::Dictionary(
			K::reflect_type(),
			V::reflect_type(),
			self.0
				.iter()
				.map(|(key, value)| (key.to_atom(), value.to_atom()))
				.collect(),
		)
	}

	fn from_atom(atom: Atom) -> Option<Dictionary<K, V>> {
		match atom {
			Atom::Dictionary(_, _, items) => {
				let mut result = Dictionary::new();
				for (key, value) in items {
					result.insert(K::from_atom(key)?, V::from_atom(value)?);
				}
				Some(result)
			}
			_ => None,
		}
	}

	fn is_default_value(&self) -> bool {
		self.is_empty()
	}
}

/// Abstract atom slots carry the concrete value wrapped one level deep;
/// `Atom::Null` stands for "no value".
impl ReflectedValue for Atom {
	fn reflect_type() -> ReflectType {
		ReflectType::Atom
	}

	fn to_atom(&self) -> Atom {
		if self.is_null() {
			Atom::Null
		} else {
			Atom::Atom(Box::new(self.clone()))
		}
	}

	fn from_atom(atom: Atom) -> Option<Atom> {
		match atom {
			Atom::Null => Some(Atom::Null),
			Atom::Atom(inner) => Some(*inner),
			_ => None,
		}
	}

	fn is_default_value(&self) -> bool {
		self.is_null()
	}
}

impl ReflectedValue for Option<ObjectRef> {
	fn reflect_type() -> ReflectType {
		ReflectType::Object
	}

	fn to_atom(&self) -> Atom {
		Atom::Object(self.clone())
	}

	fn from_atom(atom: Atom) -> Option<Option<ObjectRef>> {
		match atom {
			Atom::Object(object) => Some(object),
			_ => None,
		}
	}

	fn is_default_value(&self) -> bool {
		self.is_none()
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scalar_round_trips() {
		assert_eq!(u32::from_atom(42u32.to_atom()), Some(42));
		assert_eq!(String::from_atom("hi".to_owned().to_atom()), Some("hi".to_owned()));
		assert_eq!(Vec3::from_atom(Vec3::new(1.0, 2.0, 3.0).to_atom()), Some(Vec3::new(1.0, 2.0, 3.0)));
		assert_eq!(u32::from_atom(Atom::Bool(true)), None);
	}

	#[test]
	fn container_round_trips() {
		let vector = vec![1i32, 2, 3];
		assert_eq!(Vec::<i32>::from_atom(vector.to_atom()), Some(vector));

		let mut dictionary = Dictionary::<String, u8>::new();
		dictionary.insert("a".to_owned(), 1);
		dictionary.insert("b".to_owned(), 2);
		assert_eq!(Dictionary::from_atom(dictionary.to_atom()), Some(dictionary));

		let pair = (true, Name::new("x"));
		assert_eq!(<(bool, Name)>::from_atom(pair.to_atom()), Some(pair));
	}

	#[test]
	fn abstract_atoms_wrap_one_level() {
		let inner = Atom::F32(0.5);
		let wrapped = inner.to_atom();
		assert!(matches!(wrapped, Atom::Atom(_)));
		assert_eq!(Atom::from_atom(wrapped), Some(inner));

		assert!(Atom::Null.is_default_value());
		assert_eq!(Atom::Null.to_atom(), Atom::Null);
	}
}
