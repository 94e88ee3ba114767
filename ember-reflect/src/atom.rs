use std::hash::Hasher;
use std::rc::Rc;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::name::Name;
use crate::object::{object_identity, ObjectRef};


/// UTF-16 string as stored by tool-side formats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct WString(pub Vec<u16>);

impl WString {
	pub fn from_str(s: &str) -> WString {
		WString(s.encode_utf16().collect())
	}

	pub fn to_string_lossy(&self) -> String {
		String::from_utf16_lossy(&self.0)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}
}


// Wire ids of the native scalar set. Composite types derive their id from
// their children, so ids stay stable without a central registry.
pub const TYPE_ID_BOOL: u32 = 1;
pub const TYPE_ID_I8: u32 = 2;
pub const TYPE_ID_U8: u32 = 3;
pub const TYPE_ID_I16: u32 = 4;
pub const TYPE_ID_U16: u32 = 5;
pub const TYPE_ID_I32: u32 = 6;
pub const TYPE_ID_U32: u32 = 7;
pub const TYPE_ID_I64: u32 = 8;
pub const TYPE_ID_U64: u32 = 9;
pub const TYPE_ID_F32: u32 = 10;
pub const TYPE_ID_F64: u32 = 11;
pub const TYPE_ID_STR: u32 = 12;
pub const TYPE_ID_WSTR: u32 = 13;
pub const TYPE_ID_NAME: u32 = 14;
pub const TYPE_ID_FLOAT2: u32 = 15;
pub const TYPE_ID_FLOAT3: u32 = 16;
pub const TYPE_ID_FLOAT4: u32 = 17;
pub const TYPE_ID_FLOAT3X3: u32 = 18;
pub const TYPE_ID_FLOAT4X4: u32 = 19;
pub const TYPE_ID_ATOM: u32 = 20;
pub const TYPE_ID_OBJECT: u32 = 21;

fn compose_type_id(kind: u32, children: &[u32]) -> u32 {
	let mut hasher = fnv::FnvHasher::default();
	hasher.write_u32(kind);
	for child in children {
		hasher.write_u32(*child);
	}
	// Keep composite ids clear of the scalar range
	(hasher.finish() as u32) | 0x8000_0000
}


/// Structural description of a property type; what the traits interface of
/// the reflection contract hands the serializer for building default
/// values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectType {
	Bool,
	I8,
	U8,
	I16,
	U16,
	I32,
	U32,
	I64,
	U64,
	F32,
	F64,
	Str,
	WStr,
	Name,
	Float2,
	Float3,
	Float4,
	Float3x3,
	Float4x4,
	Pair(Box<(ReflectType, ReflectType)>),
	Vector(Box<ReflectType>),
	Dictionary(Box<(ReflectType, ReflectType)>),
	Atom,
	Object,
}

impl ReflectType {
	pub fn type_id(&self) -> u32 {
		match self {
			ReflectType::Bool => TYPE_ID_BOOL,
			ReflectType::I8 => TYPE_ID_I8,
			ReflectType::U8 => TYPE_ID_U8,
			ReflectType::I16 => TYPE_ID_I16,
			ReflectType::U16 => TYPE_ID_U16,
			ReflectType::I32 => TYPE_ID_I32,
			ReflectType::U32 => TYPE_ID_U32,
			ReflectType::I64 => TYPE_ID_I64,
			ReflectType::U64 => TYPE_ID_U64,
			ReflectType::F32 => TYPE_ID_F32,
			ReflectType::F64 => TYPE_ID_F64,
			ReflectType::Str => TYPE_ID_STR,
			ReflectType::WStr => TYPE_ID_WSTR,
			ReflectType::Name => TYPE_ID_NAME,
			ReflectType::Float2 => TYPE_ID_FLOAT2,
			ReflectType::Float3 => TYPE_ID_FLOAT3,
			ReflectType::Float4 => TYPE_ID_FLOAT4,
			ReflectType::Float3x3 => TYPE_ID_FLOAT3X3,
			ReflectType::Float4x4 => TYPE_ID_FLOAT4X4,
			ReflectType::Atom => TYPE_ID_ATOM,
			ReflectType::Object => TYPE_ID_OBJECT,
			ReflectType::Pair(children) => {
				compose_type_id(1, &[children.0.type_id(), children.1.type_id()])
			}
			ReflectType::Vector(element) => compose_type_id(2, &[element.type_id()]),
			ReflectType::Dictionary(children) => {
				compose_type_id(3, &[children.0.type_id(), children.1.type_id()])
			}
		}
	}

	/// Scalar type for a wire id; composites and abstract atoms have no
	/// reverse mapping.
	pub fn from_scalar_type_id(type_id: u32) -> Option<ReflectType> {
		Some(match type_id {
			TYPE_ID_BOOL => ReflectType::Bool,
			TYPE_ID_I8 => ReflectType::I8,
			TYPE_ID_U8 => ReflectType::U8,
			TYPE_ID_I16 => ReflectType::I16,
			TYPE_ID_U16 => ReflectType::U16,
			TYPE_ID_I32 => ReflectType::I32,
			TYPE_ID_U32 => ReflectType::U32,
			TYPE_ID_I64 => ReflectType::I64,
			TYPE_ID_U64 => ReflectType::U64,
			TYPE_ID_F32 => ReflectType::F32,
			TYPE_ID_F64 => ReflectType::F64,
			TYPE_ID_STR => ReflectType::Str,
			TYPE_ID_WSTR => ReflectType::WStr,
			TYPE_ID_NAME => ReflectType::Name,
			TYPE_ID_FLOAT2 => ReflectType::Float2,
			TYPE_ID_FLOAT3 => ReflectType::Float3,
			TYPE_ID_FLOAT4 => ReflectType::Float4,
			TYPE_ID_FLOAT3X3 => ReflectType::Float3x3,
			TYPE_ID_FLOAT4X4 => ReflectType::Float4x4,
			_ => return None,
		})
	}

	/// The default-valued atom for this type; what property deserialization
	/// starts from.
	pub fn default_atom(&self) -> Atom {
		match self {
			ReflectType::Bool => Atom::Bool(false),
			ReflectType::I8 => Atom::I8(0),
			ReflectType::U8 => Atom::U8(0),
			ReflectType::I16 => Atom::I16(0),
			ReflectType::U16 => Atom::U16(0),
			ReflectType::I32 => Atom::I32(0),
			ReflectType::U32 => Atom::U32(0),
			ReflectType::I64 => Atom::I64(0),
			ReflectType::U64 => Atom::U64(0),
			ReflectType::F32 => Atom::F32(0.0),
			ReflectType::F64 => Atom::F64(0.0),
			ReflectType::Str => Atom::Str(String::new()),
			ReflectType::WStr => Atom::WStr(WString::default()),
			ReflectType::Name => Atom::Name(Name::default()),
			ReflectType::Float2 => Atom::Float2(Vec2::ZERO),
			ReflectType::Float3 => Atom::Float3(Vec3::ZERO),
			ReflectType::Float4 => Atom::Float4(Vec4::ZERO),
			ReflectType::Float3x3 => Atom::Float3x3(Mat3::IDENTITY),
			ReflectType::Float4x4 => Atom::Float4x4(Mat4::IDENTITY),
			ReflectType::Pair(children) => Atom::Pair(
				Box::new(children.0.default_atom()),
				Box::new(children.1.default_atom()),
			),
			ReflectType::Vector(element) => Atom::Vector((**element).clone(), Vec::new()),
			ReflectType::Dictionary(children) => {
				Atom::Dictionary(children.0.clone(), children.1.clone(), Vec::new())
			}
			ReflectType::Atom => Atom::Null,
			ReflectType::Object => Atom::Object(None),
		}
	}
}


/// Type-erased value carrier of the reflection layer. Every property read
/// produces one; every property write consumes one.
#[derive(Clone)]
pub enum Atom {
	Null,

	Bool(bool),
	I8(i8),
	U8(u8),
	I16(i16),
	U16(u16),
	I32(i32),
	U32(u32),
	I64(i64),
	U64(u64),
	F32(f32),
	F64(f64),

	Str(String),
	WStr(WString),
	Name(Name),

	Float2(Vec2),
	Float3(Vec3),
	Float4(Vec4),
	Float3x3(Mat3),
	Float4x4(Mat4),

	Pair(Box<Atom>, Box<Atom>),
	Vector(ReflectType, Vec<Atom>),
	Dictionary(ReflectType, ReflectType, Vec<(Atom, Atom)>),

	/// Atom-of-atom: a concrete value behind an abstract slot.
	Atom(Box<Atom>),

	Object(Option<ObjectRef>),
}

impl std::fmt::Debug for Atom {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Atom::Null => write!(f, "Null"),
			Atom::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
			Atom::I8(v) => f.debug_tuple("I8").field(v).finish(),
			Atom::U8(v) => f.debug_tuple("U8").field(v).finish(),
			Atom::I16(v) => f.debug_tuple("I16").field(v).finish(),
			Atom::U16(v) => f.debug_tuple("U16").field(v).finish(),
			Atom::I32(v) => f.debug_tuple("I32").field(v).finish(),
			Atom::U32(v) => f.debug_tuple("U32").field(v).finish(),
			Atom::I64(v) => f.debug_tuple("I64").field(v).finish(),
			Atom::U64(v) => f.debug_tuple("U64").field(v).finish(),
			Atom::F32(v) => f.debug_tuple("F32").field(v).finish(),
			Atom::F64(v) => f.debug_tuple("F64").field(v).finish(),
			Atom::Str(v) => f.debug_tuple("Str").field(v).finish(),
			Atom::WStr(v) => f.debug_tuple("WStr").field(v).finish(),
			Atom::Name(v) => f.debug_tuple("Name").field(v).finish(),
			Atom::Float2(v) => f.debug_tuple("Float2").field(v).finish(),
			Atom::Float3(v) => f.debug_tuple("Float3").field(v).finish(),
			Atom::Float4(v) => f.debug_tuple("Float4").field(v).finish(),
			Atom::Float3x3(v) => f.debug_tuple("Float3x3").field(v).finish(),
			Atom::Float4x4(v) => f.debug_tuple("Float4x4").field(v).finish(),
			Atom::Pair(a, b) => f.debug_tuple("Pair").field(a).field(b).finish(),
			Atom::Vector(ty, items) => f.debug_tuple("Vector").field(ty).field(items).finish(),
			Atom::Dictionary(kt, vt, items) => {
				f.debug_tuple("Dictionary").field(kt).field(vt).field(items).finish()
			}
			Atom::Atom(v) => f.debug_tuple("Atom").field(v).finish(),
			Atom::Object(v) => {
				f.debug_tuple("Object").field(&v.as_ref().map(object_identity)).finish()
			}
		}
	}
}

impl Atom {
	pub fn is_null(&self) -> bool {
		matches!(self, Atom::Null)
	}

	/// Wire id of the carried value; `Null` has none.
	pub fn type_id(&self) -> u32 {
		match self {
			Atom::Null => 0,
			Atom::Bool(_) => TYPE_ID_BOOL,
			Atom::I8(_) => TYPE_ID_I8,
			Atom::U8(_) => TYPE_ID_U8,
			Atom::I16(_) => TYPE_ID_I16,
			Atom::U16(_) => TYPE_ID_U16,
			Atom::I32(_) => TYPE_ID_I32,
			Atom::U32(_) => TYPE_ID_U32,
			Atom::I64(_) => TYPE_ID_I64,
			Atom::U64(_) => TYPE_ID_U64,
			Atom::F32(_) => TYPE_ID_F32,
			Atom::F64(_) => TYPE_ID_F64,
			Atom::Str(_) => TYPE_ID_STR,
			Atom::WStr(_) => TYPE_ID_WSTR,
			Atom::Name(_) => TYPE_ID_NAME,
			Atom::Float2(_) => TYPE_ID_FLOAT2,
			Atom::Float3(_) => TYPE_ID_FLOAT3,
			Atom::Float4(_) => TYPE_ID_FLOAT4,
			Atom::Float3x3(_) => TYPE_ID_FLOAT3X3,
			Atom::Float4x4(_) => TYPE_ID_FLOAT4X4,
			Atom::Pair(first, second) => {
				compose_type_id(1, &[first.type_id(), second.type_id()])
			}
			Atom::Vector(element, _) => compose_type_id(2, &[element.type_id()]),
			Atom::Dictionary(key, value, _) => {
				compose_type_id(3, &[key.type_id(), value.type_id()])
			}
			Atom::Atom(_) => TYPE_ID_ATOM,
			Atom::Object(_) => TYPE_ID_OBJECT,
		}
	}

	pub fn is_default_value(&self) -> bool {
		match self {
			Atom::Null => true,
			Atom::Bool(v) => !*v,
			Atom::I8(v) => *v == 0,
			Atom::U8(v) => *v == 0,
			Atom::I16(v) => *v == 0,
			Atom::U16(v) => *v == 0,
			Atom::I32(v) => *v == 0,
			Atom::U32(v) => *v == 0,
			Atom::I64(v) => *v == 0,
			Atom::U64(v) => *v == 0,
			Atom::F32(v) => *v == 0.0,
			Atom::F64(v) => *v == 0.0,
			Atom::Str(v) => v.is_empty(),
			Atom::WStr(v) => v.is_empty(),
			Atom::Name(v) => v.is_empty(),
			Atom::Float2(v) => *v == Vec2::ZERO,
			Atom::Float3(v) => *v == Vec3::ZERO,
			Atom::Float4(v) => *v == Vec4::ZERO,
			Atom::Float3x3(v) => *v == Mat3::IDENTITY,
			Atom::Float4x4(v) => *v == Mat4::IDENTITY,
			Atom::Pair(first, second) => first.is_default_value() && second.is_default_value(),
			Atom::Vector(_, items) => items.is_empty(),
			Atom::Dictionary(_, _, items) => items.is_empty(),
			Atom::Atom(inner) => inner.is_null(),
			Atom::Object(object) => object.is_none(),
		}
	}
}

/// Shallow equality: object references compare by identity. Use
/// [`deep_equals`] for structural object graphs.
impl PartialEq for Atom {
	fn eq(&self, other: &Atom) -> bool {
		match (self, other) {
			(Atom::Null, Atom::Null) => true,
			(Atom::Bool(a), Atom::Bool(b)) => a == b,
			(Atom::I8(a), Atom::I8(b)) => a == b,
			(Atom::U8(a), Atom::U8(b)) => a == b,
			(Atom::I16(a), Atom::I16(b)) => a == b,
			(Atom::U16(a), Atom::U16(b)) => a == b,
			(Atom::I32(a), Atom::I32(b)) => a == b,
			(Atom::U32(a), Atom::U32(b)) => a == b,
			(Atom::I64(a), Atom::I64(b)) => a == b,
			(Atom::U64(a), Atom::U64(b)) => a == b,
			(Atom::F32(a), Atom::F32(b)) => a == b,
			(Atom::F64(a), Atom::F64(b)) => a == b,
			(Atom::Str(a), Atom::Str(b)) => a == b,
			(Atom::WStr(a), Atom::WStr(b)) => a == b,
			(Atom::Name(a), Atom::Name(b)) => a == b,
			(Atom::Float2(a), Atom::Float2(b)) => a == b,
			(Atom::Float3(a), Atom::Float3(b)) => a == b,
			(Atom::Float4(a), Atom::Float4(b)) => a == b,
			(Atom::Float3x3(a), Atom::Float3x3(b)) => a == b,
			(Atom::Float4x4(a), Atom::Float4x4(b)) => a == b,
			(Atom::Pair(a0, a1), Atom::Pair(b0, b1)) => a0 == b0 && a1 == b1,
			(Atom::Vector(at, a), Atom::Vector(bt, b)) => at == bt && a == b,
			(Atom::Dictionary(ak, av, a), Atom::Dictionary(bk, bv, b)) => {
				ak == bk && av == bv && a == b
			}
			(Atom::Atom(a), Atom::Atom(b)) => a == b,
			(Atom::Object(a), Atom::Object(b)) => match (a, b) {
				(None, None) => true,
				(Some(a), Some(b)) => Rc::ptr_eq(a, b),
				_ => false,
			},
			_ => false,
		}
	}
}

/// Structural deep equality, following object references through their
/// reflected properties. Object graphs must be acyclic.
pub fn deep_equals(lhs: &Atom, rhs: &Atom) -> bool {
	match (lhs, rhs) {
		(Atom::Object(a), Atom::Object(b)) => match (a, b) {
			(None, None) => true,
			(Some(a), Some(b)) => Rc::ptr_eq(a, b) || objects_deep_equal(a, b),
			_ => false,
		},
		(Atom::Pair(a0, a1), Atom::Pair(b0, b1)) => deep_equals(a0, b0) && deep_equals(a1, b1),
		(Atom::Vector(at, a), Atom::Vector(bt, b)) => {
			at == bt && a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equals(x, y))
		}
		(Atom::Dictionary(ak, av, a), Atom::Dictionary(bk, bv, b)) => {
			ak == bk
				&& av == bv && a.len() == b.len()
				&& a.iter()
					.zip(b)
					.all(|((xk, xv), (yk, yv))| deep_equals(xk, yk) && deep_equals(xv, yv))
		}
		(Atom::Atom(a), Atom::Atom(b)) => deep_equals(a, b),
		_ => lhs == rhs,
	}
}

/// Deep equality of two reflected objects over their full class chains.
pub fn objects_deep_equal(lhs: &ObjectRef, rhs: &ObjectRef) -> bool {
	let lhs_ref = lhs.borrow();
	let rhs_ref = rhs.borrow();

	if !std::ptr::eq(lhs_ref.meta_class(), rhs_ref.meta_class()) {
		return false;
	}
	if lhs_ref.object_name() != rhs_ref.object_name() {
		return false;
	}

	for class in lhs_ref.meta_class().chain() {
		for property in class.properties() {
			if !deep_equals(&property.wrap_copy(&*lhs_ref), &property.wrap_copy(&*rhs_ref)) {
				return false;
			}
		}
	}

	true
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_atoms_report_default() {
		let types = [
			ReflectType::Bool,
			ReflectType::U32,
			ReflectType::F64,
			ReflectType::Str,
			ReflectType::Float4x4,
			ReflectType::Vector(Box::new(ReflectType::I32)),
			ReflectType::Dictionary(Box::new((ReflectType::Str, ReflectType::U8))),
			ReflectType::Pair(Box::new((ReflectType::Bool, ReflectType::Name))),
			ReflectType::Atom,
			ReflectType::Object,
		];

		for ty in types {
			let atom = ty.default_atom();
			assert!(atom.is_default_value(), "{ty:?}");
		}
	}

	#[test]
	fn composite_type_ids_are_stable_and_distinct() {
		let vec_i32 = ReflectType::Vector(Box::new(ReflectType::I32));
		let vec_u32 = ReflectType::Vector(Box::new(ReflectType::U32));
		assert_eq!(vec_i32.type_id(), vec_i32.type_id());
		assert_ne!(vec_i32.type_id(), vec_u32.type_id());

		let pair = ReflectType::Pair(Box::new((ReflectType::I32, ReflectType::U32)));
		assert_ne!(pair.type_id(), vec_i32.type_id());

		// Atoms derive the same ids as their types
		let atom = Atom::Vector(ReflectType::I32, vec![Atom::I32(7)]);
		assert_eq!(atom.type_id(), vec_i32.type_id());
	}

	#[test]
	fn scalar_ids_round_trip() {
		for ty in [ReflectType::Bool, ReflectType::F32, ReflectType::Name, ReflectType::WStr] {
			assert_eq!(ReflectType::from_scalar_type_id(ty.type_id()), Some(ty));
		}
		assert_eq!(ReflectType::from_scalar_type_id(0xFFFF_FFFF), None);
	}
}
