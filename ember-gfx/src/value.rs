use std::hash::Hasher;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use half::f16;

pub mod block;
pub mod packed;

pub use block::*;
pub use packed::*;


/// Row-major 4x3 float matrix, stored as 12 contiguous floats.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Float4x3(pub [f32; 12]);


/// Every CPU-side value a vertex stream, constant block or material
/// parameter can carry. Discriminants are stable and double as the wire
/// type id.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
	Void = 0,

	Float = 1,
	Float2 = 2,
	Float3 = 3,
	Float4 = 4,
	Float3x3 = 5,
	Float4x3 = 6,
	Float4x4 = 7,
	Bool = 8,
	Byte = 9,
	Byte2 = 10,
	Byte4 = 11,
	UByte = 12,
	UByte2 = 13,
	UByte4 = 14,
	Short = 15,
	Short2 = 16,
	Short4 = 17,
	UShort = 18,
	UShort2 = 19,
	UShort4 = 20,
	Word = 21,
	Word2 = 22,
	Word3 = 23,
	Word4 = 24,
	UWord = 25,
	UWord2 = 26,
	UWord3 = 27,
	UWord4 = 28,
	Half = 29,
	Half2 = 30,
	Half4 = 31,
	Byte2N = 32,
	Byte4N = 33,
	UByte2N = 34,
	UByte4N = 35,
	Short2N = 36,
	Short4N = 37,
	UShort2N = 38,
	UShort4N = 39,
	UX10Y10Z10W2N = 40,
}

pub const VALUE_TYPE_COUNT: usize = 40;

impl ValueType {
	pub const ALL: [ValueType; VALUE_TYPE_COUNT] = [
		ValueType::Float, ValueType::Float2, ValueType::Float3, ValueType::Float4,
		ValueType::Float3x3, ValueType::Float4x3, ValueType::Float4x4,
		ValueType::Bool,
		ValueType::Byte, ValueType::Byte2, ValueType::Byte4,
		ValueType::UByte, ValueType::UByte2, ValueType::UByte4,
		ValueType::Short, ValueType::Short2, ValueType::Short4,
		ValueType::UShort, ValueType::UShort2, ValueType::UShort4,
		ValueType::Word, ValueType::Word2, ValueType::Word3, ValueType::Word4,
		ValueType::UWord, ValueType::UWord2, ValueType::UWord3, ValueType::UWord4,
		ValueType::Half, ValueType::Half2, ValueType::Half4,
		ValueType::Byte2N, ValueType::Byte4N, ValueType::UByte2N, ValueType::UByte4N,
		ValueType::Short2N, ValueType::Short4N, ValueType::UShort2N, ValueType::UShort4N,
		ValueType::UX10Y10Z10W2N,
	];

	pub fn size_in_bytes(self) -> usize {
		use ValueType as T;

		match self {
			T::Void => 0,
			T::Float => 4,
			T::Float2 => 8,
			T::Float3 => 12,
			T::Float4 => 16,
			T::Float3x3 => 36,
			T::Float4x3 => 48,
			T::Float4x4 => 64,
			T::Bool => 1,
			T::Byte | T::UByte => 1,
			T::Byte2 | T::UByte2 => 2,
			T::Byte4 | T::UByte4 => 4,
			T::Short | T::UShort => 2,
			T::Short2 | T::UShort2 => 4,
			T::Short4 | T::UShort4 => 8,
			T::Word | T::UWord => 4,
			T::Word2 | T::UWord2 => 8,
			T::Word3 | T::UWord3 => 12,
			T::Word4 | T::UWord4 => 16,
			T::Half => 2,
			T::Half2 => 4,
			T::Half4 => 8,
			T::Byte2N | T::UByte2N => 2,
			T::Byte4N | T::UByte4N => 4,
			T::Short2N | T::UShort2N => 4,
			T::Short4N | T::UShort4N => 8,
			T::UX10Y10Z10W2N => 4,
		}
	}

	pub fn name(self) -> &'static str {
		use ValueType as T;

		match self {
			T::Void => "Void",
			T::Float => "Float",
			T::Float2 => "Float2",
			T::Float3 => "Float3",
			T::Float4 => "Float4",
			T::Float3x3 => "Float3x3",
			T::Float4x3 => "Float4x3",
			T::Float4x4 => "Float4x4",
			T::Bool => "Bool",
			T::Byte => "Byte",
			T::Byte2 => "Byte2",
			T::Byte4 => "Byte4",
			T::UByte => "UByte",
			T::UByte2 => "UByte2",
			T::UByte4 => "UByte4",
			T::Short => "Short",
			T::Short2 => "Short2",
			T::Short4 => "Short4",
			T::UShort => "UShort",
			T::UShort2 => "UShort2",
			T::UShort4 => "UShort4",
			T::Word => "Word",
			T::Word2 => "Word2",
			T::Word3 => "Word3",
			T::Word4 => "Word4",
			T::UWord => "UWord",
			T::UWord2 => "UWord2",
			T::UWord3 => "UWord3",
			T::UWord4 => "UWord4",
			T::Half => "Half",
			T::Half2 => "Half2",
			T::Half4 => "Half4",
			T::Byte2N => "Byte2N",
			T::Byte4N => "Byte4N",
			T::UByte2N => "UByte2N",
			T::UByte4N => "UByte4N",
			T::Short2N => "Short2N",
			T::Short4N => "Short4N",
			T::UShort2N => "UShort2N",
			T::UShort4N => "UShort4N",
			T::UX10Y10Z10W2N => "UX10Y10Z10W2N",
		}
	}

	fn lane_count(self) -> usize {
		use ValueType as T;

		match self {
			T::Void => 0,
			T::Float | T::Bool | T::Byte | T::UByte | T::Short | T::UShort
			| T::Word | T::UWord | T::Half => 1,
			T::Float2 | T::Byte2 | T::UByte2 | T::Short2 | T::UShort2 | T::Word2
			| T::UWord2 | T::Half2 | T::Byte2N | T::UByte2N | T::Short2N | T::UShort2N => 2,
			T::Float3 | T::Word3 | T::UWord3 => 3,
			T::Float4 | T::Byte4 | T::UByte4 | T::Short4 | T::UShort4 | T::Word4
			| T::UWord4 | T::Half4 | T::Byte4N | T::UByte4N | T::Short4N | T::UShort4N
			| T::UX10Y10Z10W2N => 4,
			T::Float3x3 => 9,
			T::Float4x3 => 12,
			T::Float4x4 => 16,
		}
	}
}


fn read_pod<T: Pod>(src: &[u8]) -> T {
	bytemuck::pod_read_unaligned(&src[..std::mem::size_of::<T>()])
}

fn write_pod<T: Pod>(dst: &mut [u8], value: T) {
	dst[..std::mem::size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&value));
}

const MAX_LANES: usize = 16;

fn round_to<const MIN: i64, const MAX: i64>(lane: f32) -> i64 {
	(lane.round() as i64).clamp(MIN, MAX)
}

/// Spreads a raw value into f32 lanes. Normalized packed formats expand to
/// their real-valued range; plain integers convert by value.
fn to_lanes(ty: ValueType, src: &[u8], lanes: &mut [f32; MAX_LANES]) -> usize {
	use ValueType as T;

	let spread = |lanes: &mut [f32; MAX_LANES], values: &[f32]| {
		lanes[..values.len()].copy_from_slice(values);
		values.len()
	};

	match ty {
		T::Void => 0,
		T::Float => spread(lanes, &[read_pod::<f32>(src)]),
		T::Float2 => spread(lanes, &read_pod::<Vec2>(src).to_array()),
		T::Float3 => spread(lanes, &read_pod::<Vec3>(src).to_array()),
		T::Float4 => spread(lanes, &read_pod::<Vec4>(src).to_array()),
		T::Float3x3 => spread(lanes, &read_pod::<Mat3>(src).to_cols_array()),
		T::Float4x3 => spread(lanes, &read_pod::<Float4x3>(src).0),
		T::Float4x4 => spread(lanes, &read_pod::<Mat4>(src).to_cols_array()),
		T::Bool => spread(lanes, &[if src[0] != 0 { 1.0 } else { 0.0 }]),
		T::Byte => spread(lanes, &[read_pod::<i8>(src) as f32]),
		T::Byte2 => spread(lanes, &read_pod::<[i8; 2]>(src).map(|v| v as f32)),
		T::Byte4 => spread(lanes, &read_pod::<[i8; 4]>(src).map(|v| v as f32)),
		T::UByte => spread(lanes, &[read_pod::<u8>(src) as f32]),
		T::UByte2 => spread(lanes, &read_pod::<[u8; 2]>(src).map(|v| v as f32)),
		T::UByte4 => spread(lanes, &read_pod::<[u8; 4]>(src).map(|v| v as f32)),
		T::Short => spread(lanes, &[read_pod::<i16>(src) as f32]),
		T::Short2 => spread(lanes, &read_pod::<[i16; 2]>(src).map(|v| v as f32)),
		T::Short4 => spread(lanes, &read_pod::<[i16; 4]>(src).map(|v| v as f32)),
		T::UShort => spread(lanes, &[read_pod::<u16>(src) as f32]),
		T::UShort2 => spread(lanes, &read_pod::<[u16; 2]>(src).map(|v| v as f32)),
		T::UShort4 => spread(lanes, &read_pod::<[u16; 4]>(src).map(|v| v as f32)),
		T::Word => spread(lanes, &[read_pod::<i32>(src) as f32]),
		T::Word2 => spread(lanes, &read_pod::<[i32; 2]>(src).map(|v| v as f32)),
		T::Word3 => spread(lanes, &read_pod::<[i32; 3]>(src).map(|v| v as f32)),
		T::Word4 => spread(lanes, &read_pod::<[i32; 4]>(src).map(|v| v as f32)),
		T::UWord => spread(lanes, &[read_pod::<u32>(src) as f32]),
		T::UWord2 => spread(lanes, &read_pod::<[u32; 2]>(src).map(|v| v as f32)),
		T::UWord3 => spread(lanes, &read_pod::<[u32; 3]>(src).map(|v| v as f32)),
		T::UWord4 => spread(lanes, &read_pod::<[u32; 4]>(src).map(|v| v as f32)),
		T::Half => spread(lanes, &[read_pod::<f16>(src).to_f32()]),
		T::Half2 => spread(lanes, &read_pod::<packed::Half2>(src).unpack().to_array()),
		T::Half4 => spread(lanes, &read_pod::<packed::Half4>(src).unpack().to_array()),
		T::Byte2N => spread(lanes, &read_pod::<packed::Byte2N>(src).unpack().to_array()),
		T::Byte4N => spread(lanes, &read_pod::<packed::Byte4N>(src).unpack().to_array()),
		T::UByte2N => spread(lanes, &read_pod::<packed::UByte2N>(src).unpack().to_array()),
		T::UByte4N => spread(lanes, &read_pod::<packed::UByte4N>(src).unpack().to_array()),
		T::Short2N => spread(lanes, &read_pod::<packed::Short2N>(src).unpack().to_array()),
		T::Short4N => spread(lanes, &read_pod::<packed::Short4N>(src).unpack().to_array()),
		T::UShort2N => spread(lanes, &read_pod::<packed::UShort2N>(src).unpack().to_array()),
		T::UShort4N => spread(lanes, &read_pod::<packed::UShort4N>(src).unpack().to_array()),
		T::UX10Y10Z10W2N => spread(lanes, &read_pod::<packed::UX10Y10Z10W2N>(src).unpack().to_array()),
	}
}

/// Inverse of [`to_lanes`]. Integer targets round and saturate, normalized
/// targets quantize, float targets take the lane verbatim.
fn from_lanes(ty: ValueType, dst: &mut [u8], lanes: &[f32; MAX_LANES]) {
	use ValueType as T;

	let v2 = Vec2::new(lanes[0], lanes[1]);
	let v4 = Vec4::new(lanes[0], lanes[1], lanes[2], lanes[3]);

	match ty {
		T::Void => {}
		T::Float => write_pod(dst, lanes[0]),
		T::Float2 => write_pod(dst, v2),
		T::Float3 => write_pod(dst, Vec3::new(lanes[0], lanes[1], lanes[2])),
		T::Float4 => write_pod(dst, v4),
		T::Float3x3 => {
			let mut cols = [0.0f32; 9];
			cols.copy_from_slice(&lanes[..9]);
			write_pod(dst, Mat3::from_cols_array(&cols));
		}
		T::Float4x3 => {
			let mut cells = [0.0f32; 12];
			cells.copy_from_slice(&lanes[..12]);
			write_pod(dst, Float4x3(cells));
		}
		T::Float4x4 => write_pod(dst, Mat4::from_cols_array(lanes)),
		T::Bool => dst[0] = if lanes[0] >= 0.5 { 1 } else { 0 },
		T::Byte => write_pod(dst, round_to::<-128, 127>(lanes[0]) as i8),
		T::Byte2 => write_pod(dst, [0, 1].map(|i| round_to::<-128, 127>(lanes[i]) as i8)),
		T::Byte4 => write_pod(dst, [0, 1, 2, 3].map(|i| round_to::<-128, 127>(lanes[i]) as i8)),
		T::UByte => write_pod(dst, round_to::<0, 255>(lanes[0]) as u8),
		T::UByte2 => write_pod(dst, [0, 1].map(|i| round_to::<0, 255>(lanes[i]) as u8)),
		T::UByte4 => write_pod(dst, [0, 1, 2, 3].map(|i| round_to::<0, 255>(lanes[i]) as u8)),
		T::Short => write_pod(dst, round_to::<-32768, 32767>(lanes[0]) as i16),
		T::Short2 => write_pod(dst, [0, 1].map(|i| round_to::<-32768, 32767>(lanes[i]) as i16)),
		T::Short4 => write_pod(dst, [0, 1, 2, 3].map(|i| round_to::<-32768, 32767>(lanes[i]) as i16)),
		T::UShort => write_pod(dst, round_to::<0, 65535>(lanes[0]) as u16),
		T::UShort2 => write_pod(dst, [0, 1].map(|i| round_to::<0, 65535>(lanes[i]) as u16)),
		T::UShort4 => write_pod(dst, [0, 1, 2, 3].map(|i| round_to::<0, 65535>(lanes[i]) as u16)),
		T::Word => write_pod(dst, round_to::<{ i32::MIN as i64 }, { i32::MAX as i64 }>(lanes[0]) as i32),
		T::Word2 => write_pod(dst, [0, 1].map(|i| round_to::<{ i32::MIN as i64 }, { i32::MAX as i64 }>(lanes[i]) as i32)),
		T::Word3 => write_pod(dst, [0, 1, 2].map(|i| round_to::<{ i32::MIN as i64 }, { i32::MAX as i64 }>(lanes[i]) as i32)),
		T::Word4 => write_pod(dst, [0, 1, 2, 3].map(|i| round_to::<{ i32::MIN as i64 }, { i32::MAX as i64 }>(lanes[i]) as i32)),
		T::UWord => write_pod(dst, round_to::<0, { u32::MAX as i64 }>(lanes[0]) as u32),
		T::UWord2 => write_pod(dst, [0, 1].map(|i| round_to::<0, { u32::MAX as i64 }>(lanes[i]) as u32)),
		T::UWord3 => write_pod(dst, [0, 1, 2].map(|i| round_to::<0, { u32::MAX as i64 }>(lanes[i]) as u32)),
		T::UWord4 => write_pod(dst, [0, 1, 2, 3].map(|i| round_to::<0, { u32::MAX as i64 }>(lanes[i]) as u32)),
		T::Half => write_pod(dst, f16::from_f32(lanes[0])),
		T::Half2 => write_pod(dst, packed::Half2::pack(v2)),
		T::Half4 => write_pod(dst, packed::Half4::pack(v4)),
		T::Byte2N => write_pod(dst, packed::Byte2N::pack(v2)),
		T::Byte4N => write_pod(dst, packed::Byte4N::pack(v4)),
		T::UByte2N => write_pod(dst, packed::UByte2N::pack(v2)),
		T::UByte4N => write_pod(dst, packed::UByte4N::pack(v4)),
		T::Short2N => write_pod(dst, packed::Short2N::pack(v2)),
		T::Short4N => write_pod(dst, packed::Short4N::pack(v4)),
		T::UShort2N => write_pod(dst, packed::UShort2N::pack(v2)),
		T::UShort4N => write_pod(dst, packed::UShort4N::pack(v4)),
		T::UX10Y10Z10W2N => write_pod(dst, packed::UX10Y10Z10W2N::pack(v4)),
	}
}

/// Raw operations over untyped byte views
impl ValueType {
	pub fn copy(self, dst: &mut [u8], src: &[u8]) {
		let size = self.size_in_bytes();
		dst[..size].copy_from_slice(&src[..size]);
	}

	pub fn write_default(self, dst: &mut [u8]) {
		dst[..self.size_in_bytes()].fill(0);
	}

	/// Exact representation equality; two values compare equal iff their
	/// stored bytes do.
	pub fn equals(self, lhs: &[u8], rhs: &[u8]) -> bool {
		let size = self.size_in_bytes();
		lhs[..size] == rhs[..size]
	}

	pub fn hash(self, data: &[u8]) -> u64 {
		let mut hasher = fnv::FnvHasher::default();
		hasher.write(&data[..self.size_in_bytes()]);
		hasher.finish()
	}

	pub fn swap(self, lhs: &mut [u8], rhs: &mut [u8]) {
		let size = self.size_in_bytes();
		lhs[..size].swap_with_slice(&mut rhs[..size]);
	}

	pub fn lerp(self, dst: &mut [u8], a: &[u8], b: &[u8], t: f32) {
		let mut la = [0.0; MAX_LANES];
		let mut lb = [0.0; MAX_LANES];
		let n = to_lanes(self, a, &mut la);
		to_lanes(self, b, &mut lb);

		let mut out = [0.0; MAX_LANES];
		for i in 0..n {
			out[i] = la[i] + (lb[i] - la[i]) * t;
		}

		from_lanes(self, dst, &out);
	}

	pub fn lerp_array(self, dst: &mut [u8], dst_stride: usize, a: &[u8], b: &[u8], ts: &[f32]) {
		assert!(dst_stride >= self.size_in_bytes());
		assert!(dst.len() >= dst_stride * ts.len());

		for (i, &t) in ts.iter().enumerate() {
			self.lerp(&mut dst[i * dst_stride..], a, b, t);
		}
	}

	pub fn barycentric_lerp(self, dst: &mut [u8], a: &[u8], b: &[u8], c: &[u8], uvw: Vec3) {
		let mut la = [0.0; MAX_LANES];
		let mut lb = [0.0; MAX_LANES];
		let mut lc = [0.0; MAX_LANES];
		let n = to_lanes(self, a, &mut la);
		to_lanes(self, b, &mut lb);
		to_lanes(self, c, &mut lc);

		let mut out = [0.0; MAX_LANES];
		for i in 0..n {
			out[i] = la[i] * uvw.x + lb[i] * uvw.y + lc[i] * uvw.z;
		}

		from_lanes(self, dst, &out);
	}

	pub fn barycentric_lerp_array(
		self,
		dst: &mut [u8], dst_stride: usize,
		a: &[u8], b: &[u8], c: &[u8],
		uvws: &[Vec3],
	) {
		assert!(dst_stride >= self.size_in_bytes());
		assert!(dst.len() >= dst_stride * uvws.len());

		for (i, &uvw) in uvws.iter().enumerate() {
			self.barycentric_lerp(&mut dst[i * dst_stride..], a, b, c, uvw);
		}
	}
}


fn promote_pair_defined(dst: ValueType, src: ValueType) -> bool {
	use ValueType as T;

	matches!(
		(src, dst),
		(T::Float2, T::Half2 | T::Byte2N | T::UByte2N | T::Short2N | T::UShort2N)
		| (T::Half2 | T::Byte2N | T::UByte2N | T::Short2N | T::UShort2N, T::Float2)
		| (T::Float3, T::UX10Y10Z10W2N)
		| (T::UX10Y10Z10W2N, T::Float3)
		| (T::Float4, T::Half4 | T::Byte4N | T::UByte4N | T::Short4N | T::UShort4N | T::UX10Y10Z10W2N)
		| (T::Half4 | T::Byte4N | T::UByte4N | T::Short4N | T::UShort4N | T::UX10Y10Z10W2N, T::Float4)
	)
}

pub fn value_is_promotable(dst: ValueType, src: ValueType) -> bool {
	src == dst || promote_pair_defined(dst, src)
}

/// Converts `src` into `dst`'s format. Only the documented format pairs
/// (and identity) succeed; everything else returns false and leaves `dst`
/// untouched.
pub fn value_promote(output: ValueType, dst: &mut [u8], input: ValueType, src: &[u8]) -> bool {
	if output == input {
		output.copy(dst, src);
		return true;
	}

	if !promote_pair_defined(output, input) {
		return false;
	}

	let mut lanes = [0.0; MAX_LANES];
	to_lanes(input, src, &mut lanes);
	from_lanes(output, dst, &lanes);
	true
}

pub fn value_promote_array(
	output: ValueType, dst: &mut [u8], dst_stride: usize,
	input: ValueType, src: &[u8], src_stride: usize,
	count: usize,
) -> bool {
	if !value_is_promotable(output, input) {
		return false;
	}

	assert!(dst_stride >= output.size_in_bytes());
	assert!(src_stride >= input.size_in_bytes());
	assert!(dst.len() >= dst_stride * count);
	assert!(src.len() >= src_stride * count);

	for i in 0..count {
		let promoted = value_promote(
			output, &mut dst[i * dst_stride..],
			input, &src[i * src_stride..],
		);
		assert!(promoted);
	}

	true
}


/// Typed wrapper over a single value. `Void` is the empty state.
#[derive(Debug, Copy, Clone)]
pub enum Value {
	Void,

	Float(f32),
	Float2(Vec2),
	Float3(Vec3),
	Float4(Vec4),
	Float3x3(Mat3),
	Float4x3(Float4x3),
	Float4x4(Mat4),
	Bool(bool),
	Byte(i8),
	Byte2([i8; 2]),
	Byte4([i8; 4]),
	UByte(u8),
	UByte2([u8; 2]),
	UByte4([u8; 4]),
	Short(i16),
	Short2([i16; 2]),
	Short4([i16; 4]),
	UShort(u16),
	UShort2([u16; 2]),
	UShort4([u16; 4]),
	Word(i32),
	Word2([i32; 2]),
	Word3([i32; 3]),
	Word4([i32; 4]),
	UWord(u32),
	UWord2([u32; 2]),
	UWord3([u32; 3]),
	UWord4([u32; 4]),
	Half(f16),
	Half2(Half2),
	Half4(Half4),
	Byte2N(Byte2N),
	Byte4N(Byte4N),
	UByte2N(UByte2N),
	UByte4N(UByte4N),
	Short2N(Short2N),
	Short4N(Short4N),
	UShort2N(UShort2N),
	UShort4N(UShort4N),
	UX10Y10Z10W2N(UX10Y10Z10W2N),
}

impl Value {
	pub fn value_type(&self) -> ValueType {
		match self {
			Value::Void => ValueType::Void,
			Value::Float(_) => ValueType::Float,
			Value::Float2(_) => ValueType::Float2,
			Value::Float3(_) => ValueType::Float3,
			Value::Float4(_) => ValueType::Float4,
			Value::Float3x3(_) => ValueType::Float3x3,
			Value::Float4x3(_) => ValueType::Float4x3,
			Value::Float4x4(_) => ValueType::Float4x4,
			Value::Bool(_) => ValueType::Bool,
			Value::Byte(_) => ValueType::Byte,
			Value::Byte2(_) => ValueType::Byte2,
			Value::Byte4(_) => ValueType::Byte4,
			Value::UByte(_) => ValueType::UByte,
			Value::UByte2(_) => ValueType::UByte2,
			Value::UByte4(_) => ValueType::UByte4,
			Value::Short(_) => ValueType::Short,
			Value::Short2(_) => ValueType::Short2,
			Value::Short4(_) => ValueType::Short4,
			Value::UShort(_) => ValueType::UShort,
			Value::UShort2(_) => ValueType::UShort2,
			Value::UShort4(_) => ValueType::UShort4,
			Value::Word(_) => ValueType::Word,
			Value::Word2(_) => ValueType::Word2,
			Value::Word3(_) => ValueType::Word3,
			Value::Word4(_) => ValueType::Word4,
			Value::UWord(_) => ValueType::UWord,
			Value::UWord2(_) => ValueType::UWord2,
			Value::UWord3(_) => ValueType::UWord3,
			Value::UWord4(_) => ValueType::UWord4,
			Value::Half(_) => ValueType::Half,
			Value::Half2(_) => ValueType::Half2,
			Value::Half4(_) => ValueType::Half4,
			Value::Byte2N(_) => ValueType::Byte2N,
			Value::Byte4N(_) => ValueType::Byte4N,
			Value::UByte2N(_) => ValueType::UByte2N,
			Value::UByte4N(_) => ValueType::UByte4N,
			Value::Short2N(_) => ValueType::Short2N,
			Value::Short4N(_) => ValueType::Short4N,
			Value::UShort2N(_) => ValueType::UShort2N,
			Value::UShort4N(_) => ValueType::UShort4N,
			Value::UX10Y10Z10W2N(_) => ValueType::UX10Y10Z10W2N,
		}
	}

	pub fn is_empty(&self) -> bool {
		matches!(self, Value::Void)
	}

	pub fn size_in_bytes(&self) -> usize {
		self.value_type().size_in_bytes()
	}

	pub fn write_to(&self, dst: &mut [u8]) {
		assert!(dst.len() >= self.size_in_bytes());

		match self {
			Value::Void => {}
			Value::Float(v) => write_pod(dst, *v),
			Value::Float2(v) => write_pod(dst, *v),
			Value::Float3(v) => write_pod(dst, *v),
			Value::Float4(v) => write_pod(dst, *v),
			Value::Float3x3(v) => write_pod(dst, *v),
			Value::Float4x3(v) => write_pod(dst, *v),
			Value::Float4x4(v) => write_pod(dst, *v),
			Value::Bool(v) => dst[0] = *v as u8,
			Value::Byte(v) => write_pod(dst, *v),
			Value::Byte2(v) => write_pod(dst, *v),
			Value::Byte4(v) => write_pod(dst, *v),
			Value::UByte(v) => write_pod(dst, *v),
			Value::UByte2(v) => write_pod(dst, *v),
			Value::UByte4(v) => write_pod(dst, *v),
			Value::Short(v) => write_pod(dst, *v),
			Value::Short2(v) => write_pod(dst, *v),
			Value::Short4(v) => write_pod(dst, *v),
			Value::UShort(v) => write_pod(dst, *v),
			Value::UShort2(v) => write_pod(dst, *v),
			Value::UShort4(v) => write_pod(dst, *v),
			Value::Word(v) => write_pod(dst, *v),
			Value::Word2(v) => write_pod(dst, *v),
			Value::Word3(v) => write_pod(dst, *v),
			Value::Word4(v) => write_pod(dst, *v),
			Value::UWord(v) => write_pod(dst, *v),
			Value::UWord2(v) => write_pod(dst, *v),
			Value::UWord3(v) => write_pod(dst, *v),
			Value::UWord4(v) => write_pod(dst, *v),
			Value::Half(v) => write_pod(dst, *v),
			Value::Half2(v) => write_pod(dst, *v),
			Value::Half4(v) => write_pod(dst, *v),
			Value::Byte2N(v) => write_pod(dst, *v),
			Value::Byte4N(v) => write_pod(dst, *v),
			Value::UByte2N(v) => write_pod(dst, *v),
			Value::UByte4N(v) => write_pod(dst, *v),
			Value::Short2N(v) => write_pod(dst, *v),
			Value::Short4N(v) => write_pod(dst, *v),
			Value::UShort2N(v) => write_pod(dst, *v),
			Value::UShort4N(v) => write_pod(dst, *v),
			Value::UX10Y10Z10W2N(v) => write_pod(dst, *v),
		}
	}

	pub fn from_raw(ty: ValueType, src: &[u8]) -> Value {
		use ValueType as T;

		assert!(src.len() >= ty.size_in_bytes());

		match ty {
			T::Void => Value::Void,
			T::Float => Value::Float(read_pod(src)),
			T::Float2 => Value::Float2(read_pod(src)),
			T::Float3 => Value::Float3(read_pod(src)),
			T::Float4 => Value::Float4(read_pod(src)),
			T::Float3x3 => Value::Float3x3(read_pod(src)),
			T::Float4x3 => Value::Float4x3(read_pod(src)),
			T::Float4x4 => Value::Float4x4(read_pod(src)),
			T::Bool => Value::Bool(src[0] != 0),
			T::Byte => Value::Byte(read_pod(src)),
			T::Byte2 => Value::Byte2(read_pod(src)),
			T::Byte4 => Value::Byte4(read_pod(src)),
			T::UByte => Value::UByte(read_pod(src)),
			T::UByte2 => Value::UByte2(read_pod(src)),
			T::UByte4 => Value::UByte4(read_pod(src)),
			T::Short => Value::Short(read_pod(src)),
			T::Short2 => Value::Short2(read_pod(src)),
			T::Short4 => Value::Short4(read_pod(src)),
			T::UShort => Value::UShort(read_pod(src)),
			T::UShort2 => Value::UShort2(read_pod(src)),
			T::UShort4 => Value::UShort4(read_pod(src)),
			T::Word => Value::Word(read_pod(src)),
			T::Word2 => Value::Word2(read_pod(src)),
			T::Word3 => Value::Word3(read_pod(src)),
			T::Word4 => Value::Word4(read_pod(src)),
			T::UWord => Value::UWord(read_pod(src)),
			T::UWord2 => Value::UWord2(read_pod(src)),
			T::UWord3 => Value::UWord3(read_pod(src)),
			T::UWord4 => Value::UWord4(read_pod(src)),
			T::Half => Value::Half(read_pod(src)),
			T::Half2 => Value::Half2(read_pod(src)),
			T::Half4 => Value::Half4(read_pod(src)),
			T::Byte2N => Value::Byte2N(read_pod(src)),
			T::Byte4N => Value::Byte4N(read_pod(src)),
			T::UByte2N => Value::UByte2N(read_pod(src)),
			T::UByte4N => Value::UByte4N(read_pod(src)),
			T::Short2N => Value::Short2N(read_pod(src)),
			T::Short4N => Value::Short4N(read_pod(src)),
			T::UShort2N => Value::UShort2N(read_pod(src)),
			T::UShort4N => Value::UShort4N(read_pod(src)),
			T::UX10Y10Z10W2N => Value::UX10Y10Z10W2N(read_pod(src)),
		}
	}

	pub fn lerp(&self, other: &Value, t: f32) -> Value {
		let ty = self.value_type();
		assert!(ty == other.value_type());

		let mut a = [0u8; 64];
		let mut b = [0u8; 64];
		let mut out = [0u8; 64];
		self.write_to(&mut a);
		other.write_to(&mut b);

		ty.lerp(&mut out, &a, &b, t);
		Value::from_raw(ty, &out)
	}

	pub fn promote(&self, output: ValueType) -> Option<Value> {
		let input = self.value_type();

		let mut src = [0u8; 64];
		let mut dst = [0u8; 64];
		self.write_to(&mut src);

		value_promote(output, &mut dst, input, &src).then(|| Value::from_raw(output, &dst))
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Value) -> bool {
		let ty = self.value_type();
		if ty != other.value_type() {
			return false;
		}

		let mut lhs = [0u8; 64];
		let mut rhs = [0u8; 64];
		self.write_to(&mut lhs);
		other.write_to(&mut rhs);
		ty.equals(&lhs, &rhs)
	}
}

impl Eq for Value {}

impl std::hash::Hash for Value {
	fn hash<H: Hasher>(&self, state: &mut H) {
		let ty = self.value_type();
		let mut raw = [0u8; 64];
		self.write_to(&mut raw);
		state.write_u64(ty.hash(&raw));
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sizes_and_lanes_are_consistent() {
		for ty in ValueType::ALL {
			assert!(ty.size_in_bytes() > 0, "{ty:?}");
			assert!(ty.lane_count() > 0, "{ty:?}");
			assert!(ty.lane_count() <= MAX_LANES);
		}
		assert_eq!(ValueType::Void.size_in_bytes(), 0);
	}

	#[test]
	fn equal_values_hash_equally() {
		for ty in ValueType::ALL {
			let mut raw = vec![0x5au8; ty.size_in_bytes()];
			// Bool only stores 0 or 1
			if ty == ValueType::Bool {
				raw[0] = 1;
			}

			let a = Value::from_raw(ty, &raw);
			let b = Value::from_raw(ty, &raw);
			assert_eq!(a, b, "{ty:?}");
			assert_eq!(ty.hash(&raw), ty.hash(&raw));
		}
	}

	#[test]
	fn promote_matrix_matches_documentation() {
		use ValueType as T;

		for dst in [T::Half2, T::Byte2N, T::UByte2N, T::Short2N, T::UShort2N] {
			assert!(value_is_promotable(dst, T::Float2));
			assert!(value_is_promotable(T::Float2, dst));
		}

		for dst in [T::Half4, T::Byte4N, T::UByte4N, T::Short4N, T::UShort4N, T::UX10Y10Z10W2N] {
			assert!(value_is_promotable(dst, T::Float4));
			assert!(value_is_promotable(T::Float4, dst));
		}

		assert!(value_is_promotable(T::UX10Y10Z10W2N, T::Float3));
		assert!(value_is_promotable(T::Float3, T::UX10Y10Z10W2N));

		assert!(!value_is_promotable(T::Float2, T::Float3));
		assert!(!value_is_promotable(T::Byte2N, T::Half2));
		assert!(!value_is_promotable(T::Word, T::Float));

		// Identity always holds
		for ty in ValueType::ALL {
			assert!(value_is_promotable(ty, ty));
		}
	}

	#[test]
	fn float3_to_ux10_round_trip_is_within_quantization() {
		let v = Value::Float3(Vec3::new(0.1, 0.5, 0.9));
		let packed = v.promote(ValueType::UX10Y10Z10W2N).unwrap();
		let back = packed.promote(ValueType::Float3).unwrap();

		let Value::Float3(result) = back else { panic!() };
		assert!((result.x - 0.1).abs() <= 1.0 / 1023.0);
		assert!((result.y - 0.5).abs() <= 1.0 / 1023.0);
		assert!((result.z - 0.9).abs() <= 1.0 / 1023.0);
	}

	#[test]
	fn undefined_promotes_fail_cleanly() {
		let v = Value::Float2(Vec2::new(1.0, 2.0));
		assert!(v.promote(ValueType::Float3).is_none());
		assert!(v.promote(ValueType::Byte4N).is_none());
	}

	#[test]
	fn lerp_midpoint_of_floats() {
		let a = Value::Float4(Vec4::splat(0.0));
		let b = Value::Float4(Vec4::splat(2.0));
		assert_eq!(a.lerp(&b, 0.5), Value::Float4(Vec4::splat(1.0)));
	}

	#[test]
	fn lerp_rounds_integer_components() {
		let a = Value::UByte2([0, 10]);
		let b = Value::UByte2([10, 20]);
		assert_eq!(a.lerp(&b, 0.25), Value::UByte2([3, 13]));
	}

	#[test]
	fn barycentric_lerp_weights_three_corners() {
		let ty = ValueType::Float2;
		let a = [0u8; 8];
		let mut b = [0u8; 8];
		let mut c = [0u8; 8];
		Value::Float2(Vec2::new(1.0, 0.0)).write_to(&mut b);
		Value::Float2(Vec2::new(0.0, 1.0)).write_to(&mut c);

		let mut out = [0u8; 8];
		ty.barycentric_lerp(&mut out, &a, &b, &c, Vec3::new(0.25, 0.5, 0.25));
		assert_eq!(Value::from_raw(ty, &out), Value::Float2(Vec2::new(0.5, 0.25)));
	}

	#[test]
	fn promote_array_walks_strided_elements() {
		let src: [f32; 6] = [0.0, 1.0, 0.25, 0.75, 1.0, 0.5];
		let src_bytes = bytemuck::cast_slice::<f32, u8>(&src);
		let mut dst = [0u8; 3 * 4];

		let promoted = value_promote_array(
			ValueType::UShort2N, &mut dst, 4,
			ValueType::Float2, src_bytes, 8,
			3,
		);
		assert!(promoted);

		let first: UShort2N = bytemuck::pod_read_unaligned(&dst[..4]);
		assert_eq!(first, UShort2N([0, 65535]));
	}
}
