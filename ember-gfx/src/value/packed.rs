use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use half::f16;


fn pack_snorm8(v: f32) -> i8 {
	(v.clamp(-1.0, 1.0) * 127.0).round() as i8
}

fn unpack_snorm8(v: i8) -> f32 {
	(v as f32 / 127.0).max(-1.0)
}

fn pack_unorm8(v: f32) -> u8 {
	(v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn unpack_unorm8(v: u8) -> f32 {
	v as f32 / 255.0
}

fn pack_snorm16(v: f32) -> i16 {
	(v.clamp(-1.0, 1.0) * 32767.0).round() as i16
}

fn unpack_snorm16(v: i16) -> f32 {
	(v as f32 / 32767.0).max(-1.0)
}

fn pack_unorm16(v: f32) -> u16 {
	(v.clamp(0.0, 1.0) * 65535.0).round() as u16
}

fn unpack_unorm16(v: u16) -> f32 {
	v as f32 / 65535.0
}

fn pack_unorm10(v: f32) -> u32 {
	(v.clamp(0.0, 1.0) * 1023.0).round() as u32
}

fn unpack_unorm10(v: u32) -> f32 {
	(v & 0x3ff) as f32 / 1023.0
}


#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Byte2N(pub [i8; 2]);

impl Byte2N {
	pub fn pack(v: Vec2) -> Byte2N {
		Byte2N([pack_snorm8(v.x), pack_snorm8(v.y)])
	}

	pub fn unpack(self) -> Vec2 {
		Vec2::new(unpack_snorm8(self.0[0]), unpack_snorm8(self.0[1]))
	}
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Byte4N(pub [i8; 4]);

impl Byte4N {
	pub fn pack(v: Vec4) -> Byte4N {
		Byte4N([pack_snorm8(v.x), pack_snorm8(v.y), pack_snorm8(v.z), pack_snorm8(v.w)])
	}

	pub fn unpack(self) -> Vec4 {
		Vec4::new(
			unpack_snorm8(self.0[0]),
			unpack_snorm8(self.0[1]),
			unpack_snorm8(self.0[2]),
			unpack_snorm8(self.0[3]),
		)
	}
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct UByte2N(pub [u8; 2]);

impl UByte2N {
	pub fn pack(v: Vec2) -> UByte2N {
		UByte2N([pack_unorm8(v.x), pack_unorm8(v.y)])
	}

	pub fn unpack(self) -> Vec2 {
		Vec2::new(unpack_unorm8(self.0[0]), unpack_unorm8(self.0[1]))
	}
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct UByte4N(pub [u8; 4]);

impl UByte4N {
	pub fn pack(v: Vec4) -> UByte4N {
		UByte4N([pack_unorm8(v.x), pack_unorm8(v.y), pack_unorm8(v.z), pack_unorm8(v.w)])
	}

	pub fn unpack(self) -> Vec4 {
		Vec4::new(
			unpack_unorm8(self.0[0]),
			unpack_unorm8(self.0[1]),
			unpack_unorm8(self.0[2]),
			unpack_unorm8(self.0[3]),
		)
	}
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Short2N(pub [i16; 2]);

impl Short2N {
	pub fn pack(v: Vec2) -> Short2N {
		Short2N([pack_snorm16(v.x), pack_snorm16(v.y)])
	}

	pub fn unpack(self) -> Vec2 {
		Vec2::new(unpack_snorm16(self.0[0]), unpack_snorm16(self.0[1]))
	}
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Short4N(pub [i16; 4]);

impl Short4N {
	pub fn pack(v: Vec4) -> Short4N {
		Short4N([pack_snorm16(v.x), pack_snorm16(v.y), pack_snorm16(v.z), pack_snorm16(v.w)])
	}

	pub fn unpack(self) -> Vec4 {
		Vec4::new(
			unpack_snorm16(self.0[0]),
			unpack_snorm16(self.0[1]),
			unpack_snorm16(self.0[2]),
			unpack_snorm16(self.0[3]),
		)
	}
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct UShort2N(pub [u16; 2]);

impl UShort2N {
	pub fn pack(v: Vec2) -> UShort2N {
		UShort2N([pack_unorm16(v.x), pack_unorm16(v.y)])
	}

	pub fn unpack(self) -> Vec2 {
		Vec2::new(unpack_unorm16(self.0[0]), unpack_unorm16(self.0[1]))
	}
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct UShort4N(pub [u16; 4]);

impl UShort4N {
	pub fn pack(v: Vec4) -> UShort4N {
		UShort4N([pack_unorm16(v.x), pack_unorm16(v.y), pack_unorm16(v.z), pack_unorm16(v.w)])
	}

	pub fn unpack(self) -> Vec4 {
		Vec4::new(
			unpack_unorm16(self.0[0]),
			unpack_unorm16(self.0[1]),
			unpack_unorm16(self.0[2]),
			unpack_unorm16(self.0[3]),
		)
	}
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Half2(pub [f16; 2]);

impl Half2 {
	pub fn pack(v: Vec2) -> Half2 {
		Half2([f16::from_f32(v.x), f16::from_f32(v.y)])
	}

	pub fn unpack(self) -> Vec2 {
		Vec2::new(self.0[0].to_f32(), self.0[1].to_f32())
	}
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Half4(pub [f16; 4]);

impl Half4 {
	pub fn pack(v: Vec4) -> Half4 {
		Half4([
			f16::from_f32(v.x),
			f16::from_f32(v.y),
			f16::from_f32(v.z),
			f16::from_f32(v.w),
		])
	}

	pub fn unpack(self) -> Vec4 {
		Vec4::new(
			self.0[0].to_f32(),
			self.0[1].to_f32(),
			self.0[2].to_f32(),
			self.0[3].to_f32(),
		)
	}
}

/// 10:10:10:2 unsigned normalized, x in the low bits.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct UX10Y10Z10W2N(pub u32);

impl UX10Y10Z10W2N {
	pub fn pack(v: Vec4) -> UX10Y10Z10W2N {
		let x = pack_unorm10(v.x);
		let y = pack_unorm10(v.y);
		let z = pack_unorm10(v.z);
		let w = (v.w.clamp(0.0, 1.0) * 3.0).round() as u32;
		UX10Y10Z10W2N(x | (y << 10) | (z << 20) | (w << 30))
	}

	pub fn pack_xyz(v: Vec3) -> UX10Y10Z10W2N {
		UX10Y10Z10W2N::pack(Vec4::new(v.x, v.y, v.z, 0.0))
	}

	pub fn unpack(self) -> Vec4 {
		Vec4::new(
			unpack_unorm10(self.0),
			unpack_unorm10(self.0 >> 10),
			unpack_unorm10(self.0 >> 20),
			((self.0 >> 30) & 0x3) as f32 / 3.0,
		)
	}

	pub fn unpack_xyz(self) -> Vec3 {
		let v = self.unpack();
		Vec3::new(v.x, v.y, v.z)
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn snorm8_round_trip_error_is_bounded() {
		for v in [-1.0f32, -0.33, 0.0, 0.5, 0.99, 1.0] {
			let packed = Byte2N::pack(Vec2::splat(v));
			let unpacked = packed.unpack();
			assert!((unpacked.x - v).abs() <= 1.0 / 127.0, "{v} -> {}", unpacked.x);
		}
	}

	#[test]
	fn unorm10_round_trip_error_is_bounded() {
		for v in [0.0f32, 0.1, 0.5, 0.9, 1.0] {
			let packed = UX10Y10Z10W2N::pack_xyz(Vec3::splat(v));
			let unpacked = packed.unpack_xyz();
			assert!((unpacked.x - v).abs() <= 1.0 / 1023.0);
			assert!((unpacked.y - v).abs() <= 1.0 / 1023.0);
			assert!((unpacked.z - v).abs() <= 1.0 / 1023.0);
		}
	}

	#[test]
	fn out_of_range_inputs_saturate() {
		assert_eq!(UByte2N::pack(Vec2::new(2.0, -1.0)), UByte2N([255, 0]));
		assert_eq!(Short2N::pack(Vec2::new(7.0, -7.0)), Short2N([32767, -32767]));
	}
}
