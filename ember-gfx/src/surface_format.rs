use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;


#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceFormatType {
	Unknown = 0,
	A8,
	D16,
	D24S8,
	D32,
	Dxn0,
	Dxt1,
	Dxt1Srgb,
	Dxt3,
	Dxt3Srgb,
	Dxt5,
	Dxt5Srgb,
	R5G5B5A1,
	R5G6B5,
	R8,
	R8G8,
	R8G8B8A8,
	R8G8B8A8Srgb,
	R10G10B10A2,
	R11G11B10,
	R16,
	R16G16,
	R16G16B16A16,
	R16G16B16A16F,
	R16G16F,
	R16F,
	R32,
	R32G32,
	R32G32B32A32,
	R32G32B32A32F,
	R32G32F,
	R32F,
}

pub const SURFACE_FORMAT_COUNT: usize = 32;


bitflags! {
	#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
	pub struct SurfaceFormatFlags: u32 {
		const RGB            = 1 << 0;
		const RA             = 1 << 1;
		const ALPHA          = 1 << 2;
		const LUMINANCE      = 1 << 3;
		const DEPTH          = 1 << 4;
		const STENCIL        = 1 << 5;
		const BUMP           = 1 << 6;
		const PALETTE        = 1 << 7;
		const FLOATING_POINT = 1 << 8;
		const DXTC           = 1 << 9;
		const GAMMA_SPACE    = 1 << 10;
	}
}

bitflags! {
	#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
	pub struct SurfaceFormatSupport: u32 {
		const CHECKED           = 1 << 0;
		const TEXTURE           = 1 << 1;
		const RENDER_TARGET     = 1 << 2;
		const AUTO_GEN_MIP_MAPS = 1 << 3;
		const VERTEX_TEXTURE    = 1 << 4;
		const DEPTH_STENCIL     = 1 << 5;
	}
}

impl SurfaceFormatSupport {
	pub const ALL: SurfaceFormatSupport = SurfaceFormatSupport::all();
}


/// Static per-pixel-format descriptor. Formats with a 16 texel block
/// (the DXTC family) address storage in 4x4 macro blocks; everything else
/// is addressed per texel.
#[derive(Debug)]
pub struct SurfaceFormat {
	name: &'static str,
	block_size: u32,
	macro_block_bit_count: u32,
	format_type: SurfaceFormatType,
	flags: SurfaceFormatFlags,
}

const fn def(
	name: &'static str,
	block_size: u32,
	macro_block_bit_count: u32,
	format_type: SurfaceFormatType,
	flags: SurfaceFormatFlags,
) -> SurfaceFormat {
	SurfaceFormat { name, block_size, macro_block_bit_count, format_type, flags }
}

use SurfaceFormatFlags as F;
use SurfaceFormatType as T;

static ALL_FORMATS: [SurfaceFormat; SURFACE_FORMAT_COUNT] = [
	def("UNKNOWN", 1, 0, T::Unknown, F::empty()),
	def("A8", 1, 8, T::A8, F::ALPHA),
	def("D16", 1, 16, T::D16, F::DEPTH),
	def("D24S8", 1, 32, T::D24S8, F::DEPTH.union(F::STENCIL)),
	def("D32", 1, 32, T::D32, F::DEPTH),
	def("DXN0", 16, 128, T::Dxn0, F::BUMP.union(F::DXTC)),
	def("DXT1", 16, 64, T::Dxt1, F::RGB.union(F::DXTC)),
	def("DXT1_SRGB", 16, 64, T::Dxt1Srgb, F::RGB.union(F::GAMMA_SPACE).union(F::DXTC)),
	def("DXT3", 16, 128, T::Dxt3, F::RGB.union(F::ALPHA).union(F::DXTC)),
	def("DXT3_SRGB", 16, 128, T::Dxt3Srgb, F::RGB.union(F::ALPHA).union(F::GAMMA_SPACE).union(F::DXTC)),
	def("DXT5", 16, 128, T::Dxt5, F::RA.union(F::DXTC)),
	def("DXT5_SRGB", 16, 128, T::Dxt5Srgb, F::RA.union(F::GAMMA_SPACE).union(F::DXTC)),
	def("R5G5B5A1", 1, 16, T::R5G5B5A1, F::RGB.union(F::ALPHA)),
	def("R5G6B5", 1, 16, T::R5G6B5, F::RGB),
	def("R8", 1, 8, T::R8, F::LUMINANCE),
	def("R8G8", 1, 16, T::R8G8, F::RA),
	def("R8G8B8A8", 1, 32, T::R8G8B8A8, F::RGB.union(F::ALPHA)),
	def("R8G8B8A8_SRGB", 1, 32, T::R8G8B8A8Srgb, F::RGB.union(F::ALPHA).union(F::GAMMA_SPACE)),
	def("R10G10B10A2", 1, 32, T::R10G10B10A2, F::RGB.union(F::ALPHA)),
	def("R11G11B10", 1, 32, T::R11G11B10, F::RGB.union(F::FLOATING_POINT)),
	def("R16", 1, 16, T::R16, F::LUMINANCE),
	def("R16G16", 1, 32, T::R16G16, F::RA),
	def("R16G16B16A16", 1, 64, T::R16G16B16A16, F::RGB.union(F::ALPHA)),
	def("R16G16B16A16_F", 1, 64, T::R16G16B16A16F, F::RGB.union(F::ALPHA).union(F::FLOATING_POINT)),
	def("R16G16_F", 1, 32, T::R16G16F, F::FLOATING_POINT),
	def("R16_F", 1, 16, T::R16F, F::LUMINANCE.union(F::FLOATING_POINT)),
	def("R32", 1, 32, T::R32, F::LUMINANCE),
	def("R32G32", 1, 64, T::R32G32, F::RA),
	def("R32G32B32A32", 1, 128, T::R32G32B32A32, F::RGB.union(F::ALPHA)),
	def("R32G32B32A32_F", 1, 128, T::R32G32B32A32F, F::RGB.union(F::ALPHA).union(F::FLOATING_POINT)),
	def("R32G32_F", 1, 64, T::R32G32F, F::RA.union(F::FLOATING_POINT)),
	def("R32_F", 1, 32, T::R32F, F::LUMINANCE.union(F::FLOATING_POINT)),
];

// Support bits are probed by the backend at device creation and are
// process-wide, like the format table itself.
static SUPPORT: [AtomicU32; SURFACE_FORMAT_COUNT] = {
	#[allow(clippy::declare_interior_mutable_const)]
	const ZERO: AtomicU32 = AtomicU32::new(0);
	[ZERO; SURFACE_FORMAT_COUNT]
};

impl SurfaceFormat {
	pub fn from_type(format_type: SurfaceFormatType) -> &'static SurfaceFormat {
		let format = &ALL_FORMATS[format_type as usize];
		debug_assert!(format.format_type == format_type);
		format
	}

	pub fn all_formats() -> &'static [SurfaceFormat] {
		&ALL_FORMATS
	}

	pub fn name(&self) -> &'static str { self.name }
	pub fn format_type(&self) -> SurfaceFormatType { self.format_type }
	pub fn flags(&self) -> SurfaceFormatFlags { self.flags }

	pub fn block_size(&self) -> u32 { self.block_size }
	pub fn macro_block_bit_count(&self) -> u32 { self.macro_block_bit_count }

	pub fn is_rgb(&self) -> bool { self.flags.contains(F::RGB) }
	pub fn is_ra(&self) -> bool { self.flags.contains(F::RA) }
	pub fn is_alpha(&self) -> bool { self.flags.contains(F::ALPHA) }
	pub fn is_luminance(&self) -> bool { self.flags.contains(F::LUMINANCE) }
	pub fn is_depth(&self) -> bool { self.flags.contains(F::DEPTH) }
	pub fn is_stencil(&self) -> bool { self.flags.contains(F::STENCIL) }
	pub fn is_bump(&self) -> bool { self.flags.contains(F::BUMP) }
	pub fn is_palette(&self) -> bool { self.flags.contains(F::PALETTE) }
	pub fn is_floating_point(&self) -> bool { self.flags.contains(F::FLOATING_POINT) }
	pub fn is_dxtc(&self) -> bool { self.flags.contains(F::DXTC) }
	pub fn is_gamma_space(&self) -> bool { self.flags.contains(F::GAMMA_SPACE) }

	pub fn support(&self) -> SurfaceFormatSupport {
		SurfaceFormatSupport::from_bits_truncate(SUPPORT[self.format_type as usize].load(Ordering::Relaxed))
	}

	pub fn set_support(&self, support: SurfaceFormatSupport) {
		SUPPORT[self.format_type as usize]
			.store((support | SurfaceFormatSupport::CHECKED).bits(), Ordering::Relaxed);
	}

	pub fn clear_support(&self) {
		SUPPORT[self.format_type as usize].store(0, Ordering::Relaxed);
	}

	pub fn support_checked(&self) -> bool {
		self.support().contains(SurfaceFormatSupport::CHECKED)
	}

	pub fn support_texture(&self) -> bool {
		assert!(self.support_checked());
		self.support().contains(SurfaceFormatSupport::TEXTURE)
	}

	pub fn support_render_target(&self) -> bool {
		assert!(self.support_checked());
		self.support().contains(SurfaceFormatSupport::RENDER_TARGET)
	}

	pub fn support_auto_gen_mip_maps(&self) -> bool {
		assert!(self.support_checked());
		self.support().contains(SurfaceFormatSupport::AUTO_GEN_MIP_MAPS)
	}

	pub fn support_vertex_texture(&self) -> bool {
		assert!(self.support_checked());
		self.support().contains(SurfaceFormatSupport::VERTEX_TEXTURE)
	}

	pub fn support_depth_stencil(&self) -> bool {
		assert!(self.support_checked());
		self.support().contains(SurfaceFormatSupport::DEPTH_STENCIL)
	}
}

/// Size queries
impl SurfaceFormat {
	/// Bytes spanned by one row of macro blocks.
	pub fn pitch(&self) -> u32 {
		self.macro_block_bit_count >> 3
	}

	pub fn bits_per_pixel(&self) -> u32 {
		self.macro_block_bit_count / self.block_size
	}

	pub fn macro_block_size_in_pixels(&self) -> u32 {
		if self.block_size == 1 {
			1
		} else {
			assert!(self.block_size == 16);
			4
		}
	}

	/// Returns `(row_bytes, row_count)` for one mip level of the given
	/// dimensions, rounding partial macro blocks up.
	pub fn size_of_texture_2d(&self, width: u32, height: u32) -> (usize, usize) {
		let macro_block = self.macro_block_size_in_pixels();

		let blocks_wide = if width > 0 {
			width.div_ceil(macro_block).max(1) as usize
		} else {
			0
		};

		let blocks_high = if height > 0 {
			height.div_ceil(macro_block).max(1) as usize
		} else {
			0
		};

		let row_bytes = (blocks_wide * self.macro_block_bit_count as usize) >> 3;
		(row_bytes, blocks_high)
	}

	pub fn size_of_texture_2d_in_bytes(&self, width: u32, height: u32) -> usize {
		let (row_bytes, row_count) = self.size_of_texture_2d(width, height);
		row_bytes * row_count
	}

	/// Total for a full mip chain; per-level dimensions halve and clamp at 1.
	pub fn size_of_texture_2d_mip_chain_in_bytes(&self, width: u32, height: u32, level_count: u32) -> usize {
		assert!(level_count > 0);

		let mut total = 0;
		for level in 0..level_count {
			let level_width = (width >> level).max(1);
			let level_height = (height >> level).max(1);
			total += self.size_of_texture_2d_in_bytes(level_width, level_height);
		}

		total
	}
}

impl PartialEq for SurfaceFormat {
	fn eq(&self, other: &SurfaceFormat) -> bool {
		self.format_type == other.format_type
	}
}

impl Eq for SurfaceFormat {}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn table_is_indexed_by_type() {
		for format in SurfaceFormat::all_formats() {
			assert!(std::ptr::eq(SurfaceFormat::from_type(format.format_type()), format));
		}
	}

	#[test]
	fn plain_format_sizes() {
		let rgba = SurfaceFormat::from_type(SurfaceFormatType::R8G8B8A8);
		assert_eq!(rgba.bits_per_pixel(), 32);
		assert_eq!(rgba.size_of_texture_2d(16, 16), (64, 16));
		assert_eq!(rgba.size_of_texture_2d_in_bytes(16, 16), 1024);
	}

	#[test]
	fn dxtc_sizes_round_up_to_macro_blocks() {
		let dxt1 = SurfaceFormat::from_type(SurfaceFormatType::Dxt1);
		assert_eq!(dxt1.macro_block_size_in_pixels(), 4);

		// 8x8 texels = 2x2 macro blocks of 8 bytes each
		assert_eq!(dxt1.size_of_texture_2d(8, 8), (16, 2));

		// Partial blocks round up
		assert_eq!(dxt1.size_of_texture_2d(9, 5), (24, 2));
	}

	#[test]
	fn mip_chain_clamps_at_one_texel() {
		let r8 = SurfaceFormat::from_type(SurfaceFormatType::R8);
		// 8x2 with 4 levels: 8x2 + 4x1 + 2x1 + 1x1
		assert_eq!(r8.size_of_texture_2d_mip_chain_in_bytes(8, 2, 4), 16 + 4 + 2 + 1);
	}

	#[test]
	fn support_bits_round_trip() {
		let format = SurfaceFormat::from_type(SurfaceFormatType::R16F);
		assert!(!format.support_checked());

		format.set_support(SurfaceFormatSupport::TEXTURE | SurfaceFormatSupport::RENDER_TARGET);
		assert!(format.support_checked());
		assert!(format.support_texture());
		assert!(format.support_render_target());
		assert!(!format.support_depth_stencil());

		format.clear_support();
		assert!(!format.support_checked());
	}
}
