use std::hash::Hasher;

use glam::{UVec2, Vec4};

use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::buffer::{buffer_mode_allowed_for_usage, BufferMode, BufferUsage};
use crate::device::entity::{EntityDesc, TerminalEntity, TextureEntityDesc};
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};
use crate::device::sharable::{DeviceResourceSharable, SharedKey};
use crate::device::texture::{Aabb2u, Texture};
use crate::surface_format::{SurfaceFormat, SurfaceFormatType};


/// Mip-mapped two dimensional texture. Width and height are multiples of
/// the format's block size and the mip chain may not shift both dimensions
/// to zero.
#[derive(Debug)]
pub struct Texture2d {
	resource: DeviceResourceBase,
	format: &'static SurfaceFormat,
	mode: BufferMode,
	usage: BufferUsage,
	width: u32,
	height: u32,
	level_count: u32,
	entity: Option<TerminalEntity>,
}

impl Texture2d {
	pub fn new(
		width: u32,
		height: u32,
		level_count: u32,
		format: SurfaceFormatType,
		mode: BufferMode,
		usage: BufferUsage,
		sharable: bool,
	) -> Texture2d {
		Texture2d::with_resource_type(
			DeviceResourceType::Texture2d,
			width,
			height,
			level_count,
			format,
			mode,
			usage,
			sharable,
		)
	}

	#[allow(clippy::too_many_arguments)]
	pub(crate) fn with_resource_type(
		resource_type: DeviceResourceType,
		width: u32,
		height: u32,
		level_count: u32,
		format: SurfaceFormatType,
		mode: BufferMode,
		usage: BufferUsage,
		sharable: bool,
	) -> Texture2d {
		let format = SurfaceFormat::from_type(format);

		assert!(width > 0 && height > 0);
		assert!(level_count > 0);
		assert!(width.max(height) >> (level_count - 1) > 0, "mip chain is too deep");
		assert!(width % format.block_size() == 0);
		assert!(height % format.block_size() == 0);
		assert!(buffer_mode_allowed_for_usage(mode, usage));

		Texture2d {
			resource: DeviceResourceBase::with_sharable(resource_type, sharable),
			format,
			mode,
			usage,
			width,
			height,
			level_count,
			entity: None,
		}
	}

	pub fn resource_base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	pub fn resource_base_mut(&mut self) -> &mut DeviceResourceBase {
		&mut self.resource
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	/// Dimensions of one mip level, clamped at one texel.
	pub fn level_dimensions(&self, level: u32) -> UVec2 {
		assert!(level < self.level_count);
		UVec2::new((self.width >> level).max(1), (self.height >> level).max(1))
	}

	/// `(1/w, 1/h, w, h)`, the constant shaders use for texel addressing.
	pub fn du_dv_dimensions(&self) -> Vec4 {
		Vec4::new(
			1.0 / self.width as f32,
			1.0 / self.height as f32,
			self.width as f32,
			self.height as f32,
		)
	}

	pub fn sub_resource_index(&self, level: u32) -> u32 {
		assert!(level < self.level_count);
		level
	}

	pub fn entity_desc(&self) -> TextureEntityDesc {
		TextureEntityDesc {
			format: self.format.format_type(),
			mode: self.mode,
			usage: self.usage,
			width: self.width,
			height: self.height,
			level_count: self.level_count,
		}
	}

	pub fn freeze(&mut self) {
		self.resource.freeze();

		if self.resource.sharable() {
			let key = SharedKey::make(self.resource.resource_type(), self.shared_key_hash());
			self.resource.set_shared_key(key);
		}
	}

	pub(crate) fn attach_created_entity(&mut self, api: crate::device::DeviceApi, mut entity: TerminalEntity) {
		assert!(self.resource.frozen());
		assert!(self.entity.is_none());
		assert!(entity.match_api(api));

		entity.attach_resource(&self.resource);
		self.entity = Some(entity);
	}

	pub(crate) fn take_entity(&mut self, api: crate::device::DeviceApi) -> TerminalEntity {
		assert!(self.resource.frozen());

		let mut entity = self.entity.take().expect("texture is not available");
		assert!(entity.match_api(api));
		entity.detach_resource(&self.resource);
		entity
	}

	pub fn create(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(self.entity.is_none());

		if let Some(data) = initial_data {
			assert!(data.len() == self.size_in_bytes());
		}
		if self.usage == BufferUsage::Immutable {
			assert!(initial_data.is_some(), "immutable textures need complete initial data");
		}

		let api = device.api();
		let entity = device.create_texture_2d(self, initial_data)?;
		self.attach_created_entity(api, entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();

		let entity = self.take_entity(device.api());
		device.destroy_texture_2d(self, entity)
	}

	/// Raw read-back starting at `offset` bytes into the packed mip chain.
	pub fn get_data(
		&self,
		device: &mut dyn DeviceApiEncapsulator,
		offset: usize,
		dst: &mut [u8],
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(!dst.is_empty());
		assert!(offset + dst.len() <= self.size_in_bytes());
		assert!(self.mode.contains(BufferMode::READ));

		let entity = self.entity.as_ref().expect("texture is not available");
		device.texture_get_data(entity, offset, dst)
	}

	/// Raw upload starting at `offset` bytes into the packed mip chain.
	pub fn set_data(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		offset: usize,
		src: &[u8],
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(!src.is_empty());
		assert!(offset + src.len() <= self.size_in_bytes());
		assert!(self.mode.contains(BufferMode::WRITE));

		let entity = self.entity.as_mut().expect("texture is not available");
		device.texture_set_data(entity, offset, src)
	}

	pub fn copy_from(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		source: &Texture2d,
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(self.mode.contains(BufferMode::WRITE));
		assert!(source.resource.frozen());
		assert!(source.available());
		assert!(source.mode.contains(BufferMode::READ));
		assert!(source.size_in_bytes() == self.size_in_bytes());

		let dst = self.entity.as_mut().expect("texture is not available");
		device.texture_copy(dst, source.terminal_entity().unwrap())
	}

	/// Copies `src_box` texels of `source`'s mip `src_level` onto
	/// `dst_pos` of this texture's mip `dst_level`.
	pub fn copy_sub_part(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		dst_level: u32,
		dst_pos: UVec2,
		source: &Texture2d,
		src_level: u32,
		src_box: Aabb2u,
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(dst_level < self.level_count);
		assert!(src_level < source.level_count);

		validate_copy_sub_part(
			&CopySubPartSide {
				frozen: self.resource.frozen(),
				available: self.available(),
				mode: self.mode,
				format: self.format,
				level_count: self.level_count,
				level_dimensions: self.level_dimensions(dst_level),
			},
			dst_level,
			dst_pos,
			&CopySubPartSide {
				frozen: source.resource.frozen(),
				available: source.available(),
				mode: source.mode,
				format: source.format,
				level_count: source.level_count,
				level_dimensions: source.level_dimensions(src_level),
			},
			src_level,
			src_box,
		);

		let dst_sub_resource = self.sub_resource_index(dst_level);
		let src_sub_resource = source.sub_resource_index(src_level);

		let dst = self.entity.as_mut().expect("texture is not available");
		device.texture_copy_sub_part(
			dst,
			dst_sub_resource,
			dst_pos,
			source.terminal_entity().unwrap(),
			src_sub_resource,
			src_box,
		)
	}
}

pub(crate) struct CopySubPartSide {
	pub frozen: bool,
	pub available: bool,
	pub mode: BufferMode,
	pub format: &'static SurfaceFormat,
	pub level_count: u32,
	pub level_dimensions: UVec2,
}

/// The shared validation list for texture sub-region copies; cube copies
/// run the same checks per face.
pub(crate) fn validate_copy_sub_part(
	dst: &CopySubPartSide,
	dst_level: u32,
	dst_pos: UVec2,
	src: &CopySubPartSide,
	src_level: u32,
	src_box: Aabb2u,
) {
	assert!(dst.frozen && dst.available);
	assert!(src.frozen && src.available);
	assert!(dst.mode.contains(BufferMode::WRITE), "destination is not writable");
	assert!(src.mode.contains(BufferMode::READ), "source is not readable");

	assert!(dst_level < dst.level_count);
	assert!(src_level < src.level_count);

	assert!(src_box.has_positive_extents());
	assert!(src_box.max.x <= src.level_dimensions.x && src_box.max.y <= src.level_dimensions.y);

	let extents = src_box.extents();
	assert!(
		dst_pos.x + extents.x <= dst.level_dimensions.x
			&& dst_pos.y + extents.y <= dst.level_dimensions.y
	);

	// Block-aware byte size of the region must agree on both sides.
	assert!(
		src.format.size_of_texture_2d_in_bytes(extents.x, extents.y)
			== dst.format.size_of_texture_2d_in_bytes(extents.x, extents.y)
	);
}

impl Texture for Texture2d {
	fn resource_base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	fn format(&self) -> &'static SurfaceFormat {
		self.format
	}

	fn mode(&self) -> BufferMode {
		self.mode
	}

	fn usage(&self) -> BufferUsage {
		self.usage
	}

	fn level_count(&self) -> u32 {
		self.level_count
	}

	fn size_in_bytes(&self) -> usize {
		self.format
			.size_of_texture_2d_mip_chain_in_bytes(self.width, self.height, self.level_count)
	}

	fn available(&self) -> bool {
		self.entity.is_some()
	}

	fn terminal_entity(&self) -> Option<&TerminalEntity> {
		self.entity.as_ref()
	}
}

impl DeviceResourceSharable for Texture2d {
	fn base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	fn shared_key_hash(&self) -> u64 {
		let desc = self.entity_desc();
		let mut hasher = fnv::FnvHasher::default();
		hasher.write_u32(desc.format as u32);
		hasher.write_u32(desc.mode.bits());
		hasher.write_u32(desc.usage as u32);
		hasher.write_u32(desc.width);
		hasher.write_u32(desc.height);
		hasher.write_u32(desc.level_count);
		hasher.finish()
	}

	fn match_entity_desc(&self, entity: &TerminalEntity) -> bool {
		matches!(entity.desc(), EntityDesc::Texture2d(desc) if *desc == self.entity_desc())
	}
}

impl Drop for Texture2d {
	fn drop(&mut self) {
		if !std::thread::panicking() {
			debug_assert!(
				self.entity.is_none(),
				"texture dropped while still bound to a device"
			);
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mip_chain_size_sums_levels() {
		let texture = Texture2d::new(
			8, 4, 3,
			SurfaceFormatType::R8G8B8A8,
			BufferMode::NONE,
			BufferUsage::Default,
			false,
		);

		// 8x4 + 4x2 + 2x1 texels at 4 bytes
		assert_eq!(texture.size_in_bytes(), (32 + 8 + 2) * 4);
		assert_eq!(texture.level_dimensions(2), UVec2::new(2, 1));
	}

	#[test]
	#[should_panic]
	fn too_deep_mip_chains_are_rejected() {
		Texture2d::new(
			8, 8, 5,
			SurfaceFormatType::R8G8B8A8,
			BufferMode::NONE,
			BufferUsage::Default,
			false,
		);
	}

	#[test]
	#[should_panic]
	fn block_misaligned_dimensions_are_rejected() {
		Texture2d::new(
			10, 8, 1,
			SurfaceFormatType::Dxt1,
			BufferMode::NONE,
			BufferUsage::Default,
			false,
		);
	}

	#[test]
	fn identical_descriptions_share_a_key() {
		let make = || {
			let mut texture = Texture2d::new(
				64, 64, 1,
				SurfaceFormatType::R8G8B8A8,
				BufferMode::WRITE,
				BufferUsage::Default,
				true,
			);
			texture.freeze();
			texture
		};

		assert_eq!(make().shared_key(), make().shared_key());
	}
}
