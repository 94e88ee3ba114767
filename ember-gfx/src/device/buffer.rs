use bitflags::bitflags;

use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::entity::{BufferEntityDesc, EntityDesc, TerminalEntity};


bitflags! {
	/// CPU access requested for a buffer or texture.
	#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
	pub struct BufferMode: u32 {
		const READ = 1 << 0;
		const WRITE = 1 << 1;
		const DISCARD = 1 << 2;
		const DO_NOT_WAIT = 1 << 3;

		const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
		const WRITE_DISCARD = Self::WRITE.bits() | Self::DISCARD.bits();
		const WRITE_NO_OVERWRITE = Self::WRITE.bits() | Self::DO_NOT_WAIT.bits();
	}
}

impl BufferMode {
	pub const NONE: BufferMode = BufferMode::empty();
}

/// Expected update cadence, mirroring the driver-side placement hints:
/// - `Default`: the CPU updates the resource less than once per frame
/// - `Immutable`: the CPU never updates the resource after creation
/// - `Dynamic`: the CPU updates the resource more than once per frame
/// - `Staging`: the CPU needs to read the resource back
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferUsage {
	Default = 0,
	Immutable,
	Dynamic,
	Staging,
}

/// The mode x usage matrix: which CPU access patterns each usage accepts.
pub fn buffer_mode_allowed_for_usage(mode: BufferMode, usage: BufferUsage) -> bool {
	match usage {
		BufferUsage::Default => mode == BufferMode::NONE || mode == BufferMode::WRITE,
		BufferUsage::Immutable => mode == BufferMode::NONE,
		BufferUsage::Dynamic => {
			mode == BufferMode::WRITE
				|| mode == BufferMode::WRITE_DISCARD
				|| mode == BufferMode::WRITE_NO_OVERWRITE
		}
		BufferUsage::Staging => {
			mode == BufferMode::WRITE || mode == BufferMode::READ || mode == BufferMode::READ_WRITE
		}
	}
}

/// How a CPU write reaches the backend resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UpdateRoute {
	UpdateSubresource,
	MapDiscard,
	MapNoOverwrite,
	MapWrite,
}


// Packed stride + mode + usage word
const USAGE_BITS: u32 = 2;
const MODE_BITS: u32 = 4;
const MODE_SHIFT: u32 = USAGE_BITS;
const STRIDE_SHIFT: u32 = USAGE_BITS + MODE_BITS;
const USAGE_MASK: u32 = (1 << USAGE_BITS) - 1;
const MODE_MASK: u32 = (1 << MODE_BITS) - 1;
const MAX_STRIDE: u32 = (1 << (32 - STRIDE_SHIFT)) - 1;

fn usage_from_u32(value: u32) -> BufferUsage {
	match value {
		0 => BufferUsage::Default,
		1 => BufferUsage::Immutable,
		2 => BufferUsage::Dynamic,
		3 => BufferUsage::Staging,
		_ => unreachable!(),
	}
}


/// Element-addressed storage behind every buffer flavor: `count` elements
/// of `stride` bytes plus the optional terminal entity the description is
/// bound to. The mode x usage matrix is enforced at construction.
#[derive(Debug)]
pub struct ResourceBuffer {
	count: u32,
	stride_mode_usage: u32,
	entity: Option<TerminalEntity>,
}

impl ResourceBuffer {
	pub fn new(stride: usize, count: usize, mode: BufferMode, usage: BufferUsage) -> ResourceBuffer {
		assert!(stride > 0);
		assert!(stride as u32 <= MAX_STRIDE);
		assert!(
			buffer_mode_allowed_for_usage(mode, usage),
			"buffer mode {mode:?} is not allowed for usage {usage:?}"
		);

		let stride_mode_usage =
			usage as u32 | (mode.bits() << MODE_SHIFT) | ((stride as u32) << STRIDE_SHIFT);

		ResourceBuffer {
			count: count as u32,
			stride_mode_usage,
			entity: None,
		}
	}

	pub fn count(&self) -> usize {
		self.count as usize
	}

	pub fn stride(&self) -> usize {
		(self.stride_mode_usage >> STRIDE_SHIFT) as usize
	}

	pub fn size_in_bytes(&self) -> usize {
		self.stride() * self.count()
	}

	pub fn mode(&self) -> BufferMode {
		BufferMode::from_bits_truncate((self.stride_mode_usage >> MODE_SHIFT) & MODE_MASK)
	}

	pub fn usage(&self) -> BufferUsage {
		usage_from_u32(self.stride_mode_usage & USAGE_MASK)
	}

	pub fn available(&self) -> bool {
		self.entity.is_some()
	}

	pub fn terminal_entity(&self) -> Option<&TerminalEntity> {
		self.entity.as_ref()
	}

	pub fn entity_desc(&self) -> BufferEntityDesc {
		BufferEntityDesc {
			stride: self.stride() as u32,
			count: self.count,
			mode: self.mode(),
			usage: self.usage(),
		}
	}

	/// Only legal while no entity is attached.
	pub fn resize(&mut self, count: usize) {
		assert!(self.entity.is_none());
		self.count = count as u32;
	}

	/// Takes exclusive ownership of a freshly created (or pool-recycled)
	/// entity that describes exactly this buffer.
	pub fn create(&mut self, device: &dyn DeviceApiEncapsulator, entity: TerminalEntity) {
		assert!(self.entity.is_none());
		assert!(entity.match_api(device.api()));
		assert!(
			matches!(entity.desc(), EntityDesc::Buffer(desc) if *desc == self.entity_desc()),
			"entity description does not match the buffer"
		);

		self.entity = Some(entity);
	}

	/// Yields the entity back for backend disposal or pool parking.
	pub fn destroy(&mut self, device: &dyn DeviceApiEncapsulator) -> TerminalEntity {
		let entity = self.entity.take().expect("destroying a buffer with no entity");
		assert!(entity.match_api(device.api()));
		entity
	}

	/// Which path a CPU write takes for this buffer's usage and mode.
	pub fn update_route(&self) -> UpdateRoute {
		match self.usage() {
			BufferUsage::Default => UpdateRoute::UpdateSubresource,
			BufferUsage::Dynamic => {
				if self.mode() == BufferMode::WRITE_NO_OVERWRITE {
					UpdateRoute::MapNoOverwrite
				} else {
					UpdateRoute::MapDiscard
				}
			}
			BufferUsage::Staging => UpdateRoute::MapWrite,
			BufferUsage::Immutable => panic!("immutable buffers cannot be written"),
		}
	}

	/// Reads `dst.len()` bytes starting at element `offset`. Read-back is
	/// only permitted from staging buffers with read access.
	pub fn get_data(
		&self,
		device: &mut dyn DeviceApiEncapsulator,
		offset: usize,
		dst: &mut [u8],
	) -> DeviceResult<()> {
		assert!(!dst.is_empty());
		assert!(dst.len() % self.stride() == 0);
		assert!(offset + dst.len() / self.stride() <= self.count());
		assert!(self.usage() == BufferUsage::Staging);
		assert!(self.mode().contains(BufferMode::READ));

		let entity = self.entity.as_ref().expect("buffer is not available");
		device.buffer_get_data(entity, offset * self.stride(), dst)
	}

	/// Writes `src` starting at element `offset`, routed per usage.
	pub fn set_data(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		offset: usize,
		src: &[u8],
	) -> DeviceResult<()> {
		assert!(!src.is_empty());
		assert!(src.len() % self.stride() == 0);
		assert!(offset + src.len() / self.stride() <= self.count());
		assert!(self.mode().contains(BufferMode::WRITE));

		let route = self.update_route();
		let offset_in_bytes = offset * self.stride();

		let entity = self.entity.as_mut().expect("buffer is not available");
		device.buffer_set_data(entity, offset_in_bytes, src, route)
	}

	/// Whole-resource copy; sizes must agree exactly.
	pub fn copy_from(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		source: &ResourceBuffer,
	) -> DeviceResult<()> {
		assert!(source.available());
		assert!(source.size_in_bytes() == self.size_in_bytes());

		let dst = self.entity.as_mut().expect("buffer is not available");
		device.buffer_copy(dst, source.terminal_entity().unwrap())
	}

	/// Byte-range copy between two buffers.
	pub fn copy_sub_part(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		dst_offset: usize,
		source: &ResourceBuffer,
		src_offset: usize,
		length: usize,
	) -> DeviceResult<()> {
		assert!(length > 0);
		assert!(source.available());
		assert!(src_offset + length <= source.size_in_bytes());
		assert!(dst_offset + length <= self.size_in_bytes());

		let dst = self.entity.as_mut().expect("buffer is not available");
		device.buffer_copy_sub_part(dst, dst_offset, source.terminal_entity().unwrap(), src_offset, length)
	}
}

impl Drop for ResourceBuffer {
	fn drop(&mut self) {
		if !std::thread::panicking() {
			debug_assert!(
				self.entity.is_none(),
				"buffer dropped while still bound to a device"
			);
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mode_usage_matrix() {
		use BufferMode as M;
		use BufferUsage as U;

		let allowed = [
			(M::NONE, U::Default),
			(M::WRITE, U::Default),
			(M::NONE, U::Immutable),
			(M::WRITE, U::Dynamic),
			(M::WRITE_DISCARD, U::Dynamic),
			(M::WRITE_NO_OVERWRITE, U::Dynamic),
			(M::WRITE, U::Staging),
			(M::READ, U::Staging),
			(M::READ_WRITE, U::Staging),
		];

		for usage in [U::Default, U::Immutable, U::Dynamic, U::Staging] {
			for mode in [
				M::NONE, M::READ, M::WRITE, M::READ_WRITE,
				M::WRITE_DISCARD, M::WRITE_NO_OVERWRITE,
			] {
				let expected = allowed.contains(&(mode, usage));
				assert_eq!(
					buffer_mode_allowed_for_usage(mode, usage),
					expected,
					"mode {mode:?} usage {usage:?}"
				);
			}
		}
	}

	#[test]
	fn allowed_pairs_construct() {
		let buffer = ResourceBuffer::new(16, 256, BufferMode::WRITE, BufferUsage::Dynamic);
		assert_eq!(buffer.stride(), 16);
		assert_eq!(buffer.count(), 256);
		assert_eq!(buffer.size_in_bytes(), 4096);
		assert_eq!(buffer.mode(), BufferMode::WRITE);
		assert_eq!(buffer.usage(), BufferUsage::Dynamic);
		assert!(!buffer.available());
	}

	#[test]
	#[should_panic]
	fn disallowed_pair_is_rejected() {
		ResourceBuffer::new(16, 256, BufferMode::READ, BufferUsage::Default);
	}

	#[test]
	#[should_panic]
	fn immutable_buffers_reject_write_access() {
		ResourceBuffer::new(4, 4, BufferMode::WRITE, BufferUsage::Immutable);
	}

	#[test]
	fn update_routes_follow_usage_and_mode() {
		let default_ = ResourceBuffer::new(4, 4, BufferMode::WRITE, BufferUsage::Default);
		assert_eq!(default_.update_route(), UpdateRoute::UpdateSubresource);

		let dynamic = ResourceBuffer::new(4, 4, BufferMode::WRITE_DISCARD, BufferUsage::Dynamic);
		assert_eq!(dynamic.update_route(), UpdateRoute::MapDiscard);

		let no_overwrite =
			ResourceBuffer::new(4, 4, BufferMode::WRITE_NO_OVERWRITE, BufferUsage::Dynamic);
		assert_eq!(no_overwrite.update_route(), UpdateRoute::MapNoOverwrite);

		let staging = ResourceBuffer::new(4, 4, BufferMode::READ_WRITE, BufferUsage::Staging);
		assert_eq!(staging.update_route(), UpdateRoute::MapWrite);
	}

	#[test]
	fn resize_without_entity_adjusts_size() {
		let mut buffer = ResourceBuffer::new(8, 8, BufferMode::NONE, BufferUsage::Default);
		buffer.resize(32);
		assert_eq!(buffer.size_in_bytes(), 256);
	}
}
