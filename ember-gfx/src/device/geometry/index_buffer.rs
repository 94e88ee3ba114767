use std::hash::Hasher;

use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::buffer::{BufferMode, BufferUsage, ResourceBuffer};
use crate::device::entity::{EntityDesc, TerminalEntity};
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};
use crate::device::sharable::{DeviceResourceSharable, SharedKey};
use crate::value::ValueType;


/// Width of one index element.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IndexElementSize {
	SixteenBits = 2,
	ThirtyTwoBits = 4,
}

impl IndexElementSize {
	pub fn value_type(self) -> ValueType {
		match self {
			IndexElementSize::SixteenBits => ValueType::UShort,
			IndexElementSize::ThirtyTwoBits => ValueType::UWord,
		}
	}
}


#[derive(Debug)]
pub struct IndexBuffer {
	resource: DeviceResourceBase,
	element_size: IndexElementSize,
	buffer: ResourceBuffer,
}

impl IndexBuffer {
	pub fn new(
		element_size: IndexElementSize,
		index_count: usize,
		mode: BufferMode,
		usage: BufferUsage,
		sharable: bool,
	) -> IndexBuffer {
		IndexBuffer {
			resource: DeviceResourceBase::with_sharable(DeviceResourceType::Indices, sharable),
			element_size,
			buffer: ResourceBuffer::new(element_size as usize, index_count, mode, usage),
		}
	}

	pub fn resource_base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	pub fn resource_base_mut(&mut self) -> &mut DeviceResourceBase {
		&mut self.resource
	}

	pub fn element_size(&self) -> IndexElementSize {
		self.element_size
	}

	pub fn buffer(&self) -> &ResourceBuffer {
		&self.buffer
	}

	pub fn index_count(&self) -> usize {
		self.buffer.count()
	}

	pub fn size_in_bytes(&self) -> usize {
		self.buffer.size_in_bytes()
	}

	pub fn available(&self) -> bool {
		self.buffer.available()
	}

	pub fn terminal_entity(&self) -> Option<&TerminalEntity> {
		self.buffer.terminal_entity()
	}

	pub fn freeze(&mut self) {
		self.resource.freeze();

		if self.resource.sharable() {
			let key = SharedKey::make(self.resource.resource_type(), self.shared_key_hash());
			self.resource.set_shared_key(key);
		}
	}

	pub fn resize(&mut self, index_count: usize) {
		self.resource.check_thread_id();
		assert!(!self.resource.frozen());
		self.buffer.resize(index_count);
	}

	pub fn create(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(!self.available());

		if let Some(data) = initial_data {
			assert!(data.len() == self.size_in_bytes());
		}
		if self.buffer.usage() == BufferUsage::Immutable {
			assert!(initial_data.is_some(), "immutable buffers need complete initial data");
		}

		let mut entity = device.create_index_buffer(self, initial_data)?;
		entity.attach_resource(&self.resource);
		self.buffer.create(&*device, entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());

		let mut entity = self.buffer.destroy(&*device);
		entity.detach_resource(&self.resource);
		device.destroy_index_buffer(self, entity)
	}

	pub fn get_data(
		&self,
		device: &mut dyn DeviceApiEncapsulator,
		first_index: usize,
		dst: &mut [u8],
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		self.buffer.get_data(device, first_index, dst)
	}

	pub fn set_data(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		first_index: usize,
		src: &[u8],
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		self.buffer.set_data(device, first_index, src)
	}

	pub fn copy_from(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		source: &IndexBuffer,
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		self.buffer.copy_from(device, &source.buffer)
	}

	pub fn copy_sub_part(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		dst_offset: usize,
		source: &IndexBuffer,
		src_offset: usize,
		length: usize,
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		self.buffer.copy_sub_part(device, dst_offset, &source.buffer, src_offset, length)
	}
}

impl DeviceResourceSharable for IndexBuffer {
	fn base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	fn shared_key_hash(&self) -> u64 {
		let desc = self.buffer.entity_desc();
		let mut hasher = fnv::FnvHasher::default();
		hasher.write_u32(desc.stride);
		hasher.write_u32(desc.count);
		hasher.write_u32(desc.mode.bits());
		hasher.write_u32(desc.usage as u32);
		hasher.finish()
	}

	fn match_entity_desc(&self, entity: &TerminalEntity) -> bool {
		matches!(entity.desc(), EntityDesc::Buffer(desc) if *desc == self.buffer.entity_desc())
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn element_sizes_map_to_value_types() {
		assert_eq!(IndexElementSize::SixteenBits.value_type(), ValueType::UShort);
		assert_eq!(IndexElementSize::ThirtyTwoBits.value_type(), ValueType::UWord);
	}

	#[test]
	fn stride_follows_element_size() {
		let buffer = IndexBuffer::new(
			IndexElementSize::SixteenBits,
			12,
			BufferMode::NONE,
			BufferUsage::Default,
			false,
		);
		assert_eq!(buffer.size_in_bytes(), 24);
	}

	#[test]
	fn identical_descriptions_share_a_key() {
		let make = || {
			let mut buffer = IndexBuffer::new(
				IndexElementSize::ThirtyTwoBits,
				64,
				BufferMode::WRITE,
				BufferUsage::Dynamic,
				true,
			);
			buffer.freeze();
			buffer
		};

		assert_eq!(make().shared_key(), make().shared_key());
	}
}
