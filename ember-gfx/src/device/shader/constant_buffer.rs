use std::hash::Hasher;

use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::buffer::{BufferMode, BufferUsage, ResourceBuffer};
use crate::device::entity::{EntityDesc, TerminalEntity};
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};
use crate::device::sharable::{DeviceResourceSharable, SharedKey};
use crate::value::ValueBlock;


/// Constant blocks are uploaded in 16 byte registers.
const CONSTANT_REGISTER_SIZE: usize = 16;

/// One shader constant block: a field layout plus a single-element buffer
/// whose stride is the register-padded block size.
#[derive(Debug)]
pub struct ConstantBuffer {
	resource: DeviceResourceBase,
	layout: ValueBlock,
	buffer: ResourceBuffer,
}

impl ConstantBuffer {
	pub fn new(layout: ValueBlock, sharable: bool) -> ConstantBuffer {
		assert!(!layout.is_empty());

		let stride =
			layout.size_in_bytes().div_ceil(CONSTANT_REGISTER_SIZE) * CONSTANT_REGISTER_SIZE;

		ConstantBuffer {
			resource: DeviceResourceBase::with_sharable(DeviceResourceType::Constants, sharable),
			layout,
			buffer: ResourceBuffer::new(stride, 1, BufferMode::WRITE, BufferUsage::Default),
		}
	}

	pub fn resource_base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	pub fn resource_base_mut(&mut self) -> &mut DeviceResourceBase {
		&mut self.resource
	}

	pub fn layout(&self) -> &ValueBlock {
		&self.layout
	}

	pub fn buffer(&self) -> &ResourceBuffer {
		&self.buffer
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

	pub fn create(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(!self.available());

		let mut entity = device.create_constant_buffer(self)?;
		entity.attach_resource(&self.resource);
		self.buffer.create(&*device, entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());

		let mut entity = self.buffer.destroy(&*device);
		entity.detach_resource(&self.resource);
		device.destroy_constant_buffer(self, entity)
	}

	/// Uploads the whole register-padded block.
	pub fn set_data(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		src: &[u8],
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(src.len() == self.size_in_bytes());

		self.buffer.set_data(device, 0, src)
	}
}

impl DeviceResourceSharable for ConstantBuffer {
	fn base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	fn shared_key_hash(&self) -> u64 {
		let desc = self.buffer.entity_desc();
		let mut hasher = fnv::FnvHasher::default();
		hasher.write_u64(self.layout.layout_hash());
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
	use crate::name::Name;
	use crate::value::ValueType;

	#[test]
	fn block_size_pads_to_registers() {
		let mut layout = ValueBlock::new();
		layout.add_field(Name::new("World"), 0, ValueType::Float4x4, 0);
		layout.add_field(Name::new("Tint"), 0, ValueType::Float3, 64);

		let constants = ConstantBuffer::new(layout, false);
		// 76 bytes of fields pad up to 5 registers
		assert_eq!(constants.size_in_bytes(), 80);
	}
}
