use std::hash::Hasher;
use std::sync::Arc;

use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::buffer::{BufferMode, BufferUsage, ResourceBuffer};
use crate::device::entity::{EntityDesc, TerminalEntity};
use crate::device::geometry::vertex_declaration::VertexLayout;
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};
use crate::device::sharable::{DeviceResourceSharable, SharedKey};


/// Vertex stream storage; the stride comes from the bound vertex layout.
#[derive(Debug)]
pub struct VertexBuffer {
	resource: DeviceResourceBase,
	layout: Arc<VertexLayout>,
	buffer: ResourceBuffer,
}

impl VertexBuffer {
	pub fn new(
		layout: Arc<VertexLayout>,
		vertex_count: usize,
		mode: BufferMode,
		usage: BufferUsage,
		sharable: bool,
	) -> VertexBuffer {
		let stride = layout.size_in_bytes();
		assert!(stride > 0);

		VertexBuffer {
			resource: DeviceResourceBase::with_sharable(DeviceResourceType::Vertices, sharable),
			layout,
			buffer: ResourceBuffer::new(stride, vertex_count, mode, usage),
		}
	}

	pub fn resource_base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	pub fn resource_base_mut(&mut self) -> &mut DeviceResourceBase {
		&mut self.resource
	}

	pub fn layout(&self) -> &Arc<VertexLayout> {
		&self.layout
	}

	pub fn buffer(&self) -> &ResourceBuffer {
		&self.buffer
	}

	pub fn vertex_count(&self) -> usize {
		self.buffer.count()
	}

	pub fn vertex_size_in_bytes(&self) -> usize {
		self.buffer.stride()
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

	/// Only legal while no entity is attached.
	pub fn resize(&mut self, vertex_count: usize) {
		self.resource.check_thread_id();
		assert!(!self.resource.frozen());
		self.buffer.resize(vertex_count);
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

		let mut entity = device.create_vertex_buffer(self, initial_data)?;
		entity.attach_resource(&self.resource);
		self.buffer.create(&*device, entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());

		let mut entity = self.buffer.destroy(&*device);
		entity.detach_resource(&self.resource);
		device.destroy_vertex_buffer(self, entity)
	}

	pub fn get_data(
		&self,
		device: &mut dyn DeviceApiEncapsulator,
		first_vertex: usize,
		dst: &mut [u8],
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		self.buffer.get_data(device, first_vertex, dst)
	}

	pub fn set_data(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		first_vertex: usize,
		src: &[u8],
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		self.buffer.set_data(device, first_vertex, src)
	}

	pub fn copy_from(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		source: &VertexBuffer,
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		self.buffer.copy_from(device, &source.buffer)
	}

	pub fn copy_sub_part(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		dst_offset: usize,
		source: &VertexBuffer,
		src_offset: usize,
		length: usize,
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		self.buffer.copy_sub_part(device, dst_offset, &source.buffer, src_offset, length)
	}
}

impl DeviceResourceSharable for VertexBuffer {
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
