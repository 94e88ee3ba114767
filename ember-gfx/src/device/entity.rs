use std::any::Any;
use std::cell::Cell;

use crate::device::buffer::{BufferMode, BufferUsage};
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};
use crate::device::shader::{ShaderProfileType, ShaderProgramType};
use crate::device::{DeviceApi, DeviceRevision};
use crate::name::Name;
use crate::surface_format::SurfaceFormatType;


/// Unique per-device identity of a terminal entity, stable for the
/// entity's whole lifetime. Lets pool bookkeeping and tests recognize an
/// entity across ownership transfers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);


#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BufferEntityDesc {
	pub stride: u32,
	pub count: u32,
	pub mode: BufferMode,
	pub usage: BufferUsage,
}

impl BufferEntityDesc {
	pub fn size_in_bytes(&self) -> usize {
		self.stride as usize * self.count as usize
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureEntityDesc {
	pub format: SurfaceFormatType,
	pub mode: BufferMode,
	pub usage: BufferUsage,
	pub width: u32,
	pub height: u32,
	pub level_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderProgramEntityDesc {
	pub program_type: ShaderProgramType,
	pub profile_type: ShaderProfileType,
	pub declaration_name: Name,
	pub compiled_hash: u64,
}

/// Per-variant description of what a terminal entity stands for. This is
/// what pool matching compares; the backend payload stays opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityDesc {
	Buffer(BufferEntityDesc),
	Texture2d(TextureEntityDesc),
	TextureCube(TextureEntityDesc),
	VertexDeclaration,
	ShaderProgram(ShaderProgramEntityDesc),
	ShaderEffect,
	State,
}


/// Backend-owned data behind a terminal entity; the creating backend
/// downcasts it back to its concrete payload type.
pub trait EntityPayload: Any {
	fn as_any(&self) -> &dyn Any;
	fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Payload for entities that carry no backend state.
#[derive(Debug, Default)]
pub struct EmptyPayload;

impl EntityPayload for EmptyPayload {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}


const API_BITS: u32 = 3;
const API_MASK: u32 = (1 << API_BITS) - 1;

/// The backend handle a frozen resource description binds to when it
/// becomes available on a device. Owns the backend payload; the owning
/// resource is tracked as a plain attachment flag, cleared on detach.
pub struct TerminalEntity {
	id: EntityId,
	api_and_type: u32,
	desc: EntityDesc,
	video_memory_size: usize,
	created_at: DeviceRevision,
	last_used: Cell<DeviceRevision>,
	attached: bool,
	payload: Box<dyn EntityPayload>,
}

impl TerminalEntity {
	pub fn new(
		id: EntityId,
		api: DeviceApi,
		resource_type: DeviceResourceType,
		desc: EntityDesc,
		video_memory_size: usize,
		payload: Box<dyn EntityPayload>,
	) -> TerminalEntity {
		TerminalEntity {
			id,
			api_and_type: (api as u32) | ((resource_type as u32) << API_BITS),
			desc,
			video_memory_size,
			created_at: DeviceRevision::INVALID,
			last_used: Cell::new(DeviceRevision::INVALID),
			attached: false,
			payload,
		}
	}

	pub fn id(&self) -> EntityId {
		self.id
	}

	pub fn api(&self) -> DeviceApi {
		DeviceApi::from_u32(self.api_and_type & API_MASK)
	}

	pub fn resource_type(&self) -> DeviceResourceType {
		DeviceResourceType::from_u32(self.api_and_type >> API_BITS)
	}

	pub fn match_api(&self, api: DeviceApi) -> bool {
		self.api() == api
	}

	pub fn desc(&self) -> &EntityDesc {
		&self.desc
	}

	/// Constant over the entity's lifetime; drives pool byte accounting.
	pub fn video_memory_size_in_bytes(&self) -> usize {
		self.video_memory_size
	}

	pub fn payload(&self) -> &dyn EntityPayload {
		&*self.payload
	}

	pub fn payload_as<T: EntityPayload>(&self) -> Option<&T> {
		self.payload.as_any().downcast_ref()
	}

	pub fn payload_as_mut<T: EntityPayload>(&mut self) -> Option<&mut T> {
		self.payload.as_any_mut().downcast_mut()
	}

	pub fn is_attached(&self) -> bool {
		self.attached
	}

	pub fn attach_resource(&mut self, resource: &DeviceResourceBase) {
		assert!(resource.frozen());
		assert!(!self.attached);
		assert!(resource.resource_type() == self.resource_type());

		self.attached = true;
	}

	pub fn detach_resource(&mut self, resource: &DeviceResourceBase) {
		assert!(resource.frozen());
		assert!(self.attached);
		assert!(resource.resource_type() == self.resource_type());

		self.attached = false;
	}

	pub fn created_at(&self) -> DeviceRevision {
		self.created_at
	}

	/// Stamped once, from the backend create path. Pool-recycled entities
	/// keep their original creation revision.
	pub fn set_created_at(&mut self, revision: DeviceRevision) {
		assert!(!self.created_at.is_valid());
		assert!(revision.is_valid());
		self.created_at = revision;
	}

	pub fn last_used(&self) -> DeviceRevision {
		self.last_used.get()
	}

	/// Stamped on every bind through the device context; interior mutability
	/// because binds take the resource by shared reference.
	pub fn set_last_used(&self, revision: DeviceRevision) {
		assert!(self.attached);
		assert!(revision.is_valid());
		self.last_used.set(revision);
	}
}

impl std::fmt::Debug for TerminalEntity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TerminalEntity")
			.field("id", &self.id)
			.field("api", &self.api())
			.field("resource_type", &self.resource_type())
			.field("video_memory_size", &self.video_memory_size)
			.field("attached", &self.attached)
			.finish()
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn test_entity() -> TerminalEntity {
		TerminalEntity::new(
			EntityId(7),
			DeviceApi::Headless,
			DeviceResourceType::Vertices,
			EntityDesc::Buffer(BufferEntityDesc {
				stride: 16,
				count: 4,
				mode: BufferMode::WRITE,
				usage: BufferUsage::Default,
			}),
			64,
			Box::new(EmptyPayload),
		)
	}

	#[test]
	fn packed_api_and_type_unpack() {
		let entity = test_entity();
		assert_eq!(entity.api(), DeviceApi::Headless);
		assert_eq!(entity.resource_type(), DeviceResourceType::Vertices);
		assert!(entity.match_api(DeviceApi::Headless));
		assert!(!entity.match_api(DeviceApi::DirectX11));
	}

	#[test]
	fn attach_detach_track_the_owner() {
		let mut entity = test_entity();
		let mut base = DeviceResourceBase::new(DeviceResourceType::Vertices);
		base.freeze();

		assert!(!entity.is_attached());
		entity.attach_resource(&base);
		assert!(entity.is_attached());

		entity.set_created_at(DeviceRevision(0));
		entity.set_last_used(DeviceRevision(3));
		assert_eq!(entity.created_at(), DeviceRevision(0));
		assert_eq!(entity.last_used(), DeviceRevision(3));

		entity.detach_resource(&base);
		assert!(!entity.is_attached());
	}

	#[test]
	#[should_panic]
	fn attaching_to_an_unfrozen_resource_is_rejected() {
		let mut entity = test_entity();
		let base = DeviceResourceBase::new(DeviceResourceType::Vertices);
		entity.attach_resource(&base);
	}

	#[test]
	#[should_panic]
	fn attaching_across_resource_types_is_rejected() {
		let mut entity = test_entity();
		let mut base = DeviceResourceBase::new(DeviceResourceType::Indices);
		base.freeze();
		entity.attach_resource(&base);
	}
}
