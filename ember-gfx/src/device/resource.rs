use crate::device::sharable::SharedKey;
use crate::thread_bound::ThreadBound;


#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeviceResourceType {
	Constants = 0,
	Indices,
	RenderTarget,
	DepthStencil,
	ShaderEffect,
	ShaderProgram,
	BlendState,
	RasterizerState,
	DepthStencilState,
	SamplerState,
	Texture2d,
	TextureCube,
	VertexDeclaration,
	Vertices,
}

pub const DEVICE_RESOURCE_TYPE_COUNT: usize = 14;

impl DeviceResourceType {
	pub fn as_str(self) -> &'static str {
		match self {
			DeviceResourceType::Constants => "Constants",
			DeviceResourceType::Indices => "Indices",
			DeviceResourceType::RenderTarget => "RenderTarget",
			DeviceResourceType::DepthStencil => "DepthStencil",
			DeviceResourceType::ShaderEffect => "ShaderEffect",
			DeviceResourceType::ShaderProgram => "ShaderProgram",
			DeviceResourceType::BlendState => "BlendState",
			DeviceResourceType::RasterizerState => "RasterizerState",
			DeviceResourceType::DepthStencilState => "DepthStencilState",
			DeviceResourceType::SamplerState => "SamplerState",
			DeviceResourceType::Texture2d => "Texture2D",
			DeviceResourceType::TextureCube => "TextureCube",
			DeviceResourceType::VertexDeclaration => "VertexDeclaration",
			DeviceResourceType::Vertices => "Vertices",
		}
	}

	pub(crate) fn from_u32(value: u32) -> DeviceResourceType {
		use DeviceResourceType as R;

		match value {
			0 => R::Constants,
			1 => R::Indices,
			2 => R::RenderTarget,
			3 => R::DepthStencil,
			4 => R::ShaderEffect,
			5 => R::ShaderProgram,
			6 => R::BlendState,
			7 => R::RasterizerState,
			8 => R::DepthStencilState,
			9 => R::SamplerState,
			10 => R::Texture2d,
			11 => R::TextureCube,
			12 => R::VertexDeclaration,
			13 => R::Vertices,
			_ => panic!("invalid device resource type tag {value}"),
		}
	}
}


// The freeze and sharable bits share one word with the resource type to
// keep per-resource overhead small.
const FROZEN_BIT: u32 = 1 << 0;
const SHARABLE_BIT: u32 = 1 << 1;
const TYPE_SHIFT: u32 = 2;

/// State every device resource embeds: the freeze latch, the resource-type
/// tag, thread affinity, the shared-pool key and an optional debug name.
///
/// A resource description is mutable until [`freeze`](Self::freeze) latches
/// it; only a frozen description may be bound to a device. Every public
/// operation on the embedding resource must go through
/// [`check_thread_id`](Self::check_thread_id).
#[derive(Debug)]
pub struct DeviceResourceBase {
	flags_and_type: u32,
	shared_key: SharedKey,
	thread: ThreadBound,
	name: Option<String>,
}

impl DeviceResourceBase {
	pub fn new(resource_type: DeviceResourceType) -> DeviceResourceBase {
		DeviceResourceBase::with_sharable(resource_type, false)
	}

	pub fn with_sharable(resource_type: DeviceResourceType, sharable: bool) -> DeviceResourceBase {
		let mut flags_and_type = (resource_type as u32) << TYPE_SHIFT;
		if sharable {
			flags_and_type |= SHARABLE_BIT;
		}

		DeviceResourceBase {
			flags_and_type,
			shared_key: SharedKey::INVALID,
			thread: ThreadBound::new(),
			name: None,
		}
	}

	pub fn resource_type(&self) -> DeviceResourceType {
		DeviceResourceType::from_u32(self.flags_and_type >> TYPE_SHIFT)
	}

	pub fn frozen(&self) -> bool {
		self.flags_and_type & FROZEN_BIT != 0
	}

	pub fn sharable(&self) -> bool {
		self.flags_and_type & SHARABLE_BIT != 0
	}

	pub fn owned_by_this_thread(&self) -> bool {
		self.thread.owned_by_this_thread()
	}

	#[track_caller]
	pub fn check_thread_id(&self) {
		self.thread.check_thread_id();
	}

	/// Latches the description. Freezing twice is a programmer error.
	pub fn freeze(&mut self) {
		self.check_thread_id();
		assert!(!self.frozen(), "resource already frozen");
		self.flags_and_type |= FROZEN_BIT;
	}

	/// Reverts the latch; only needed for teardown corner cases where a
	/// description is rebuilt in place.
	pub fn unfreeze(&mut self) {
		self.check_thread_id();
		assert!(self.frozen(), "resource not frozen");
		self.flags_and_type &= !FROZEN_BIT;
		self.shared_key = SharedKey::INVALID;
	}

	pub fn shared_key(&self) -> SharedKey {
		assert!(self.frozen());
		assert!(self.sharable());
		assert!(self.shared_key.is_valid());
		self.shared_key
	}

	pub(crate) fn set_shared_key(&mut self, key: SharedKey) {
		assert!(self.frozen());
		assert!(self.sharable());
		assert!(key.is_valid());
		assert!(key.resource_type() == self.resource_type());
		self.shared_key = key;
	}

	pub fn resource_name(&self) -> Option<&str> {
		self.thread.check_thread_id();
		self.name.as_deref()
	}

	pub fn set_resource_name(&mut self, name: impl Into<String>) {
		self.check_thread_id();
		assert!(!self.frozen());

		let name = name.into();
		assert!(!name.is_empty());
		self.name = Some(name);
	}
}


/// Device lifecycle hooks a resource implements to rebuild or drop its
/// terminal entity across device transitions. The owner wires these to the
/// encapsulator's lifecycle events; the public entry points re-check
/// thread affinity before dispatching to the `*_impl` hooks.
pub trait DeviceResourceLifecycle {
	fn lifecycle_base(&self) -> &DeviceResourceBase;

	fn on_device_create(&mut self) {
		self.lifecycle_base().check_thread_id();
		self.on_device_create_impl();
	}

	fn on_device_reset(&mut self) {
		self.lifecycle_base().check_thread_id();
		self.on_device_reset_impl();
	}

	fn on_device_lost(&mut self) {
		self.lifecycle_base().check_thread_id();
		self.on_device_lost_impl();
	}

	fn on_device_destroy(&mut self) {
		self.lifecycle_base().check_thread_id();
		self.on_device_destroy_impl();
	}

	fn on_device_create_impl(&mut self) {}
	fn on_device_reset_impl(&mut self) {}
	fn on_device_lost_impl(&mut self) {}
	fn on_device_destroy_impl(&mut self) {}
}
