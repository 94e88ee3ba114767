use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::entity::TerminalEntity;
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};
use crate::device::state::CompareFunction;


#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StencilOperation {
	Keep = 0,
	Zero,
	Replace,
	Increment,
	Decrement,
	IncrementSaturation,
	DecrementSaturation,
	Invert,
}


/// Depth and stencil test configuration.
#[derive(Debug)]
pub struct DepthStencilState {
	resource: DeviceResourceBase,
	depth_buffer_enable: bool,
	depth_buffer_write_enable: bool,
	depth_buffer_function: CompareFunction,
	stencil_enable: bool,
	stencil_function: CompareFunction,
	stencil_pass: StencilOperation,
	stencil_fail: StencilOperation,
	stencil_depth_buffer_fail: StencilOperation,
	reference_stencil: u32,
	stencil_mask: u32,
	stencil_write_mask: u32,
	entity: Option<TerminalEntity>,
}

impl DepthStencilState {
	pub fn new() -> DepthStencilState {
		DepthStencilState {
			resource: DeviceResourceBase::new(DeviceResourceType::DepthStencilState),
			depth_buffer_enable: true,
			depth_buffer_write_enable: true,
			depth_buffer_function: CompareFunction::LessEqual,
			stencil_enable: false,
			stencil_function: CompareFunction::Always,
			stencil_pass: StencilOperation::Keep,
			stencil_fail: StencilOperation::Keep,
			stencil_depth_buffer_fail: StencilOperation::Keep,
			reference_stencil: 0,
			stencil_mask: u32::MAX,
			stencil_write_mask: u32::MAX,
			entity: None,
		}
	}

	// Named presets

	pub fn default_() -> DepthStencilState {
		DepthStencilState::new()
	}

	pub fn depth_read() -> DepthStencilState {
		let mut state = DepthStencilState::new();
		state.set_depth_buffer_write_enable(false);
		state
	}

	pub fn none() -> DepthStencilState {
		let mut state = DepthStencilState::new();
		state.set_depth_buffer_enable(false);
		state.set_depth_buffer_write_enable(false);
		state
	}

	pub fn resource_base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	pub fn resource_base_mut(&mut self) -> &mut DeviceResourceBase {
		&mut self.resource
	}

	pub fn depth_buffer_enable(&self) -> bool {
		self.depth_buffer_enable
	}

	pub fn set_depth_buffer_enable(&mut self, value: bool) {
		assert!(!self.resource.frozen());
		self.depth_buffer_enable = value;
	}

	pub fn depth_buffer_write_enable(&self) -> bool {
		self.depth_buffer_write_enable
	}

	pub fn set_depth_buffer_write_enable(&mut self, value: bool) {
		assert!(!self.resource.frozen());
		self.depth_buffer_write_enable = value;
	}

	pub fn depth_buffer_function(&self) -> CompareFunction {
		self.depth_buffer_function
	}

	pub fn set_depth_buffer_function(&mut self, value: CompareFunction) {
		assert!(!self.resource.frozen());
		self.depth_buffer_function = value;
	}

	pub fn stencil_enable(&self) -> bool {
		self.stencil_enable
	}

	pub fn set_stencil_enable(&mut self, value: bool) {
		assert!(!self.resource.frozen());
		self.stencil_enable = value;
	}

	pub fn stencil_function(&self) -> CompareFunction {
		self.stencil_function
	}

	pub fn set_stencil_function(&mut self, value: CompareFunction) {
		assert!(!self.resource.frozen());
		self.stencil_function = value;
	}

	pub fn stencil_pass(&self) -> StencilOperation {
		self.stencil_pass
	}

	pub fn set_stencil_pass(&mut self, value: StencilOperation) {
		assert!(!self.resource.frozen());
		self.stencil_pass = value;
	}

	pub fn stencil_fail(&self) -> StencilOperation {
		self.stencil_fail
	}

	pub fn set_stencil_fail(&mut self, value: StencilOperation) {
		assert!(!self.resource.frozen());
		self.stencil_fail = value;
	}

	pub fn stencil_depth_buffer_fail(&self) -> StencilOperation {
		self.stencil_depth_buffer_fail
	}

	pub fn set_stencil_depth_buffer_fail(&mut self, value: StencilOperation) {
		assert!(!self.resource.frozen());
		self.stencil_depth_buffer_fail = value;
	}

	pub fn reference_stencil(&self) -> u32 {
		self.reference_stencil
	}

	pub fn set_reference_stencil(&mut self, value: u32) {
		assert!(!self.resource.frozen());
		self.reference_stencil = value;
	}

	pub fn stencil_mask(&self) -> u32 {
		self.stencil_mask
	}

	pub fn set_stencil_mask(&mut self, value: u32) {
		assert!(!self.resource.frozen());
		self.stencil_mask = value;
	}

	pub fn stencil_write_mask(&self) -> u32 {
		self.stencil_write_mask
	}

	pub fn set_stencil_write_mask(&mut self, value: u32) {
		assert!(!self.resource.frozen());
		self.stencil_write_mask = value;
	}

	pub fn freeze(&mut self) {
		self.resource.freeze();
	}

	pub fn available(&self) -> bool {
		self.entity.is_some()
	}

	pub fn terminal_entity(&self) -> Option<&TerminalEntity> {
		self.entity.as_ref()
	}

	pub fn create(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(self.entity.is_none());

		let mut entity = device.create_depth_stencil_state(self)?;
		assert!(entity.match_api(device.api()));
		entity.attach_resource(&self.resource);
		self.entity = Some(entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());

		let mut entity = self.entity.take().expect("depth stencil state is not available");
		entity.detach_resource(&self.resource);
		device.destroy_depth_stencil_state(self, entity)
	}
}

impl Default for DepthStencilState {
	fn default() -> DepthStencilState {
		DepthStencilState::new()
	}
}
