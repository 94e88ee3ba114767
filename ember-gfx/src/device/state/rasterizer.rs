use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::entity::TerminalEntity;
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};


#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CullMode {
	None = 0,
	Clockwise,
	CounterClockwise,
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FillMode {
	Solid = 0,
	WireFrame,
}


/// Rasterizer stage configuration.
#[derive(Debug)]
pub struct RasterizerState {
	resource: DeviceResourceBase,
	cull_mode: CullMode,
	fill_mode: FillMode,
	depth_bias: f32,
	slope_scale_depth_bias: f32,
	multi_sample_anti_alias: bool,
	scissor_test_enable: bool,
	entity: Option<TerminalEntity>,
}

impl RasterizerState {
	pub fn new() -> RasterizerState {
		RasterizerState {
			resource: DeviceResourceBase::new(DeviceResourceType::RasterizerState),
			cull_mode: CullMode::CounterClockwise,
			fill_mode: FillMode::Solid,
			depth_bias: 0.0,
			slope_scale_depth_bias: 0.0,
			multi_sample_anti_alias: true,
			scissor_test_enable: false,
			entity: None,
		}
	}

	// Named presets

	pub fn cull_none() -> RasterizerState {
		let mut state = RasterizerState::new();
		state.set_cull_mode(CullMode::None);
		state
	}

	pub fn cull_clockwise() -> RasterizerState {
		let mut state = RasterizerState::new();
		state.set_cull_mode(CullMode::Clockwise);
		state
	}

	pub fn cull_counter_clockwise() -> RasterizerState {
		RasterizerState::new()
	}

	pub fn wireframe() -> RasterizerState {
		let mut state = RasterizerState::new();
		state.set_cull_mode(CullMode::None);
		state.set_fill_mode(FillMode::WireFrame);
		state
	}

	pub fn resource_base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	pub fn resource_base_mut(&mut self) -> &mut DeviceResourceBase {
		&mut self.resource
	}

	pub fn cull_mode(&self) -> CullMode {
		self.cull_mode
	}

	pub fn set_cull_mode(&mut self, value: CullMode) {
		assert!(!self.resource.frozen());
		self.cull_mode = value;
	}

	pub fn fill_mode(&self) -> FillMode {
		self.fill_mode
	}

	pub fn set_fill_mode(&mut self, value: FillMode) {
		assert!(!self.resource.frozen());
		self.fill_mode = value;
	}

	pub fn depth_bias(&self) -> f32 {
		self.depth_bias
	}

	pub fn set_depth_bias(&mut self, value: f32) {
		assert!(!self.resource.frozen());
		self.depth_bias = value;
	}

	pub fn slope_scale_depth_bias(&self) -> f32 {
		self.slope_scale_depth_bias
	}

	pub fn set_slope_scale_depth_bias(&mut self, value: f32) {
		assert!(!self.resource.frozen());
		self.slope_scale_depth_bias = value;
	}

	pub fn multi_sample_anti_alias(&self) -> bool {
		self.multi_sample_anti_alias
	}

	pub fn set_multi_sample_anti_alias(&mut self, value: bool) {
		assert!(!self.resource.frozen());
		self.multi_sample_anti_alias = value;
	}

	pub fn scissor_test_enable(&self) -> bool {
		self.scissor_test_enable
	}

	pub fn set_scissor_test_enable(&mut self, value: bool) {
		assert!(!self.resource.frozen());
		self.scissor_test_enable = value;
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

		let mut entity = device.create_rasterizer_state(self)?;
		assert!(entity.match_api(device.api()));
		entity.attach_resource(&self.resource);
		self.entity = Some(entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());

		let mut entity = self.entity.take().expect("rasterizer state is not available");
		entity.detach_resource(&self.resource);
		device.destroy_rasterizer_state(self, entity)
	}
}

impl Default for RasterizerState {
	fn default() -> RasterizerState {
		RasterizerState::new()
	}
}
