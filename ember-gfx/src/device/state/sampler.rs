use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::entity::TerminalEntity;
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};


#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureFilter {
	Point = 0,
	Linear,
	Anisotropic,
	LinearMipPoint,
	PointMipLinear,
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureAddressMode {
	Wrap = 0,
	Clamp,
	Mirror,
	Border,
}


/// Texture sampling configuration for one sampler slot.
#[derive(Debug)]
pub struct SamplerState {
	resource: DeviceResourceBase,
	filter: TextureFilter,
	address_u: TextureAddressMode,
	address_v: TextureAddressMode,
	address_w: TextureAddressMode,
	mip_map_level_of_detail_bias: f32,
	max_anisotropy: u32,
	max_mip_level: u32,
	entity: Option<TerminalEntity>,
}

impl SamplerState {
	pub fn new() -> SamplerState {
		SamplerState {
			resource: DeviceResourceBase::new(DeviceResourceType::SamplerState),
			filter: TextureFilter::Linear,
			address_u: TextureAddressMode::Wrap,
			address_v: TextureAddressMode::Wrap,
			address_w: TextureAddressMode::Wrap,
			mip_map_level_of_detail_bias: 0.0,
			max_anisotropy: 4,
			max_mip_level: 0,
			entity: None,
		}
	}

	// Named presets

	pub fn point_clamp() -> SamplerState {
		let mut state = SamplerState::new();
		state.set_filter(TextureFilter::Point);
		state.set_address_modes(TextureAddressMode::Clamp);
		state
	}

	pub fn point_wrap() -> SamplerState {
		let mut state = SamplerState::new();
		state.set_filter(TextureFilter::Point);
		state
	}

	pub fn linear_clamp() -> SamplerState {
		let mut state = SamplerState::new();
		state.set_address_modes(TextureAddressMode::Clamp);
		state
	}

	pub fn linear_wrap() -> SamplerState {
		SamplerState::new()
	}

	pub fn anisotropic_clamp() -> SamplerState {
		let mut state = SamplerState::new();
		state.set_filter(TextureFilter::Anisotropic);
		state.set_address_modes(TextureAddressMode::Clamp);
		state
	}

	pub fn anisotropic_wrap() -> SamplerState {
		let mut state = SamplerState::new();
		state.set_filter(TextureFilter::Anisotropic);
		state
	}

	pub fn resource_base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	pub fn resource_base_mut(&mut self) -> &mut DeviceResourceBase {
		&mut self.resource
	}

	pub fn filter(&self) -> TextureFilter {
		self.filter
	}

	pub fn set_filter(&mut self, value: TextureFilter) {
		assert!(!self.resource.frozen());
		self.filter = value;
	}

	pub fn address_u(&self) -> TextureAddressMode {
		self.address_u
	}

	pub fn set_address_u(&mut self, value: TextureAddressMode) {
		assert!(!self.resource.frozen());
		self.address_u = value;
	}

	pub fn address_v(&self) -> TextureAddressMode {
		self.address_v
	}

	pub fn set_address_v(&mut self, value: TextureAddressMode) {
		assert!(!self.resource.frozen());
		self.address_v = value;
	}

	pub fn address_w(&self) -> TextureAddressMode {
		self.address_w
	}

	pub fn set_address_w(&mut self, value: TextureAddressMode) {
		assert!(!self.resource.frozen());
		self.address_w = value;
	}

	pub fn set_address_modes(&mut self, value: TextureAddressMode) {
		self.set_address_u(value);
		self.set_address_v(value);
		self.set_address_w(value);
	}

	pub fn mip_map_level_of_detail_bias(&self) -> f32 {
		self.mip_map_level_of_detail_bias
	}

	pub fn set_mip_map_level_of_detail_bias(&mut self, value: f32) {
		assert!(!self.resource.frozen());
		self.mip_map_level_of_detail_bias = value;
	}

	pub fn max_anisotropy(&self) -> u32 {
		self.max_anisotropy
	}

	pub fn set_max_anisotropy(&mut self, value: u32) {
		assert!(!self.resource.frozen());
		assert!(value > 0);
		self.max_anisotropy = value;
	}

	pub fn max_mip_level(&self) -> u32 {
		self.max_mip_level
	}

	pub fn set_max_mip_level(&mut self, value: u32) {
		assert!(!self.resource.frozen());
		self.max_mip_level = value;
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

		let mut entity = device.create_sampler_state(self)?;
		assert!(entity.match_api(device.api()));
		entity.attach_resource(&self.resource);
		self.entity = Some(entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());

		let mut entity = self.entity.take().expect("sampler state is not available");
		entity.detach_resource(&self.resource);
		device.destroy_sampler_state(self, entity)
	}
}

impl Default for SamplerState {
	fn default() -> SamplerState {
		SamplerState::new()
	}
}
