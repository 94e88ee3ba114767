use bitflags::bitflags;
use glam::Vec4;

use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::entity::TerminalEntity;
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};


#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Blend {
	Zero = 0,
	One,
	SourceColor,
	InverseSourceColor,
	SourceAlpha,
	InverseSourceAlpha,
	DestinationAlpha,
	InverseDestinationAlpha,
	DestinationColor,
	InverseDestinationColor,
	SourceAlphaSaturation,
	BlendFactor,
	InverseBlendFactor,
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFunction {
	Add = 0,
	Max,
	Min,
	ReverseSubtract,
	Subtract,
}

bitflags! {
	#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
	pub struct ColorChannels: u32 {
		const RED = 1 << 0;
		const GREEN = 1 << 1;
		const BLUE = 1 << 2;
		const ALPHA = 1 << 3;
		const ALL = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
	}
}


/// Output-merger blend configuration.
#[derive(Debug)]
pub struct BlendState {
	resource: DeviceResourceBase,
	blend_enabled: bool,
	blend_factor: Vec4,
	alpha_blend_function: BlendFunction,
	alpha_source_blend: Blend,
	alpha_destination_blend: Blend,
	color_blend_function: BlendFunction,
	color_source_blend: Blend,
	color_destination_blend: Blend,
	color_write_channels: ColorChannels,
	multi_sample_mask: u32,
	entity: Option<TerminalEntity>,
}

impl BlendState {
	pub fn new() -> BlendState {
		BlendState {
			resource: DeviceResourceBase::new(DeviceResourceType::BlendState),
			blend_enabled: false,
			blend_factor: Vec4::ONE,
			alpha_blend_function: BlendFunction::Add,
			alpha_source_blend: Blend::One,
			alpha_destination_blend: Blend::One,
			color_blend_function: BlendFunction::Add,
			color_source_blend: Blend::One,
			color_destination_blend: Blend::One,
			color_write_channels: ColorChannels::ALL,
			multi_sample_mask: u32::MAX,
			entity: None,
		}
	}

	// Named presets

	pub fn opaque() -> BlendState {
		let mut state = BlendState::new();
		state.set_color_source_blend(Blend::One);
		state.set_color_destination_blend(Blend::Zero);
		state.set_alpha_source_blend(Blend::One);
		state.set_alpha_destination_blend(Blend::Zero);
		state
	}

	pub fn additive() -> BlendState {
		let mut state = BlendState::new();
		state.set_blend_enabled(true);
		state.set_color_source_blend(Blend::SourceAlpha);
		state.set_color_destination_blend(Blend::One);
		state.set_alpha_source_blend(Blend::SourceAlpha);
		state.set_alpha_destination_blend(Blend::One);
		state
	}

	pub fn alpha_blend() -> BlendState {
		let mut state = BlendState::new();
		state.set_blend_enabled(true);
		state.set_color_source_blend(Blend::One);
		state.set_color_destination_blend(Blend::InverseSourceAlpha);
		state.set_alpha_source_blend(Blend::One);
		state.set_alpha_destination_blend(Blend::InverseSourceAlpha);
		state
	}

	pub fn non_premultiplied() -> BlendState {
		let mut state = BlendState::new();
		state.set_blend_enabled(true);
		state.set_color_source_blend(Blend::SourceAlpha);
		state.set_color_destination_blend(Blend::InverseSourceAlpha);
		state.set_alpha_source_blend(Blend::SourceAlpha);
		state.set_alpha_destination_blend(Blend::InverseSourceAlpha);
		state
	}

	pub fn resource_base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	pub fn resource_base_mut(&mut self) -> &mut DeviceResourceBase {
		&mut self.resource
	}

	pub fn blend_enabled(&self) -> bool {
		self.blend_enabled
	}

	pub fn set_blend_enabled(&mut self, value: bool) {
		assert!(!self.resource.frozen());
		self.blend_enabled = value;
	}

	pub fn blend_factor(&self) -> Vec4 {
		self.blend_factor
	}

	pub fn set_blend_factor(&mut self, value: Vec4) {
		assert!(!self.resource.frozen());
		self.blend_factor = value;
	}

	pub fn alpha_blend_function(&self) -> BlendFunction {
		self.alpha_blend_function
	}

	pub fn set_alpha_blend_function(&mut self, value: BlendFunction) {
		assert!(!self.resource.frozen());
		self.alpha_blend_function = value;
	}

	pub fn alpha_source_blend(&self) -> Blend {
		self.alpha_source_blend
	}

	pub fn set_alpha_source_blend(&mut self, value: Blend) {
		assert!(!self.resource.frozen());
		self.alpha_source_blend = value;
	}

	pub fn alpha_destination_blend(&self) -> Blend {
		self.alpha_destination_blend
	}

	pub fn set_alpha_destination_blend(&mut self, value: Blend) {
		assert!(!self.resource.frozen());
		self.alpha_destination_blend = value;
	}

	pub fn color_blend_function(&self) -> BlendFunction {
		self.color_blend_function
	}

	pub fn set_color_blend_function(&mut self, value: BlendFunction) {
		assert!(!self.resource.frozen());
		self.color_blend_function = value;
	}

	pub fn color_source_blend(&self) -> Blend {
		self.color_source_blend
	}

	pub fn set_color_source_blend(&mut self, value: Blend) {
		assert!(!self.resource.frozen());
		self.color_source_blend = value;
	}

	pub fn color_destination_blend(&self) -> Blend {
		self.color_destination_blend
	}

	pub fn set_color_destination_blend(&mut self, value: Blend) {
		assert!(!self.resource.frozen());
		self.color_destination_blend = value;
	}

	pub fn color_write_channels(&self) -> ColorChannels {
		self.color_write_channels
	}

	pub fn set_color_write_channels(&mut self, value: ColorChannels) {
		assert!(!self.resource.frozen());
		self.color_write_channels = value;
	}

	pub fn multi_sample_mask(&self) -> u32 {
		self.multi_sample_mask
	}

	pub fn set_multi_sample_mask(&mut self, value: u32) {
		assert!(!self.resource.frozen());
		self.multi_sample_mask = value;
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

		let mut entity = device.create_blend_state(self)?;
		assert!(entity.match_api(device.api()));
		entity.attach_resource(&self.resource);
		self.entity = Some(entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());

		let mut entity = self.entity.take().expect("blend state is not available");
		entity.detach_resource(&self.resource);
		device.destroy_blend_state(self, entity)
	}
}

impl Default for BlendState {
	fn default() -> BlendState {
		BlendState::new()
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn presets_configure_the_blend_pair() {
		let additive = BlendState::additive();
		assert!(additive.blend_enabled());
		assert_eq!(additive.color_destination_blend(), Blend::One);

		let opaque = BlendState::opaque();
		assert!(!opaque.blend_enabled());
		assert_eq!(opaque.color_destination_blend(), Blend::Zero);
	}

	#[test]
	#[should_panic]
	fn mutating_a_frozen_state_is_rejected() {
		let mut state = BlendState::new();
		state.freeze();
		state.set_blend_enabled(true);
	}
}
