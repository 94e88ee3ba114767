use std::sync::Arc;

use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::entity::TerminalEntity;
use crate::device::geometry::VertexLayout;
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};
use crate::device::shader::{ShaderProgram, ShaderProgramType, SHADER_PROGRAM_TYPE_COUNT};


/// Groups one program per stage slot around a common vertex layout.
/// Stages are wired before freeze; after freeze and destroy they can be
/// taken back out for individual disposal.
#[derive(Debug)]
pub struct ShaderEffect {
	resource: DeviceResourceBase,
	layout: Arc<VertexLayout>,
	stage_programs: [Option<ShaderProgram>; SHADER_PROGRAM_TYPE_COUNT],
	entity: Option<TerminalEntity>,
}

impl ShaderEffect {
	pub fn new(layout: Arc<VertexLayout>) -> ShaderEffect {
		ShaderEffect {
			resource: DeviceResourceBase::new(DeviceResourceType::ShaderEffect),
			layout,
			stage_programs: [None, None, None, None, None],
			entity: None,
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

	pub fn stage_program(&self, stage: ShaderProgramType) -> Option<&ShaderProgram> {
		self.stage_programs[stage as usize].as_ref()
	}

	/// Wires a program into its stage slot; the program's stage and vertex
	/// layout must agree with the effect.
	pub fn set_stage_program(&mut self, stage: ShaderProgramType, program: ShaderProgram) {
		self.resource.check_thread_id();
		assert!(!self.resource.frozen());
		assert!(program.program_type() == stage);
		assert!(program.layout().name() == self.layout.name());
		assert!(self.stage_programs[stage as usize].is_none());

		self.stage_programs[stage as usize] = Some(program);
	}

	/// Takes a stage program back out; only legal once the effect has been
	/// frozen and its device binding destroyed.
	pub fn reset_stage_program(&mut self, stage: ShaderProgramType) -> ShaderProgram {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(self.entity.is_none());

		self.stage_programs[stage as usize]
			.take()
			.expect("stage has no program to reset")
	}

	pub fn freeze(&mut self) {
		assert!(
			self.stage_programs.iter().any(Option::is_some),
			"an effect needs at least one stage program"
		);
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

		// Wired programs bind first
		for program in self.stage_programs.iter().flatten() {
			assert!(program.available(), "stage programs must be created before the effect");
		}

		let mut entity = device.create_shader_effect(self)?;
		assert!(entity.match_api(device.api()));
		entity.attach_resource(&self.resource);
		self.entity = Some(entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());

		let mut entity = self.entity.take().expect("shader effect is not available");
		entity.detach_resource(&self.resource);
		device.destroy_shader_effect(self, entity)
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::device::geometry::{VertexDeclaration, VertexSemantic};
	use crate::device::shader::{ShaderCompiled, ShaderProfileType};
	use crate::value::ValueType;

	fn test_layout() -> Arc<VertexLayout> {
		let mut declaration = VertexDeclaration::new();
		declaration.add_sub_part(&VertexSemantic::position(), 0, ValueType::Float3, 0);
		declaration.freeze();
		declaration.layout().clone()
	}

	fn test_program(layout: &Arc<VertexLayout>, stage: ShaderProgramType) -> ShaderProgram {
		let mut program = ShaderProgram::new(
			layout.clone(),
			stage,
			ShaderProfileType::ShaderModel5,
			Arc::new(ShaderCompiled::new(vec![0xAB; 8])),
			false,
		);
		program.freeze();
		program
	}

	#[test]
	fn stages_are_wired_before_freeze() {
		let layout = test_layout();
		let mut effect = ShaderEffect::new(layout.clone());

		effect.set_stage_program(
			ShaderProgramType::Vertex,
			test_program(&layout, ShaderProgramType::Vertex),
		);
		effect.set_stage_program(
			ShaderProgramType::Pixel,
			test_program(&layout, ShaderProgramType::Pixel),
		);
		effect.freeze();

		assert!(effect.stage_program(ShaderProgramType::Vertex).is_some());
		assert!(effect.stage_program(ShaderProgramType::Geometry).is_none());

		let vertex = effect.reset_stage_program(ShaderProgramType::Vertex);
		assert_eq!(vertex.program_type(), ShaderProgramType::Vertex);
	}

	#[test]
	#[should_panic]
	fn mismatched_stage_is_rejected() {
		let layout = test_layout();
		let mut effect = ShaderEffect::new(layout.clone());
		effect.set_stage_program(
			ShaderProgramType::Vertex,
			test_program(&layout, ShaderProgramType::Pixel),
		);
	}

	#[test]
	#[should_panic]
	fn freezing_an_empty_effect_is_rejected() {
		let mut effect = ShaderEffect::new(test_layout());
		effect.freeze();
	}
}
