use std::hash::Hasher;
use std::sync::Arc;

use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::entity::{EntityDesc, ShaderProgramEntityDesc, TerminalEntity};
use crate::device::geometry::VertexLayout;
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};
use crate::device::shader::{ShaderCompiled, ShaderProfileType, ShaderProgramType};
use crate::device::sharable::{DeviceResourceSharable, SharedKey};


// Stage and profile packed into one word
const PROGRAM_BITS: u32 = 3;
const PROGRAM_MASK: u32 = (1 << PROGRAM_BITS) - 1;

/// One compiled stage program bound to a vertex layout; sharable by the
/// (layout, stage, profile, blob) tuple.
#[derive(Debug)]
pub struct ShaderProgram {
	resource: DeviceResourceBase,
	layout: Arc<VertexLayout>,
	program_and_profile: u32,
	compiled: Arc<ShaderCompiled>,
	entity: Option<TerminalEntity>,
}

impl ShaderProgram {
	pub fn new(
		layout: Arc<VertexLayout>,
		program_type: ShaderProgramType,
		profile_type: ShaderProfileType,
		compiled: Arc<ShaderCompiled>,
		sharable: bool,
	) -> ShaderProgram {
		ShaderProgram {
			resource: DeviceResourceBase::with_sharable(
				DeviceResourceType::ShaderProgram,
				sharable,
			),
			layout,
			program_and_profile: program_type as u32 | ((profile_type as u32) << PROGRAM_BITS),
			compiled,
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

	pub fn program_type(&self) -> ShaderProgramType {
		match self.program_and_profile & PROGRAM_MASK {
			0 => ShaderProgramType::Vertex,
			1 => ShaderProgramType::Hull,
			2 => ShaderProgramType::Domain,
			3 => ShaderProgramType::Geometry,
			4 => ShaderProgramType::Pixel,
			_ => unreachable!(),
		}
	}

	pub fn profile_type(&self) -> ShaderProfileType {
		match self.program_and_profile >> PROGRAM_BITS {
			0 => ShaderProfileType::ShaderModel4,
			1 => ShaderProfileType::ShaderModel4_1,
			2 => ShaderProfileType::ShaderModel5,
			_ => unreachable!(),
		}
	}

	pub fn compiled(&self) -> &Arc<ShaderCompiled> {
		&self.compiled
	}

	pub fn entity_desc(&self) -> ShaderProgramEntityDesc {
		ShaderProgramEntityDesc {
			program_type: self.program_type(),
			profile_type: self.profile_type(),
			declaration_name: self.layout.name().clone(),
			compiled_hash: self.compiled.hash(),
		}
	}

	pub fn freeze(&mut self) {
		self.resource.freeze();

		if self.resource.sharable() {
			let key = SharedKey::make(self.resource.resource_type(), self.shared_key_hash());
			self.resource.set_shared_key(key);
		}
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

		let mut entity = device.create_shader_program(self)?;
		assert!(entity.match_api(device.api()));
		entity.attach_resource(&self.resource);
		self.entity = Some(entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());

		let mut entity = self.entity.take().expect("shader program is not available");
		entity.detach_resource(&self.resource);
		device.destroy_shader_program(self, entity)
	}
}

impl DeviceResourceSharable for ShaderProgram {
	fn base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	fn shared_key_hash(&self) -> u64 {
		let desc = self.entity_desc();
		let mut hasher = fnv::FnvHasher::default();
		hasher.write_u32(desc.program_type as u32);
		hasher.write_u32(desc.profile_type as u32);
		hasher.write(desc.declaration_name.as_str().as_bytes());
		hasher.write_u64(desc.compiled_hash);
		hasher.finish()
	}

	fn match_entity_desc(&self, entity: &TerminalEntity) -> bool {
		matches!(entity.desc(), EntityDesc::ShaderProgram(desc) if *desc == self.entity_desc())
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::device::geometry::{VertexDeclaration, VertexSemantic};
	use crate::value::ValueType;

	fn test_layout() -> Arc<VertexLayout> {
		let mut declaration = VertexDeclaration::new();
		declaration.add_sub_part(&VertexSemantic::position(), 0, ValueType::Float3, 0);
		declaration.freeze();
		declaration.layout().clone()
	}

	#[test]
	fn packed_stage_and_profile_unpack() {
		let program = ShaderProgram::new(
			test_layout(),
			ShaderProgramType::Pixel,
			ShaderProfileType::ShaderModel5,
			Arc::new(ShaderCompiled::new(vec![1, 2, 3])),
			true,
		);

		assert_eq!(program.program_type(), ShaderProgramType::Pixel);
		assert_eq!(program.profile_type(), ShaderProfileType::ShaderModel5);
	}

	#[test]
	fn key_is_a_function_of_the_full_tuple() {
		let compiled = Arc::new(ShaderCompiled::new(vec![1, 2, 3]));
		let make = |stage, blob: &Arc<ShaderCompiled>| {
			let mut program = ShaderProgram::new(
				test_layout(),
				stage,
				ShaderProfileType::ShaderModel5,
				blob.clone(),
				true,
			);
			program.freeze();
			program
		};

		let a = make(ShaderProgramType::Vertex, &compiled);
		let b = make(ShaderProgramType::Vertex, &compiled);
		let c = make(ShaderProgramType::Pixel, &compiled);
		let d = make(
			ShaderProgramType::Vertex,
			&Arc::new(ShaderCompiled::new(vec![4, 5, 6])),
		);

		assert_eq!(a.shared_key(), b.shared_key());
		assert_ne!(a.shared_key(), c.shared_key());
		assert_ne!(a.shared_key(), d.shared_key());
	}
}
