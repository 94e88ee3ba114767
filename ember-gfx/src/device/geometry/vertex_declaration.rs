use std::fmt::Write as _;
use std::sync::Arc;

use fnv::FnvHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::entity::TerminalEntity;
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};
use crate::name::Name;
use crate::value::{ValueBlock, ValueField, ValueType};


pub const MAX_VERTEX_SUB_PART_COUNT: usize = 6;


/// Semantic tag of one vertex field. The well-known tags cover everything
/// the engine's standard shaders consume; `custom` exists for tool-side
/// streams.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexSemantic(Name);

impl VertexSemantic {
	pub fn position() -> VertexSemantic {
		VertexSemantic(Name::new("Position"))
	}

	pub fn tex_coord() -> VertexSemantic {
		VertexSemantic(Name::new("TexCoord"))
	}

	pub fn color() -> VertexSemantic {
		VertexSemantic(Name::new("Color"))
	}

	pub fn normal() -> VertexSemantic {
		VertexSemantic(Name::new("Normal"))
	}

	pub fn tangent() -> VertexSemantic {
		VertexSemantic(Name::new("Tangent"))
	}

	pub fn binormal() -> VertexSemantic {
		VertexSemantic(Name::new("Binormal"))
	}

	pub fn custom(name: &str) -> VertexSemantic {
		VertexSemantic(Name::new(name))
	}

	pub fn name(&self) -> &Name {
		&self.0
	}

	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}
}


/// Immutable snapshot of a frozen declaration: the canonical name plus the
/// field list. This is what the process-wide registry stores and what
/// vertex buffers and shader programs reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
	name: Name,
	block: ValueBlock,
}

impl VertexLayout {
	pub fn name(&self) -> &Name {
		&self.name
	}

	pub fn block(&self) -> &ValueBlock {
		&self.block
	}

	pub fn fields(&self) -> &[ValueField] {
		self.block.fields()
	}

	pub fn size_in_bytes(&self) -> usize {
		self.block.size_in_bytes()
	}
}


static REGISTRY: Lazy<RwLock<FnvHashMap<Name, Arc<VertexLayout>>>> =
	Lazy::new(|| RwLock::new(FnvHashMap::default()));

/// Looks up a layout previously registered by freezing a declaration.
pub fn registered_vertex_layout(name: &Name) -> Option<Arc<VertexLayout>> {
	REGISTRY.read().get(name).cloned()
}

pub fn registered_vertex_layout_count() -> usize {
	REGISTRY.read().len()
}

/// Drops every registered layout; part of process shutdown.
pub fn clear_vertex_layout_registry() {
	REGISTRY.write().clear();
}

fn register_vertex_layout(layout: VertexLayout) -> Arc<VertexLayout> {
	let mut registry = REGISTRY.write();

	if let Some(existing) = registry.get(&layout.name) {
		// The canonical name is a function of the field list, so a hit must
		// describe the same layout.
		assert!(existing.block == layout.block);
		return existing.clone();
	}

	let layout = Arc::new(layout);
	registry.insert(layout.name.clone(), layout.clone());
	layout
}


/// Ordered set of vertex fields plus the optional device binding. Fields
/// are appended while unfrozen; freezing computes the canonical name and
/// publishes the layout in the registry.
#[derive(Debug)]
pub struct VertexDeclaration {
	resource: DeviceResourceBase,
	block: ValueBlock,
	layout: Option<Arc<VertexLayout>>,
	entity: Option<TerminalEntity>,
}

impl VertexDeclaration {
	pub fn new() -> VertexDeclaration {
		VertexDeclaration {
			resource: DeviceResourceBase::new(DeviceResourceType::VertexDeclaration),
			block: ValueBlock::new(),
			layout: None,
			entity: None,
		}
	}

	pub fn resource_base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	pub fn resource_base_mut(&mut self) -> &mut DeviceResourceBase {
		&mut self.resource
	}

	pub fn len(&self) -> usize {
		self.block.len()
	}

	pub fn is_empty(&self) -> bool {
		self.block.is_empty()
	}

	pub fn size_in_bytes(&self) -> usize {
		self.block.size_in_bytes()
	}

	pub fn block(&self) -> &ValueBlock {
		&self.block
	}

	pub fn sub_parts(&self) -> &[ValueField] {
		self.block.fields()
	}

	/// Appends a field. Offsets are dword aligned and at most
	/// [`MAX_VERTEX_SUB_PART_COUNT`] fields fit one declaration.
	pub fn add_sub_part(
		&mut self,
		semantic: &VertexSemantic,
		index: u32,
		value_type: ValueType,
		offset: u32,
	) {
		self.resource.check_thread_id();
		assert!(!self.resource.frozen());
		assert!(self.block.len() < MAX_VERTEX_SUB_PART_COUNT);
		assert!(offset % 4 == 0, "vertex field offsets must be dword aligned");

		self.block.add_field(semantic.name().clone(), index, value_type, offset);
	}

	pub fn sub_part_by_index(&self, index: usize) -> &ValueField {
		self.block.field_by_index(index)
	}

	pub fn sub_part_by_semantic_ifp(
		&self,
		semantic: &VertexSemantic,
		index: u32,
	) -> Option<&ValueField> {
		self.block.field_by_name_ifp(semantic.name(), index)
	}

	pub fn sub_part_by_semantic(&self, semantic: &VertexSemantic, index: u32) -> &ValueField {
		self.block.field_by_name(semantic.name(), index)
	}

	/// Copies one vertex field by field; used when no format narrowing is
	/// needed.
	pub fn copy_vertex(&self, dst: &mut [u8], src: &[u8]) {
		assert!(self.resource.frozen());
		self.block.copy_record(dst, src);
	}

	fn compute_canonical_name(&self) -> Name {
		assert!(!self.block.is_empty());

		let mut name = String::from("Vertex");
		for field in self.block.fields() {
			let _ = write!(
				name,
				"__{}{}_{}",
				field.name.as_str(),
				field.index,
				field.value_type.name()
			);
		}

		Name::from(name)
	}

	/// Latches the declaration, derives its canonical name and registers
	/// the layout process-wide.
	pub fn freeze(&mut self) {
		self.resource.freeze();

		let layout = register_vertex_layout(VertexLayout {
			name: self.compute_canonical_name(),
			block: self.block.clone(),
		});
		self.layout = Some(layout);
	}

	pub fn canonical_name(&self) -> &Name {
		assert!(self.resource.frozen());
		self.layout.as_ref().unwrap().name()
	}

	pub fn layout(&self) -> &Arc<VertexLayout> {
		assert!(self.resource.frozen());
		self.layout.as_ref().unwrap()
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

		let mut entity = device.create_vertex_declaration(self)?;
		entity.attach_resource(&self.resource);
		self.entity = Some(entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());

		let mut entity = self.entity.take().expect("vertex declaration is not available");
		entity.detach_resource(&self.resource);
		device.destroy_vertex_declaration(self, entity)
	}
}

impl Default for VertexDeclaration {
	fn default() -> VertexDeclaration {
		VertexDeclaration::new()
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn position_color_declaration() -> VertexDeclaration {
		let mut declaration = VertexDeclaration::new();
		declaration.add_sub_part(&VertexSemantic::position(), 0, ValueType::Float3, 0);
		declaration.add_sub_part(&VertexSemantic::color(), 0, ValueType::UByte4N, 12);
		declaration
	}

	#[test]
	fn canonical_name_concatenates_fields() {
		let mut declaration = position_color_declaration();
		declaration.freeze();
		assert_eq!(
			declaration.canonical_name().as_str(),
			"Vertex__Position0_Float3__Color0_UByte4N"
		);
	}

	#[test]
	fn identical_field_lists_share_one_registered_layout() {
		let mut a = position_color_declaration();
		let mut b = position_color_declaration();
		a.freeze();
		b.freeze();

		assert_eq!(a.canonical_name(), b.canonical_name());
		assert!(Arc::ptr_eq(a.layout(), b.layout()));

		let looked_up = registered_vertex_layout(a.canonical_name()).expect("registered");
		assert!(Arc::ptr_eq(&looked_up, a.layout()));
	}

	#[test]
	fn semantic_lookup_distinguishes_index() {
		let mut declaration = VertexDeclaration::new();
		declaration.add_sub_part(&VertexSemantic::tex_coord(), 0, ValueType::Float2, 0);
		declaration.add_sub_part(&VertexSemantic::tex_coord(), 1, ValueType::Half2, 8);
		declaration.freeze();

		assert_eq!(
			declaration.sub_part_by_semantic(&VertexSemantic::tex_coord(), 1).value_type,
			ValueType::Half2
		);
		assert!(declaration
			.sub_part_by_semantic_ifp(&VertexSemantic::tex_coord(), 2)
			.is_none());
	}

	#[test]
	fn copy_vertex_moves_every_field() {
		let mut declaration = position_color_declaration();
		declaration.freeze();

		let src: Vec<u8> = (0..16).collect();
		let mut dst = vec![0u8; 16];
		declaration.copy_vertex(&mut dst, &src);
		assert_eq!(dst, src);
	}

	#[test]
	#[should_panic]
	fn unaligned_offsets_are_rejected() {
		let mut declaration = VertexDeclaration::new();
		declaration.add_sub_part(&VertexSemantic::position(), 0, ValueType::Float3, 2);
	}

	#[test]
	#[should_panic]
	fn adding_fields_after_freeze_is_rejected() {
		let mut declaration = position_color_declaration();
		declaration.freeze();
		declaration.add_sub_part(&VertexSemantic::normal(), 0, ValueType::Float3, 16);
	}

	#[test]
	#[should_panic]
	fn more_than_six_fields_are_rejected() {
		let mut declaration = VertexDeclaration::new();
		for i in 0..7 {
			declaration.add_sub_part(
				&VertexSemantic::tex_coord(),
				i,
				ValueType::Float2,
				i * 8,
			);
		}
	}
}
