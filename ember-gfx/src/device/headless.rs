use std::any::Any;

use glam::{UVec2, Vec4};
use tracing::debug;

use crate::device::backend::{
	ClearOptions, DeviceApiBackend, DeviceApiContext, DeviceApiEncapsulator,
	DeviceApiShaderCompiler, DeviceResult, ShaderCompileError,
};
use crate::device::buffer::UpdateRoute;
use crate::device::entity::{
	BufferEntityDesc, EmptyPayload, EntityDesc, EntityId, EntityPayload, TerminalEntity,
	TextureEntityDesc,
};
use crate::device::geometry::{IndexBuffer, PrimitiveType, VertexBuffer, VertexDeclaration};
use crate::device::presentation::{PresentationParameters, Viewport};
use crate::device::resource::DeviceResourceType;
use crate::device::shader::{
	ConstantBuffer, ShaderCompiled, ShaderEffect, ShaderProfileType, ShaderProgram,
	ShaderProgramType, ShaderSource,
};
use crate::device::state::{BlendState, DepthStencilState, RasterizerState, SamplerState};
use crate::device::texture::{
	Aabb2u, DepthStencil, RenderTarget, Texture, Texture2d, TextureCube, CUBE_FACE_COUNT,
};
use crate::device::{DeviceApi, DeviceApiBackendStats};
use crate::surface_format::{SurfaceFormat, SurfaceFormatSupport};


/// CPU-side buffer storage.
#[derive(Debug)]
pub struct HeadlessBufferPayload {
	pub bytes: Vec<u8>,
}

impl EntityPayload for HeadlessBufferPayload {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}

/// CPU-side texture storage: the packed face-major mip chain.
#[derive(Debug)]
pub struct HeadlessTexturePayload {
	pub bytes: Vec<u8>,
}

impl EntityPayload for HeadlessTexturePayload {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}


fn texture_entity_desc(entity: &TerminalEntity) -> (TextureEntityDesc, u32) {
	match entity.desc() {
		EntityDesc::Texture2d(desc) => (*desc, 1),
		EntityDesc::TextureCube(desc) => (*desc, CUBE_FACE_COUNT as u32),
		_ => panic!("entity is not a texture"),
	}
}

/// Byte offset and dimensions of one sub-resource in the packed layout.
fn sub_resource_layout(desc: &TextureEntityDesc, face_count: u32, sub_resource: u32) -> (usize, u32, u32) {
	assert!(sub_resource < desc.level_count * face_count);

	let format = SurfaceFormat::from_type(desc.format);
	let face = sub_resource / desc.level_count;
	let level = sub_resource % desc.level_count;

	let face_size =
		format.size_of_texture_2d_mip_chain_in_bytes(desc.width, desc.height, desc.level_count);

	let mut offset = face as usize * face_size;
	for l in 0..level {
		let level_width = (desc.width >> l).max(1);
		let level_height = (desc.height >> l).max(1);
		offset += format.size_of_texture_2d_in_bytes(level_width, level_height);
	}

	let width = (desc.width >> level).max(1);
	let height = (desc.height >> level).max(1);
	(offset, width, height)
}


/// Reference backend that implements the whole device contract against CPU
/// memory. Draw calls only validate and count; resource data paths move
/// real bytes, which is what resource lifecycle tests exercise.
pub struct HeadlessBackend {
	parameters: PresentationParameters,
	viewport: Viewport,
	entity_counter: u64,
	back_buffer: RenderTarget,
	depth_buffer: DepthStencil,
	stats: DeviceApiBackendStats,
}

impl HeadlessBackend {
	pub fn new(parameters: PresentationParameters) -> HeadlessBackend {
		// Capability probing: everything works against CPU memory.
		for format in SurfaceFormat::all_formats() {
			format.set_support(SurfaceFormatSupport::ALL);
		}

		let mut entity_counter = 0;
		let (back_buffer, depth_buffer) =
			HeadlessBackend::make_back_buffers(&parameters, &mut entity_counter);

		HeadlessBackend {
			viewport: parameters.viewport(),
			parameters,
			entity_counter,
			back_buffer,
			depth_buffer,
			stats: DeviceApiBackendStats::default(),
		}
	}

	pub fn stats(&self) -> &DeviceApiBackendStats {
		&self.stats
	}

	fn make_back_buffers(
		parameters: &PresentationParameters,
		entity_counter: &mut u64,
	) -> (RenderTarget, DepthStencil) {
		use crate::device::buffer::{BufferMode, BufferUsage};

		let width = parameters.back_buffer_width();
		let height = parameters.back_buffer_height();

		let mut back_buffer = RenderTarget::new(
			width,
			height,
			parameters.back_buffer_format(),
			BufferMode::NONE,
			BufferUsage::Default,
			false,
		);
		back_buffer.resource_base_mut().set_resource_name("back buffer");
		back_buffer.freeze();

		let entity = make_texture_entity(
			entity_counter,
			DeviceResourceType::RenderTarget,
			EntityDesc::Texture2d(back_buffer.entity_desc()),
			1,
			None,
		);
		back_buffer.attach_created_entity(DeviceApi::Headless, entity);

		let mut depth_buffer = DepthStencil::new(
			width,
			height,
			parameters.depth_stencil_format(),
			BufferMode::NONE,
			BufferUsage::Default,
			false,
		);
		depth_buffer.resource_base_mut().set_resource_name("back buffer depth");
		depth_buffer.freeze();

		let entity = make_texture_entity(
			entity_counter,
			DeviceResourceType::DepthStencil,
			EntityDesc::Texture2d(depth_buffer.entity_desc()),
			1,
			None,
		);
		depth_buffer.attach_created_entity(DeviceApi::Headless, entity);

		(back_buffer, depth_buffer)
	}

	fn next_entity_id(&mut self) -> EntityId {
		self.entity_counter += 1;
		EntityId(self.entity_counter)
	}

	fn make_buffer_entity(
		&mut self,
		resource_type: DeviceResourceType,
		desc: BufferEntityDesc,
		initial_data: Option<&[u8]>,
	) -> TerminalEntity {
		let size = desc.size_in_bytes();

		let mut bytes = vec![0u8; size];
		if let Some(data) = initial_data {
			assert!(data.len() == size);
			bytes.copy_from_slice(data);
		}

		TerminalEntity::new(
			self.next_entity_id(),
			DeviceApi::Headless,
			resource_type,
			EntityDesc::Buffer(desc),
			size,
			Box::new(HeadlessBufferPayload { bytes }),
		)
	}
}

fn make_texture_entity(
	entity_counter: &mut u64,
	resource_type: DeviceResourceType,
	desc: EntityDesc,
	face_count: u32,
	initial_data: Option<&[u8]>,
) -> TerminalEntity {
	let texture_desc = match &desc {
		EntityDesc::Texture2d(d) | EntityDesc::TextureCube(d) => *d,
		_ => panic!("not a texture description"),
	};

	let format = SurfaceFormat::from_type(texture_desc.format);
	let size = format.size_of_texture_2d_mip_chain_in_bytes(
		texture_desc.width,
		texture_desc.height,
		texture_desc.level_count,
	) * face_count as usize;

	let mut bytes = vec![0u8; size];
	if let Some(data) = initial_data {
		assert!(data.len() == size);
		bytes.copy_from_slice(data);
	}

	*entity_counter += 1;
	TerminalEntity::new(
		EntityId(*entity_counter),
		DeviceApi::Headless,
		resource_type,
		desc,
		size,
		Box::new(HeadlessTexturePayload { bytes }),
	)
}

fn buffer_payload(entity: &TerminalEntity) -> &HeadlessBufferPayload {
	entity.payload_as().expect("entity was not created by the headless backend")
}

fn buffer_payload_mut(entity: &mut TerminalEntity) -> &mut HeadlessBufferPayload {
	entity.payload_as_mut().expect("entity was not created by the headless backend")
}

fn texture_payload(entity: &TerminalEntity) -> &HeadlessTexturePayload {
	entity.payload_as().expect("entity was not created by the headless backend")
}

fn texture_payload_mut(entity: &mut TerminalEntity) -> &mut HeadlessTexturePayload {
	entity.payload_as_mut().expect("entity was not created by the headless backend")
}

impl DeviceApiEncapsulator for HeadlessBackend {
	fn api(&self) -> DeviceApi {
		DeviceApi::Headless
	}

	fn set_viewport(&mut self, viewport: Viewport) {
		self.viewport = viewport;
	}

	fn set_viewports(&mut self, viewports: &[Viewport]) {
		assert!(!viewports.is_empty());
		self.viewport = viewports[0];
	}

	fn create_index_buffer(
		&mut self,
		index_buffer: &IndexBuffer,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity> {
		Ok(self.make_buffer_entity(
			DeviceResourceType::Indices,
			index_buffer.buffer().entity_desc(),
			initial_data,
		))
	}

	fn destroy_index_buffer(
		&mut self,
		_index_buffer: &IndexBuffer,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn create_vertex_buffer(
		&mut self,
		vertex_buffer: &VertexBuffer,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity> {
		Ok(self.make_buffer_entity(
			DeviceResourceType::Vertices,
			vertex_buffer.buffer().entity_desc(),
			initial_data,
		))
	}

	fn destroy_vertex_buffer(
		&mut self,
		_vertex_buffer: &VertexBuffer,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn buffer_get_data(
		&mut self,
		entity: &TerminalEntity,
		offset: usize,
		dst: &mut [u8],
	) -> DeviceResult<()> {
		let payload = buffer_payload(entity);
		assert!(offset + dst.len() <= payload.bytes.len());
		dst.copy_from_slice(&payload.bytes[offset..offset + dst.len()]);
		Ok(())
	}

	fn buffer_set_data(
		&mut self,
		entity: &mut TerminalEntity,
		offset: usize,
		src: &[u8],
		_route: UpdateRoute,
	) -> DeviceResult<()> {
		let payload = buffer_payload_mut(entity);
		assert!(offset + src.len() <= payload.bytes.len());
		payload.bytes[offset..offset + src.len()].copy_from_slice(src);
		Ok(())
	}

	fn buffer_copy(&mut self, dst: &mut TerminalEntity, src: &TerminalEntity) -> DeviceResult<()> {
		let src_bytes = buffer_payload(src).bytes.clone();
		let dst_payload = buffer_payload_mut(dst);
		assert!(dst_payload.bytes.len() == src_bytes.len());
		dst_payload.bytes = src_bytes;
		Ok(())
	}

	fn buffer_copy_sub_part(
		&mut self,
		dst: &mut TerminalEntity,
		dst_offset: usize,
		src: &TerminalEntity,
		src_offset: usize,
		length: usize,
	) -> DeviceResult<()> {
		let src_payload = buffer_payload(src);
		assert!(src_offset + length <= src_payload.bytes.len());
		let chunk = src_payload.bytes[src_offset..src_offset + length].to_vec();

		let dst_payload = buffer_payload_mut(dst);
		assert!(dst_offset + length <= dst_payload.bytes.len());
		dst_payload.bytes[dst_offset..dst_offset + length].copy_from_slice(&chunk);
		Ok(())
	}

	fn create_vertex_declaration(
		&mut self,
		declaration: &VertexDeclaration,
	) -> DeviceResult<TerminalEntity> {
		assert!(!declaration.is_empty());

		Ok(TerminalEntity::new(
			self.next_entity_id(),
			DeviceApi::Headless,
			DeviceResourceType::VertexDeclaration,
			EntityDesc::VertexDeclaration,
			0,
			Box::new(EmptyPayload),
		))
	}

	fn destroy_vertex_declaration(
		&mut self,
		_declaration: &VertexDeclaration,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn create_constant_buffer(
		&mut self,
		constant_buffer: &ConstantBuffer,
	) -> DeviceResult<TerminalEntity> {
		Ok(self.make_buffer_entity(
			DeviceResourceType::Constants,
			constant_buffer.buffer().entity_desc(),
			None,
		))
	}

	fn destroy_constant_buffer(
		&mut self,
		_constant_buffer: &ConstantBuffer,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn create_shader_program(&mut self, program: &ShaderProgram) -> DeviceResult<TerminalEntity> {
		Ok(TerminalEntity::new(
			self.next_entity_id(),
			DeviceApi::Headless,
			DeviceResourceType::ShaderProgram,
			EntityDesc::ShaderProgram(program.entity_desc()),
			program.compiled().size_in_bytes(),
			Box::new(EmptyPayload),
		))
	}

	fn destroy_shader_program(
		&mut self,
		_program: &ShaderProgram,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn create_shader_effect(&mut self, _effect: &ShaderEffect) -> DeviceResult<TerminalEntity> {
		Ok(TerminalEntity::new(
			self.next_entity_id(),
			DeviceApi::Headless,
			DeviceResourceType::ShaderEffect,
			EntityDesc::ShaderEffect,
			0,
			Box::new(EmptyPayload),
		))
	}

	fn destroy_shader_effect(
		&mut self,
		_effect: &ShaderEffect,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn create_blend_state(&mut self, _state: &BlendState) -> DeviceResult<TerminalEntity> {
		Ok(self.make_state_entity(DeviceResourceType::BlendState))
	}

	fn destroy_blend_state(
		&mut self,
		_state: &BlendState,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn create_rasterizer_state(&mut self, _state: &RasterizerState) -> DeviceResult<TerminalEntity> {
		Ok(self.make_state_entity(DeviceResourceType::RasterizerState))
	}

	fn destroy_rasterizer_state(
		&mut self,
		_state: &RasterizerState,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn create_depth_stencil_state(
		&mut self,
		_state: &DepthStencilState,
	) -> DeviceResult<TerminalEntity> {
		Ok(self.make_state_entity(DeviceResourceType::DepthStencilState))
	}

	fn destroy_depth_stencil_state(
		&mut self,
		_state: &DepthStencilState,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn create_sampler_state(&mut self, _state: &SamplerState) -> DeviceResult<TerminalEntity> {
		Ok(self.make_state_entity(DeviceResourceType::SamplerState))
	}

	fn destroy_sampler_state(
		&mut self,
		_state: &SamplerState,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn create_texture_2d(
		&mut self,
		texture: &Texture2d,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity> {
		Ok(make_texture_entity(
			&mut self.entity_counter,
			texture.resource_base().resource_type(),
			EntityDesc::Texture2d(texture.entity_desc()),
			1,
			initial_data,
		))
	}

	fn destroy_texture_2d(
		&mut self,
		_texture: &Texture2d,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn create_texture_cube(
		&mut self,
		texture: &TextureCube,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity> {
		Ok(make_texture_entity(
			&mut self.entity_counter,
			DeviceResourceType::TextureCube,
			EntityDesc::TextureCube(texture.entity_desc()),
			CUBE_FACE_COUNT as u32,
			initial_data,
		))
	}

	fn destroy_texture_cube(
		&mut self,
		_texture: &TextureCube,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn create_render_target(
		&mut self,
		render_target: &RenderTarget,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity> {
		Ok(make_texture_entity(
			&mut self.entity_counter,
			DeviceResourceType::RenderTarget,
			EntityDesc::Texture2d(render_target.entity_desc()),
			1,
			initial_data,
		))
	}

	fn destroy_render_target(
		&mut self,
		_render_target: &RenderTarget,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn create_depth_stencil(
		&mut self,
		depth_stencil: &DepthStencil,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity> {
		Ok(make_texture_entity(
			&mut self.entity_counter,
			DeviceResourceType::DepthStencil,
			EntityDesc::Texture2d(depth_stencil.entity_desc()),
			1,
			initial_data,
		))
	}

	fn destroy_depth_stencil(
		&mut self,
		_depth_stencil: &DepthStencil,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		debug_assert!(!entity.is_attached());
		Ok(())
	}

	fn texture_get_data(
		&mut self,
		entity: &TerminalEntity,
		offset: usize,
		dst: &mut [u8],
	) -> DeviceResult<()> {
		let payload = texture_payload(entity);
		assert!(offset + dst.len() <= payload.bytes.len());
		dst.copy_from_slice(&payload.bytes[offset..offset + dst.len()]);
		Ok(())
	}

	fn texture_set_data(
		&mut self,
		entity: &mut TerminalEntity,
		offset: usize,
		src: &[u8],
	) -> DeviceResult<()> {
		let payload = texture_payload_mut(entity);
		assert!(offset + src.len() <= payload.bytes.len());
		payload.bytes[offset..offset + src.len()].copy_from_slice(src);
		Ok(())
	}

	fn texture_copy(&mut self, dst: &mut TerminalEntity, src: &TerminalEntity) -> DeviceResult<()> {
		let src_bytes = texture_payload(src).bytes.clone();
		let dst_payload = texture_payload_mut(dst);
		assert!(dst_payload.bytes.len() == src_bytes.len());
		dst_payload.bytes = src_bytes;
		Ok(())
	}

	fn texture_copy_sub_part(
		&mut self,
		dst: &mut TerminalEntity,
		dst_sub_resource: u32,
		dst_pos: UVec2,
		src: &TerminalEntity,
		src_sub_resource: u32,
		src_box: Aabb2u,
	) -> DeviceResult<()> {
		let (dst_desc, dst_faces) = texture_entity_desc(dst);
		let (src_desc, src_faces) = texture_entity_desc(src);

		let dst_format = SurfaceFormat::from_type(dst_desc.format);
		let src_format = SurfaceFormat::from_type(src_desc.format);

		let dst_block = dst_format.macro_block_size_in_pixels();
		let src_block = src_format.macro_block_size_in_pixels();

		// Block compressed regions must start on block boundaries.
		assert!(dst_pos.x % dst_block == 0 && dst_pos.y % dst_block == 0);
		assert!(src_box.min.x % src_block == 0 && src_box.min.y % src_block == 0);

		let (dst_offset, dst_width, dst_height) =
			sub_resource_layout(&dst_desc, dst_faces, dst_sub_resource);
		let (src_offset, src_width, src_height) =
			sub_resource_layout(&src_desc, src_faces, src_sub_resource);

		let extents = src_box.extents();
		let (region_row_bytes, region_rows) =
			src_format.size_of_texture_2d(extents.x, extents.y);
		{
			let (dst_region_row_bytes, dst_region_rows) =
				dst_format.size_of_texture_2d(extents.x, extents.y);
			assert!(dst_region_row_bytes == region_row_bytes);
			assert!(dst_region_rows == region_rows);
		}

		let (src_pitch, _) = src_format.size_of_texture_2d(src_width, src_height);
		let (dst_pitch, _) = dst_format.size_of_texture_2d(dst_width, dst_height);

		let src_x_bytes =
			(src_box.min.x / src_block) as usize * (src_format.macro_block_bit_count() as usize >> 3);
		let src_y_blocks = (src_box.min.y / src_block) as usize;
		let dst_x_bytes =
			(dst_pos.x / dst_block) as usize * (dst_format.macro_block_bit_count() as usize >> 3);
		let dst_y_blocks = (dst_pos.y / dst_block) as usize;

		let src_bytes = texture_payload(src).bytes.clone();
		let dst_payload = texture_payload_mut(dst);

		for row in 0..region_rows {
			let src_begin = src_offset + (src_y_blocks + row) * src_pitch + src_x_bytes;
			let dst_begin = dst_offset + (dst_y_blocks + row) * dst_pitch + dst_x_bytes;
			dst_payload.bytes[dst_begin..dst_begin + region_row_bytes]
				.copy_from_slice(&src_bytes[src_begin..src_begin + region_row_bytes]);
		}

		Ok(())
	}

	fn back_buffer_render_target(&self) -> &RenderTarget {
		&self.back_buffer
	}

	fn back_buffer_depth_stencil(&self) -> &DepthStencil {
		&self.depth_buffer
	}

	fn set_render_targets(
		&mut self,
		render_targets: &[&RenderTarget],
		_depth_stencil: Option<&DepthStencil>,
	) {
		// Zero targets is a legal way to unbind everything
		for render_target in render_targets {
			assert!(render_target.available());
		}
	}

	fn clear_render_target(&mut self, render_target: &RenderTarget, _color: Vec4) {
		assert!(render_target.available());
		self.stats.clear_count += 1;
	}

	fn clear_depth_stencil(
		&mut self,
		depth_stencil: &DepthStencil,
		options: ClearOptions,
		_depth: f32,
		_stencil: u8,
	) {
		assert!(depth_stencil.available());
		assert!(!options.is_empty());
		self.stats.clear_count += 1;
	}
}

impl HeadlessBackend {
	fn make_state_entity(&mut self, resource_type: DeviceResourceType) -> TerminalEntity {
		TerminalEntity::new(
			self.next_entity_id(),
			DeviceApi::Headless,
			resource_type,
			EntityDesc::State,
			0,
			Box::new(EmptyPayload),
		)
	}
}

impl DeviceApiContext for HeadlessBackend {
	fn set_blend_state(&mut self, _state: &BlendState) {}
	fn set_rasterizer_state(&mut self, _state: &RasterizerState) {}
	fn set_depth_stencil_state(&mut self, _state: &DepthStencilState) {}

	fn set_sampler_state(&mut self, _stage: ShaderProgramType, _slot: usize, _state: &SamplerState) {}

	fn set_index_buffer(&mut self, index_buffer: &IndexBuffer, offset: usize) {
		assert!(offset < index_buffer.index_count());
	}

	fn set_vertex_buffer(&mut self, vertex_buffer: &VertexBuffer, vertex_offset: usize) {
		assert!(vertex_offset < vertex_buffer.vertex_count().max(1));
	}

	fn set_shader_effect(&mut self, _effect: &ShaderEffect) {}

	fn set_constant_buffer(
		&mut self,
		_stage: ShaderProgramType,
		_slot: usize,
		_constant_buffer: &ConstantBuffer,
	) {
	}

	fn set_texture(&mut self, _stage: ShaderProgramType, _slot: usize, _texture: &dyn Texture) {}

	fn draw_primitives(
		&mut self,
		primitive_type: PrimitiveType,
		_start_vertex: usize,
		primitive_count: usize,
	) {
		let _ = primitive_type.index_count(primitive_count);
		self.stats.draw_call_count += 1;
	}

	fn draw_indexed_primitives(
		&mut self,
		primitive_type: PrimitiveType,
		_base_vertex: usize,
		_start_index: usize,
		primitive_count: usize,
	) {
		let _ = primitive_type.index_count(primitive_count);
		self.stats.draw_call_count += 1;
	}

	fn draw_instanced_primitives(
		&mut self,
		primitive_type: PrimitiveType,
		_base_vertex: usize,
		_start_index: usize,
		primitive_count: usize,
		_start_instance: usize,
		instance_count: usize,
	) {
		assert!(instance_count > 0);
		let _ = primitive_type.index_count(primitive_count);
		self.stats.draw_call_count += 1;
	}

	fn clear_state(&mut self) {
		debug!("headless backend state cleared");
	}
}

impl DeviceApiShaderCompiler for HeadlessBackend {
	fn compile_shader(
		&mut self,
		source: &ShaderSource,
		entry_point: &str,
		_program_type: ShaderProgramType,
		_profile_type: ShaderProfileType,
	) -> Result<ShaderCompiled, ShaderCompileError> {
		if source.text.trim().is_empty() {
			return Err(ShaderCompileError {
				source_name: source.name.clone(),
				message: "empty shader source".to_owned(),
				source: source.text.clone(),
			});
		}

		if !source.text.contains(entry_point) {
			return Err(ShaderCompileError {
				source_name: source.name.clone(),
				message: format!("entry point '{entry_point}' not found"),
				source: source.text.clone(),
			});
		}

		// The headless "compiler" keeps the source bytes as the blob.
		Ok(ShaderCompiled::new(source.text.clone().into_bytes()))
	}

	fn preprocess_shader(&mut self, source: &ShaderSource) -> Result<String, ShaderCompileError> {
		Ok(source.text.clone())
	}
}

impl DeviceApiBackend for HeadlessBackend {
	fn parameters(&self) -> &PresentationParameters {
		&self.parameters
	}

	fn reset(&mut self, parameters: &PresentationParameters) -> DeviceResult<()> {
		self.release_back_buffers();

		self.parameters = parameters.clone();
		self.viewport = parameters.viewport();

		let (back_buffer, depth_buffer) =
			HeadlessBackend::make_back_buffers(&self.parameters, &mut self.entity_counter);
		self.back_buffer = back_buffer;
		self.depth_buffer = depth_buffer;
		Ok(())
	}

	fn present(&mut self) -> DeviceResult<()> {
		self.stats.present_count += 1;
		Ok(())
	}
}

impl HeadlessBackend {
	fn release_back_buffers(&mut self) {
		if self.back_buffer.available() {
			drop(self.back_buffer.take_entity(DeviceApi::Headless));
		}
		if self.depth_buffer.available() {
			drop(self.depth_buffer.take_entity(DeviceApi::Headless));
		}
	}
}

impl Drop for HeadlessBackend {
	fn drop(&mut self) {
		self.release_back_buffers();
	}
}
