use bitflags::bitflags;
use glam::{UVec2, Vec4};
use thiserror::Error;

use crate::device::buffer::UpdateRoute;
use crate::device::entity::TerminalEntity;
use crate::device::geometry::{IndexBuffer, PrimitiveType, VertexBuffer, VertexDeclaration};
use crate::device::presentation::{PresentationParameters, Viewport};
use crate::device::shader::{
	ConstantBuffer, ShaderCompiled, ShaderEffect, ShaderProfileType, ShaderProgram,
	ShaderProgramType, ShaderSource,
};
use crate::device::state::{BlendState, DepthStencilState, RasterizerState, SamplerState};
use crate::device::texture::{Aabb2u, DepthStencil, RenderTarget, Texture, Texture2d, TextureCube};
use crate::device::DeviceApi;


pub type DeviceResult<T> = Result<T, DeviceError>;

/// Backend failures surfaced to the caller. Precondition violations do not
/// take this path; they abort.
#[derive(Debug, Error)]
pub enum DeviceError {
	#[error("no {} backend is available on this platform", .api.as_str())]
	BackendUnavailable { api: DeviceApi },

	#[error("{} backend failed in {operation} (resource {resource:?})", .api.as_str())]
	Backend {
		api: DeviceApi,
		operation: &'static str,
		resource: Option<String>,
	},
}

/// Shader compiler failures carry the offending source so the caller can
/// report it.
#[derive(Debug)]
pub struct ShaderCompileError {
	pub source_name: String,
	pub message: String,
	pub source: String,
}

impl std::fmt::Display for ShaderCompileError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "shader compilation of '{}' failed: {}", self.source_name, self.message)
	}
}

impl std::error::Error for ShaderCompileError {}


/// Counters a backend keeps for diagnostics and tests.
#[derive(Debug, Default, Clone)]
pub struct DeviceApiBackendStats {
	pub draw_call_count: u64,
	pub clear_count: u64,
	pub present_count: u64,
}


bitflags! {
	#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
	pub struct ClearOptions: u32 {
		const DEPTH = 1 << 0;
		const STENCIL = 1 << 1;
		const DEPTH_STENCIL = Self::DEPTH.bits() | Self::STENCIL.bits();
	}
}


/// Resource creation, destruction and output state. Every create returns a
/// new terminal entity or fails; every destroy consumes the entity. The
/// device encapsulator implements this trait by routing sharable resources
/// through its entity pool before reaching the concrete backend, which
/// implements it by actually talking to the API.
pub trait DeviceApiEncapsulator {
	fn api(&self) -> DeviceApi;

	// Viewport

	fn set_viewport(&mut self, viewport: Viewport);
	fn set_viewports(&mut self, viewports: &[Viewport]);

	// Geometry buffers

	fn create_index_buffer(
		&mut self,
		index_buffer: &IndexBuffer,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity>;

	fn destroy_index_buffer(
		&mut self,
		index_buffer: &IndexBuffer,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	fn create_vertex_buffer(
		&mut self,
		vertex_buffer: &VertexBuffer,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity>;

	fn destroy_vertex_buffer(
		&mut self,
		vertex_buffer: &VertexBuffer,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	// Buffer data paths, shared by every buffer flavor

	fn buffer_get_data(
		&mut self,
		entity: &TerminalEntity,
		offset: usize,
		dst: &mut [u8],
	) -> DeviceResult<()>;

	fn buffer_set_data(
		&mut self,
		entity: &mut TerminalEntity,
		offset: usize,
		src: &[u8],
		route: UpdateRoute,
	) -> DeviceResult<()>;

	fn buffer_copy(&mut self, dst: &mut TerminalEntity, src: &TerminalEntity) -> DeviceResult<()>;

	fn buffer_copy_sub_part(
		&mut self,
		dst: &mut TerminalEntity,
		dst_offset: usize,
		src: &TerminalEntity,
		src_offset: usize,
		length: usize,
	) -> DeviceResult<()>;

	// Vertex declarations

	fn create_vertex_declaration(
		&mut self,
		declaration: &VertexDeclaration,
	) -> DeviceResult<TerminalEntity>;

	fn destroy_vertex_declaration(
		&mut self,
		declaration: &VertexDeclaration,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	// Shaders

	fn create_constant_buffer(
		&mut self,
		constant_buffer: &ConstantBuffer,
	) -> DeviceResult<TerminalEntity>;

	fn destroy_constant_buffer(
		&mut self,
		constant_buffer: &ConstantBuffer,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	fn create_shader_program(&mut self, program: &ShaderProgram) -> DeviceResult<TerminalEntity>;

	fn destroy_shader_program(
		&mut self,
		program: &ShaderProgram,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	fn create_shader_effect(&mut self, effect: &ShaderEffect) -> DeviceResult<TerminalEntity>;

	fn destroy_shader_effect(
		&mut self,
		effect: &ShaderEffect,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	// State blocks

	fn create_blend_state(&mut self, state: &BlendState) -> DeviceResult<TerminalEntity>;
	fn destroy_blend_state(&mut self, state: &BlendState, entity: TerminalEntity)
		-> DeviceResult<()>;

	fn create_rasterizer_state(&mut self, state: &RasterizerState) -> DeviceResult<TerminalEntity>;
	fn destroy_rasterizer_state(
		&mut self,
		state: &RasterizerState,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	fn create_depth_stencil_state(
		&mut self,
		state: &DepthStencilState,
	) -> DeviceResult<TerminalEntity>;
	fn destroy_depth_stencil_state(
		&mut self,
		state: &DepthStencilState,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	fn create_sampler_state(&mut self, state: &SamplerState) -> DeviceResult<TerminalEntity>;
	fn destroy_sampler_state(
		&mut self,
		state: &SamplerState,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	// Textures

	fn create_texture_2d(
		&mut self,
		texture: &Texture2d,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity>;

	fn destroy_texture_2d(
		&mut self,
		texture: &Texture2d,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	fn create_texture_cube(
		&mut self,
		texture: &TextureCube,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity>;

	fn destroy_texture_cube(
		&mut self,
		texture: &TextureCube,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	fn create_render_target(
		&mut self,
		render_target: &RenderTarget,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity>;

	fn destroy_render_target(
		&mut self,
		render_target: &RenderTarget,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	fn create_depth_stencil(
		&mut self,
		depth_stencil: &DepthStencil,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity>;

	fn destroy_depth_stencil(
		&mut self,
		depth_stencil: &DepthStencil,
		entity: TerminalEntity,
	) -> DeviceResult<()>;

	// Texture data paths

	fn texture_get_data(
		&mut self,
		entity: &TerminalEntity,
		offset: usize,
		dst: &mut [u8],
	) -> DeviceResult<()>;

	fn texture_set_data(
		&mut self,
		entity: &mut TerminalEntity,
		offset: usize,
		src: &[u8],
	) -> DeviceResult<()>;

	fn texture_copy(&mut self, dst: &mut TerminalEntity, src: &TerminalEntity) -> DeviceResult<()>;

	/// Sub-region copy between two texture entities. Sub-resource indices
	/// address the (face, mip) grid and are computed by the caller.
	fn texture_copy_sub_part(
		&mut self,
		dst: &mut TerminalEntity,
		dst_sub_resource: u32,
		dst_pos: UVec2,
		src: &TerminalEntity,
		src_sub_resource: u32,
		src_box: Aabb2u,
	) -> DeviceResult<()>;

	// Render targets

	fn back_buffer_render_target(&self) -> &RenderTarget;
	fn back_buffer_depth_stencil(&self) -> &DepthStencil;

	fn set_render_targets(
		&mut self,
		render_targets: &[&RenderTarget],
		depth_stencil: Option<&DepthStencil>,
	);

	fn clear_render_target(&mut self, render_target: &RenderTarget, color: Vec4);

	fn clear_depth_stencil(
		&mut self,
		depth_stencil: &DepthStencil,
		options: ClearOptions,
		depth: f32,
		stencil: u8,
	);
}

/// Bind and draw calls on the immediate context.
pub trait DeviceApiContext {
	fn set_blend_state(&mut self, state: &BlendState);
	fn set_rasterizer_state(&mut self, state: &RasterizerState);
	fn set_depth_stencil_state(&mut self, state: &DepthStencilState);

	fn set_sampler_state(&mut self, stage: ShaderProgramType, slot: usize, state: &SamplerState);

	fn set_index_buffer(&mut self, index_buffer: &IndexBuffer, offset: usize);
	fn set_vertex_buffer(&mut self, vertex_buffer: &VertexBuffer, vertex_offset: usize);

	fn set_shader_effect(&mut self, effect: &ShaderEffect);

	fn set_constant_buffer(
		&mut self,
		stage: ShaderProgramType,
		slot: usize,
		constant_buffer: &ConstantBuffer,
	);

	fn set_texture(&mut self, stage: ShaderProgramType, slot: usize, texture: &dyn Texture);

	fn draw_primitives(
		&mut self,
		primitive_type: PrimitiveType,
		start_vertex: usize,
		primitive_count: usize,
	);

	fn draw_indexed_primitives(
		&mut self,
		primitive_type: PrimitiveType,
		base_vertex: usize,
		start_index: usize,
		primitive_count: usize,
	);

	fn draw_instanced_primitives(
		&mut self,
		primitive_type: PrimitiveType,
		base_vertex: usize,
		start_index: usize,
		primitive_count: usize,
		start_instance: usize,
		instance_count: usize,
	);

	fn clear_state(&mut self);
}

/// Offline shader tooling exposed by the backend.
pub trait DeviceApiShaderCompiler {
	fn compile_shader(
		&mut self,
		source: &ShaderSource,
		entry_point: &str,
		program_type: ShaderProgramType,
		profile_type: ShaderProfileType,
	) -> Result<ShaderCompiled, ShaderCompileError>;

	fn preprocess_shader(&mut self, source: &ShaderSource) -> Result<String, ShaderCompileError>;
}

/// The one object a device encapsulator drives: device + context +
/// compiler, plus swap-chain lifecycle.
pub trait DeviceApiBackend: DeviceApiEncapsulator + DeviceApiContext + DeviceApiShaderCompiler {
	fn parameters(&self) -> &PresentationParameters;

	fn reset(&mut self, parameters: &PresentationParameters) -> DeviceResult<()>;
	fn present(&mut self) -> DeviceResult<()>;
}
