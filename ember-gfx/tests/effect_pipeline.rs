mod common;

use std::sync::Arc;

use glam::Vec4;

use ember_gfx::device::{
	BlendState, BufferMode, BufferUsage, ClearOptions, DepthStencilState, IndexBuffer,
	IndexElementSize, PrimitiveType, RasterizerState, SamplerState, ShaderEffect,
	ShaderProfileType, ShaderProgram, ShaderProgramType, VertexBuffer,
};

use ember_gfx::Texture;

use common::{float4_layout, headless_device};


const VS_SOURCE: &str = "float4 vs_main(float4 position : POSITION) : SV_Position { return position; }";
const PS_SOURCE: &str = "float4 ps_main() : SV_Target { return float4(1, 1, 1, 1); }";

#[test]
fn a_whole_frame_walks_through_the_device() {
	let mut device = headless_device();
	let layout = float4_layout();

	// Compile both stages through the backend compiler
	let vs_blob = device
		.shader_compiler()
		.compile_shader(
			&ember_gfx::ShaderSource::new("triangle.vs", VS_SOURCE),
			"vs_main",
			ShaderProgramType::Vertex,
			ShaderProfileType::ShaderModel5,
		)
		.unwrap();

	let ps_blob = device
		.shader_compiler()
		.compile_shader(
			&ember_gfx::ShaderSource::new("triangle.ps", PS_SOURCE),
			"ps_main",
			ShaderProgramType::Pixel,
			ShaderProfileType::ShaderModel5,
		)
		.unwrap();

	let mut vertex_program = ShaderProgram::new(
		layout.clone(),
		ShaderProgramType::Vertex,
		ShaderProfileType::ShaderModel5,
		Arc::new(vs_blob),
		false,
	);
	vertex_program.freeze();
	vertex_program.create(device.device()).unwrap();

	let mut pixel_program = ShaderProgram::new(
		layout.clone(),
		ShaderProgramType::Pixel,
		ShaderProfileType::ShaderModel5,
		Arc::new(ps_blob),
		false,
	);
	pixel_program.freeze();
	pixel_program.create(device.device()).unwrap();

	let mut effect = ShaderEffect::new(layout.clone());
	effect.set_stage_program(ShaderProgramType::Vertex, vertex_program);
	effect.set_stage_program(ShaderProgramType::Pixel, pixel_program);
	effect.freeze();
	effect.create(device.device()).unwrap();

	// Geometry
	let mut vertices = VertexBuffer::new(
		layout.clone(),
		3,
		BufferMode::NONE,
		BufferUsage::Immutable,
		false,
	);
	vertices.freeze();
	let vertex_data = vec![0u8; 48];
	vertices.create(device.device(), Some(&vertex_data)).unwrap();

	let mut indices = IndexBuffer::new(
		IndexElementSize::SixteenBits,
		3,
		BufferMode::NONE,
		BufferUsage::Immutable,
		false,
	);
	indices.freeze();
	let index_data: Vec<u8> = [0u16, 1, 2].iter().flat_map(|i| i.to_le_bytes()).collect();
	indices.create(device.device(), Some(&index_data)).unwrap();

	// State blocks
	let mut blend = BlendState::opaque();
	blend.freeze();
	blend.create(device.device()).unwrap();

	let mut rasterizer = RasterizerState::cull_none();
	rasterizer.freeze();
	rasterizer.create(device.device()).unwrap();

	let mut depth = DepthStencilState::default_();
	depth.freeze();
	depth.create(device.device()).unwrap();

	let mut sampler = SamplerState::linear_clamp();
	sampler.freeze();
	sampler.create(device.device()).unwrap();

	// Bind, draw, present
	device.clear_state();

	device.immediate().set_blend_state(&blend);
	device.immediate().set_rasterizer_state(&rasterizer);
	device.immediate().set_depth_stencil_state(&depth);
	device
		.immediate()
		.set_sampler_state(ShaderProgramType::Pixel, 0, &sampler);
	device.immediate().set_shader_effect(&effect);
	device.immediate().set_vertex_buffer(&vertices, 0);
	device.immediate().set_index_buffer(&indices, 0);
	device
		.immediate()
		.draw_indexed_primitives(PrimitiveType::TriangleList, 0, 0, 1);

	device.present().unwrap();

	// Binding stamped every entity with the pre-present revision
	assert_eq!(vertices.terminal_entity().unwrap().last_used().0, 0);
	assert_eq!(effect.terminal_entity().unwrap().last_used().0, 0);

	// Teardown in reverse order; stage programs come back out of the effect
	sampler.destroy(device.device()).unwrap();
	depth.destroy(device.device()).unwrap();
	rasterizer.destroy(device.device()).unwrap();
	blend.destroy(device.device()).unwrap();
	indices.destroy(device.device()).unwrap();
	vertices.destroy(device.device()).unwrap();

	effect.destroy(device.device()).unwrap();
	let mut vertex_program = effect.reset_stage_program(ShaderProgramType::Vertex);
	let mut pixel_program = effect.reset_stage_program(ShaderProgramType::Pixel);
	vertex_program.destroy(device.device()).unwrap();
	pixel_program.destroy(device.device()).unwrap();

	device.destroy();
}

#[test]
fn offscreen_targets_bind_and_clear() {
	use ember_gfx::device::{DepthStencil, RenderTarget};
	use ember_gfx::surface_format::SurfaceFormatType;

	let mut device = headless_device();

	let mut target = RenderTarget::new(
		128,
		128,
		SurfaceFormatType::R8G8B8A8,
		BufferMode::NONE,
		BufferUsage::Default,
		false,
	);
	target.freeze();
	target.create(device.device(), None).unwrap();

	let mut depth = DepthStencil::new(
		128,
		128,
		SurfaceFormatType::D24S8,
		BufferMode::NONE,
		BufferUsage::Default,
		false,
	);
	depth.freeze();
	depth.create(device.device(), None).unwrap();

	device.device().set_render_targets(&[&target], Some(&depth));
	device
		.device()
		.clear_render_target(&target, Vec4::new(0.1, 0.2, 0.3, 1.0));
	device
		.device()
		.clear_depth_stencil(&depth, ClearOptions::DEPTH_STENCIL, 1.0, 0);

	// Binding zero targets unbinds everything
	device.device().set_render_targets(&[], None);

	// The back buffers the backend owns are available as well
	assert!(device.device().back_buffer_render_target().available());

	target.destroy(device.device()).unwrap();
	depth.destroy(device.device()).unwrap();
	device.destroy();
}

#[test]
fn empty_shader_sources_fail_compilation() {
	let mut device = headless_device();

	let result = device.shader_compiler().compile_shader(
		&ember_gfx::ShaderSource::new("empty.vs", "   "),
		"main",
		ShaderProgramType::Vertex,
		ShaderProfileType::ShaderModel4,
	);

	let error = result.unwrap_err();
	assert_eq!(error.source_name, "empty.vs");

	device.destroy();
}
