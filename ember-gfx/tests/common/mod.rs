#![allow(dead_code)]

use std::sync::Arc;

use ember_gfx::device::{
	BufferMode, BufferUsage, DeviceApi, DeviceEncapsulator, PresentInterval,
	PresentationParameters, VertexBuffer, VertexDeclaration, VertexSemantic,
};
use ember_gfx::surface_format::SurfaceFormatType;
use ember_gfx::value::ValueType;
use ember_gfx::VertexLayout;

pub fn presentation_parameters() -> PresentationParameters {
	PresentationParameters::new(
		640,
		480,
		SurfaceFormatType::R8G8B8A8,
		SurfaceFormatType::D24S8,
		false,
		false,
		1,
		PresentInterval::DEFAULT,
	)
}

pub fn headless_device() -> DeviceEncapsulator {
	let mut device = DeviceEncapsulator::new();
	device
		.create(DeviceApi::Headless, None, &presentation_parameters())
		.expect("headless device");
	device
}

/// One Float4 field, so the vertex stride is 16 bytes.
pub fn float4_layout() -> Arc<VertexLayout> {
	let mut declaration = VertexDeclaration::new();
	declaration.add_sub_part(&VertexSemantic::position(), 0, ValueType::Float4, 0);
	declaration.freeze();
	declaration.layout().clone()
}

pub fn sharable_vertex_buffer(
	layout: &Arc<VertexLayout>,
	vertex_count: usize,
	mode: BufferMode,
	usage: BufferUsage,
) -> VertexBuffer {
	let mut buffer = VertexBuffer::new(layout.clone(), vertex_count, mode, usage, true);
	buffer.freeze();
	buffer
}
