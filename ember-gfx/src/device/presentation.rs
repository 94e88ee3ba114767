use crate::surface_format::{SurfaceFormat, SurfaceFormatType};


#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PresentInterval {
	Immediate = 0,
	One = 1,
	Two = 2,
	Three = 3,
	Four = 4,
}

impl PresentInterval {
	pub const DEFAULT: PresentInterval = PresentInterval::One;
}


#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
	pub x: f32,
	pub y: f32,
	pub width: f32,
	pub height: f32,
	pub min_depth: f32,
	pub max_depth: f32,
}

impl Viewport {
	pub fn with_size(width: u32, height: u32) -> Viewport {
		Viewport {
			x: 0.0,
			y: 0.0,
			width: width as f32,
			height: height as f32,
			min_depth: 0.0,
			max_depth: 1.0,
		}
	}

	pub fn aspect_ratio(&self) -> f32 {
		self.width / self.height
	}
}


/// Swap chain description handed to `DeviceEncapsulator::create`.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationParameters {
	back_buffer_width: u32,
	back_buffer_height: u32,
	back_buffer_format: SurfaceFormatType,
	depth_stencil_format: SurfaceFormatType,
	fullscreen: bool,
	triple_buffer: bool,
	multi_sample_count: u32,
	presentation_interval: PresentInterval,
	viewport: Viewport,
}

impl PresentationParameters {
	pub fn new(
		back_buffer_width: u32,
		back_buffer_height: u32,
		back_buffer_format: SurfaceFormatType,
		depth_stencil_format: SurfaceFormatType,
		fullscreen: bool,
		triple_buffer: bool,
		multi_sample_count: u32,
		presentation_interval: PresentInterval,
	) -> PresentationParameters {
		let viewport = Viewport::with_size(back_buffer_width, back_buffer_height);

		PresentationParameters::with_viewport(
			back_buffer_width,
			back_buffer_height,
			back_buffer_format,
			depth_stencil_format,
			fullscreen,
			triple_buffer,
			multi_sample_count,
			presentation_interval,
			viewport,
		)
	}

	#[allow(clippy::too_many_arguments)]
	pub fn with_viewport(
		back_buffer_width: u32,
		back_buffer_height: u32,
		back_buffer_format: SurfaceFormatType,
		depth_stencil_format: SurfaceFormatType,
		fullscreen: bool,
		triple_buffer: bool,
		multi_sample_count: u32,
		presentation_interval: PresentInterval,
		viewport: Viewport,
	) -> PresentationParameters {
		assert!(back_buffer_width > 0 && back_buffer_height > 0);
		assert!(SurfaceFormat::from_type(back_buffer_format).is_rgb());
		assert!(SurfaceFormat::from_type(depth_stencil_format).is_depth());

		PresentationParameters {
			back_buffer_width,
			back_buffer_height,
			back_buffer_format,
			depth_stencil_format,
			fullscreen,
			triple_buffer,
			multi_sample_count,
			presentation_interval,
			viewport,
		}
	}

	pub fn back_buffer_width(&self) -> u32 {
		self.back_buffer_width
	}

	pub fn back_buffer_height(&self) -> u32 {
		self.back_buffer_height
	}

	pub fn back_buffer_format(&self) -> SurfaceFormatType {
		self.back_buffer_format
	}

	pub fn depth_stencil_format(&self) -> SurfaceFormatType {
		self.depth_stencil_format
	}

	pub fn fullscreen(&self) -> bool {
		self.fullscreen
	}

	pub fn triple_buffer(&self) -> bool {
		self.triple_buffer
	}

	pub fn multi_sample_count(&self) -> u32 {
		self.multi_sample_count
	}

	pub fn presentation_interval(&self) -> PresentInterval {
		self.presentation_interval
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}
}
