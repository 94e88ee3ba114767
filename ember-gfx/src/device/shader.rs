use std::hash::Hasher;

pub mod constant_buffer;
pub mod effect;
pub mod program;

pub use constant_buffer::*;
pub use effect::*;
pub use program::*;


/// Pipeline stage a compiled program runs on.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderProgramType {
	Vertex = 0,
	Hull,
	Domain,
	Geometry,
	Pixel,
}

pub const SHADER_PROGRAM_TYPE_COUNT: usize = 5;

impl ShaderProgramType {
	pub const ALL: [ShaderProgramType; SHADER_PROGRAM_TYPE_COUNT] = [
		ShaderProgramType::Vertex,
		ShaderProgramType::Hull,
		ShaderProgramType::Domain,
		ShaderProgramType::Geometry,
		ShaderProgramType::Pixel,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			ShaderProgramType::Vertex => "Vertex",
			ShaderProgramType::Hull => "Hull",
			ShaderProgramType::Domain => "Domain",
			ShaderProgramType::Geometry => "Geometry",
			ShaderProgramType::Pixel => "Pixel",
		}
	}
}

/// Shader model the blob was compiled against.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderProfileType {
	ShaderModel4 = 0,
	ShaderModel4_1,
	ShaderModel5,
}

impl ShaderProfileType {
	pub fn as_str(self) -> &'static str {
		match self {
			ShaderProfileType::ShaderModel4 => "4_0",
			ShaderProfileType::ShaderModel4_1 => "4_1",
			ShaderProfileType::ShaderModel5 => "5_0",
		}
	}
}


/// Named shader text handed to the backend compiler.
#[derive(Debug, Clone)]
pub struct ShaderSource {
	pub name: String,
	pub text: String,
}

impl ShaderSource {
	pub fn new(name: impl Into<String>, text: impl Into<String>) -> ShaderSource {
		ShaderSource { name: name.into(), text: text.into() }
	}
}


/// Compiled shader bytecode, opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderCompiled {
	data: Vec<u8>,
}

impl ShaderCompiled {
	pub fn new(data: Vec<u8>) -> ShaderCompiled {
		assert!(!data.is_empty());
		ShaderCompiled { data }
	}

	pub fn data(&self) -> &[u8] {
		&self.data
	}

	pub fn size_in_bytes(&self) -> usize {
		self.data.len()
	}

	/// Stable content hash; part of the shared-program pool key.
	pub fn hash(&self) -> u64 {
		let mut hasher = fnv::FnvHasher::default();
		hasher.write(&self.data);
		hasher.finish()
	}
}
