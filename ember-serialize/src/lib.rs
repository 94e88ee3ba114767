//! Binary scene serialization over the reflection contract: a sectioned
//! little-endian format with deduplicated name/string/class/property/object
//! tables, plus the bounds-checked memory readers it is parsed with.

pub mod binary;
pub mod memory_reader;

pub use binary::*;
pub use memory_reader::*;

use thiserror::Error;


#[derive(Debug, Error)]
pub enum SerializeError {
	#[error("invalid file magic")]
	InvalidMagic,

	#[error("unsupported file version")]
	UnsupportedVersion,

	#[error("invalid {0} section")]
	InvalidSection(&'static str),

	#[error("short read in {0}")]
	ShortRead(&'static str),

	#[error("string table entry is not valid utf-8")]
	InvalidString,

	#[error("unknown reflected class '{0}'")]
	UnknownClass(String),

	#[error("unknown property '{property}' on class '{class}'")]
	UnknownProperty { class: String, property: String },

	#[error("{0} index out of range")]
	InvalidIndex(&'static str),

	#[error("unexpected tag while reading {0}")]
	UnexpectedTag(&'static str),

	#[error("atom type id mismatch while reading {0}")]
	TypeIdMismatch(&'static str),

	#[error("malformed object header")]
	InvalidObjectHeader,

	#[error("failed to import object '{0}'")]
	ImportNotFound(String),

	#[error("abstract atoms of type id {0:#x} cannot be serialized")]
	UnsupportedAtom(u32),

	#[error("object data section has unread bytes")]
	TrailingData,

	#[error("corrupt compressed stream")]
	CorruptCompressedData,
}


/// Optional whole-file compression wrapper around a serialized scene.
pub fn compress(bytes: &[u8]) -> Vec<u8> {
	lz4_flex::compress_prepend_size(bytes)
}

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, SerializeError> {
	lz4_flex::decompress_size_prepended(bytes).map_err(|_| SerializeError::CorruptCompressedData)
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn compression_round_trips() {
		let payload: Vec<u8> = (0..4096u32).map(|v| (v % 251) as u8).collect();
		let compressed = compress(&payload);
		assert!(compressed.len() < payload.len());
		assert_eq!(decompress(&compressed).unwrap(), payload);
	}

	#[test]
	fn corrupt_streams_are_reported() {
		assert!(matches!(
			decompress(&[1, 2, 3]),
			Err(SerializeError::CorruptCompressedData)
		));
	}
}
