use std::hash::Hasher;

use smallvec::SmallVec;

use crate::name::Name;
use crate::value::{value_promote, ValueType};


/// One named, typed field at a fixed byte offset inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueField {
	pub name: Name,
	pub index: u32,
	pub value_type: ValueType,
	pub offset: u32,
}

impl ValueField {
	pub fn size_in_bytes(&self) -> usize {
		self.value_type.size_in_bytes()
	}

	pub fn end_offset(&self) -> usize {
		self.offset as usize + self.size_in_bytes()
	}
}


/// Ordered list of fields describing a packed record, e.g. one vertex or
/// one constant buffer block. Field offsets may leave padding; the block
/// size covers up to the end of the furthest field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueBlock {
	fields: SmallVec<[ValueField; 6]>,
}

impl ValueBlock {
	pub fn new() -> ValueBlock {
		ValueBlock::default()
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	pub fn fields(&self) -> &[ValueField] {
		&self.fields
	}

	pub fn size_in_bytes(&self) -> usize {
		self.fields.iter().map(ValueField::end_offset).max().unwrap_or(0)
	}

	pub fn add_field(&mut self, name: Name, index: u32, value_type: ValueType, offset: u32) {
		assert!(value_type != ValueType::Void);
		assert!(self.field_by_name_ifp(&name, index).is_none(), "duplicate field {name}[{index}]");

		self.fields.push(ValueField { name, index, value_type, offset });
	}

	pub fn field_by_index(&self, index: usize) -> &ValueField {
		&self.fields[index]
	}

	pub fn field_by_name_ifp(&self, name: &Name, index: u32) -> Option<&ValueField> {
		self.fields.iter().find(|f| f.name == *name && f.index == index)
	}

	pub fn field_by_name(&self, name: &Name, index: u32) -> &ValueField {
		self.field_by_name_ifp(name, index)
			.unwrap_or_else(|| panic!("unknown field {name}[{index}]"))
	}

	/// Copies one record field by field. Both views must span a full record.
	pub fn copy_record(&self, dst: &mut [u8], src: &[u8]) {
		let size = self.size_in_bytes();
		assert!(dst.len() >= size);
		assert!(src.len() >= size);

		for field in self.fields.iter() {
			let offset = field.offset as usize;
			field.value_type.copy(&mut dst[offset..], &src[offset..]);
		}
	}

	/// Copies one record into a differently laid out block, promoting each
	/// field to the destination's format. Fields are paired by name and
	/// index; returns false if any pairing or promotion is undefined.
	pub fn promote_record_into(&self, dst_block: &ValueBlock, dst: &mut [u8], src: &[u8]) -> bool {
		assert!(dst.len() >= dst_block.size_in_bytes());
		assert!(src.len() >= self.size_in_bytes());

		for dst_field in dst_block.fields.iter() {
			let Some(src_field) = self.field_by_name_ifp(&dst_field.name, dst_field.index) else {
				return false;
			};

			let promoted = value_promote(
				dst_field.value_type, &mut dst[dst_field.offset as usize..],
				src_field.value_type, &src[src_field.offset as usize..],
			);

			if !promoted {
				return false;
			}
		}

		true
	}

	/// Stable content hash over the field layout.
	pub fn layout_hash(&self) -> u64 {
		let mut hasher = fnv::FnvHasher::default();
		for field in self.fields.iter() {
			hasher.write(field.name.as_str().as_bytes());
			hasher.write_u32(field.index);
			hasher.write_u32(field.value_type as u32);
			hasher.write_u32(field.offset);
		}
		hasher.finish()
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn two_field_block() -> ValueBlock {
		let mut block = ValueBlock::new();
		block.add_field(Name::new("Position"), 0, ValueType::Float3, 0);
		block.add_field(Name::new("TexCoord"), 0, ValueType::Float2, 12);
		block
	}

	#[test]
	fn size_spans_to_last_field() {
		let block = two_field_block();
		assert_eq!(block.len(), 2);
		assert_eq!(block.size_in_bytes(), 20);
	}

	#[test]
	fn lookup_by_name_and_index() {
		let block = two_field_block();
		assert_eq!(block.field_by_name(&Name::new("TexCoord"), 0).offset, 12);
		assert!(block.field_by_name_ifp(&Name::new("TexCoord"), 1).is_none());
		assert!(block.field_by_name_ifp(&Name::new("Normal"), 0).is_none());
	}

	#[test]
	#[should_panic]
	fn duplicate_fields_are_rejected() {
		let mut block = two_field_block();
		block.add_field(Name::new("Position"), 0, ValueType::Float4, 20);
	}

	#[test]
	fn copy_record_walks_every_field() {
		let block = two_field_block();

		let src: Vec<u8> = (0..20).collect();
		let mut dst = vec![0u8; 20];
		block.copy_record(&mut dst, &src);
		assert_eq!(dst, src);
	}

	#[test]
	fn layout_hash_distinguishes_field_lists() {
		let a = two_field_block();
		let mut b = two_field_block();
		assert_eq!(a.layout_hash(), b.layout_hash());

		b.add_field(Name::new("Normal"), 0, ValueType::UX10Y10Z10W2N, 20);
		assert_ne!(a.layout_hash(), b.layout_hash());
	}
}
