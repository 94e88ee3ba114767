use crate::device::entity::TerminalEntity;
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};


const TYPE_BITS: u32 = 4;
const TYPE_MASK: u64 = (1 << TYPE_BITS) - 1;
const HASH_MASK: u64 = u64::MAX >> TYPE_BITS;

/// Content-addressed pool key: the resource type lives in the low bits and
/// the content hash is folded into the rest of the word. Keys only collide
/// when both components agree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SharedKey(u64);

impl SharedKey {
	pub const INVALID: SharedKey = SharedKey(u64::MAX);

	pub fn make(resource_type: DeviceResourceType, hash: u64) -> SharedKey {
		let folded = ((hash >> TYPE_BITS) ^ hash) & HASH_MASK;
		let key = SharedKey(resource_type as u64 | (folded << TYPE_BITS));
		assert!(key.is_valid());
		key
	}

	pub fn is_valid(self) -> bool {
		self != SharedKey::INVALID
	}

	pub fn resource_type(self) -> DeviceResourceType {
		assert!(self.is_valid());
		DeviceResourceType::from_u32((self.0 & TYPE_MASK) as u32)
	}

	pub fn hash_value(self) -> u64 {
		assert!(self.is_valid());
		self.0 >> TYPE_BITS
	}
}


/// A resource whose terminal entity may be parked in and reused from the
/// shared entity pool. The content hash must be a stable function of the
/// same fields [`match_entity_desc`](Self::match_entity_desc) compares.
pub trait DeviceResourceSharable {
	fn base(&self) -> &DeviceResourceBase;

	/// Content hash over the fields that define entity compatibility.
	fn shared_key_hash(&self) -> u64;

	/// Type-specific compatibility test against a parked entity's
	/// description. The resource-type tag has already been matched.
	fn match_entity_desc(&self, entity: &TerminalEntity) -> bool;

	fn frozen(&self) -> bool {
		self.base().frozen()
	}

	fn sharable(&self) -> bool {
		self.base().sharable()
	}

	fn shared_key(&self) -> SharedKey {
		self.base().shared_key()
	}

	fn match_terminal_entity(&self, entity: &TerminalEntity) -> bool {
		assert!(self.frozen());
		assert!(self.sharable());
		assert!(!entity.is_attached());

		entity.resource_type() == self.base().resource_type() && self.match_entity_desc(entity)
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn key_components_survive_packing() {
		let key = SharedKey::make(DeviceResourceType::Texture2d, 0xDEAD_BEEF_CAFE_F00D);
		assert!(key.is_valid());
		assert_eq!(key.resource_type(), DeviceResourceType::Texture2d);
	}

	#[test]
	fn equal_inputs_give_equal_keys() {
		let a = SharedKey::make(DeviceResourceType::Vertices, 42);
		let b = SharedKey::make(DeviceResourceType::Vertices, 42);
		let c = SharedKey::make(DeviceResourceType::Indices, 42);
		let d = SharedKey::make(DeviceResourceType::Vertices, 43);

		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_ne!(a, d);
	}

	#[test]
	fn ordering_is_total() {
		let mut keys = vec![
			SharedKey::make(DeviceResourceType::Vertices, 3),
			SharedKey::make(DeviceResourceType::Constants, 9),
			SharedKey::make(DeviceResourceType::Vertices, 1),
			SharedKey::INVALID,
		];
		keys.sort();
		assert_eq!(keys.last(), Some(&SharedKey::INVALID));
	}
}
