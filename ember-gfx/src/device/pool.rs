use fnv::FnvHashMap;

use crate::device::entity::{EntityId, TerminalEntity};
use crate::device::sharable::{DeviceResourceSharable, SharedKey};
use crate::memory::MemoryTracking;


#[derive(Debug, Default, Copy, Clone)]
struct Links {
	prev: Option<usize>,
	next: Option<usize>,
}

struct SharedEntry {
	key: SharedKey,
	entity: TerminalEntity,
	lock_count: u32,
	global: Links,
	local: Links,
}

/// Parking lot for detached terminal entities of sharable resources.
///
/// Records are threaded on two lists at once: a **global** list ordering
/// every record by recency of use, and a **local** list chaining the
/// records that share one key so candidate enumeration does not scan the
/// whole pool. Cooperative checkout leaves the record in place under a
/// lock count; exclusive checkout moves the entity out entirely. Eviction
/// walks the global list from its least-recent end and only touches
/// records with a zero lock count.
pub struct SharedEntityPool {
	entries: Vec<Option<SharedEntry>>,
	free_slots: Vec<usize>,
	global_mru: Option<usize>,
	global_lru: Option<usize>,
	buckets: FnvHashMap<SharedKey, usize>,
	used_memory: MemoryTracking,
}

impl SharedEntityPool {
	pub fn new() -> SharedEntityPool {
		SharedEntityPool {
			entries: Vec::new(),
			free_slots: Vec::new(),
			global_mru: None,
			global_lru: None,
			buckets: FnvHashMap::default(),
			used_memory: MemoryTracking::new("EntityPool"),
		}
	}

	pub fn used_memory(&self) -> &MemoryTracking {
		&self.used_memory
	}

	pub fn entry_count(&self) -> usize {
		self.entries.len() - self.free_slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entry_count() == 0
	}

	pub fn contains_entity(&self, id: EntityId) -> bool {
		self.entries
			.iter()
			.flatten()
			.any(|entry| entry.entity.id() == id)
	}

	pub fn lock_count(&self, id: EntityId) -> Option<u32> {
		self.entries
			.iter()
			.flatten()
			.find(|entry| entry.entity.id() == id)
			.map(|entry| entry.lock_count)
	}

	/// Finds a compatible parked entity and hands out a shared view of it.
	/// The record stays in the pool under an incremented lock count until
	/// [`release_cooperative`](Self::release_cooperative) pairs up.
	pub fn acquire_cooperative(
		&mut self,
		resource: &dyn DeviceResourceSharable,
	) -> Option<&TerminalEntity> {
		assert!(resource.frozen());
		assert!(resource.sharable());

		let key = resource.shared_key();
		let slot = self.find_in_bucket(key, |entry| {
			resource.match_terminal_entity(&entry.entity)
		})?;

		self.entry_mut(slot).lock_count += 1;
		self.global_poke_front(slot);

		Some(&self.entry(slot).entity)
	}

	pub fn release_cooperative(&mut self, key: SharedKey, entity_id: EntityId) {
		let slot = self
			.find_in_bucket(key, |entry| entry.entity.id() == entity_id)
			.expect("cooperative release of an entity the pool does not hold");

		let entry = self.entry_mut(slot);
		assert!(entry.lock_count > 0);
		entry.lock_count -= 1;

		self.global_poke_front(slot);
	}

	/// Finds a compatible, unlocked parked entity and transfers it out of
	/// the pool entirely. The caller takes ownership and may mutate it.
	pub fn acquire_exclusive(
		&mut self,
		resource: &dyn DeviceResourceSharable,
	) -> Option<TerminalEntity> {
		assert!(resource.frozen());
		assert!(resource.sharable());

		let key = resource.shared_key();
		let slot = self.find_in_bucket(key, |entry| {
			entry.lock_count == 0 && resource.match_terminal_entity(&entry.entity)
		})?;

		self.global_remove(slot);
		self.local_remove(slot);

		let entry = self.remove_entry(slot);
		let size_in_bytes = entry.entity.video_memory_size_in_bytes();
		assert!(size_in_bytes > 0);
		self.used_memory.deallocate(1, size_in_bytes as u64);

		debug_assert!(entry.key == key);
		Some(entry.entity)
	}

	/// Parks a detached entity at the most-recent end of both lists.
	pub fn release_exclusive(&mut self, key: SharedKey, entity: TerminalEntity) {
		assert!(!entity.is_attached());

		let size_in_bytes = entity.video_memory_size_in_bytes();
		assert!(size_in_bytes > 0);

		let slot = self.insert_entry(SharedEntry {
			key,
			entity,
			lock_count: 0,
			global: Links::default(),
			local: Links::default(),
		});

		self.global_push_front(slot);
		self.local_push_front(slot);

		self.used_memory.allocate(1, size_in_bytes as u64);
	}

	/// Destroys unlocked records from least-recent toward most-recent until
	/// the tracked total fits the target. Returns the bytes still held;
	/// locked records can keep the total above the target.
	pub fn release_lru(&mut self, target_size_in_bytes: usize) -> usize {
		let mut cursor = self.global_lru;

		while let Some(slot) = cursor {
			if self.used_memory.total_size_in_bytes() <= target_size_in_bytes as u64 {
				break;
			}

			let prev = self.entry(slot).global.prev;

			if self.entry(slot).lock_count == 0 {
				self.global_remove(slot);
				self.local_remove(slot);

				let entry = self.remove_entry(slot);
				self.used_memory
					.deallocate(1, entry.entity.video_memory_size_in_bytes() as u64);
				// dropping the entry releases the backend payload
			}

			cursor = prev;
		}

		self.used_memory.total_size_in_bytes() as usize
	}

	/// Drops every parked record; all lock counts must have returned to
	/// zero first.
	pub fn release_all(&mut self) {
		for entry in self.entries.iter().flatten() {
			assert!(
				entry.lock_count == 0,
				"releasing the pool while a cooperative checkout is live"
			);
		}

		let count = self.entry_count() as u64;
		let total = self.used_memory.total_size_in_bytes();

		self.entries.clear();
		self.free_slots.clear();
		self.buckets.clear();
		self.global_mru = None;
		self.global_lru = None;

		self.used_memory.deallocate(count, total);
	}
}

/// Slab + list plumbing
impl SharedEntityPool {
	fn entry(&self, slot: usize) -> &SharedEntry {
		self.entries[slot].as_ref().unwrap()
	}

	fn entry_mut(&mut self, slot: usize) -> &mut SharedEntry {
		self.entries[slot].as_mut().unwrap()
	}

	fn insert_entry(&mut self, entry: SharedEntry) -> usize {
		match self.free_slots.pop() {
			Some(slot) => {
				debug_assert!(self.entries[slot].is_none());
				self.entries[slot] = Some(entry);
				slot
			}
			None => {
				self.entries.push(Some(entry));
				self.entries.len() - 1
			}
		}
	}

	fn remove_entry(&mut self, slot: usize) -> SharedEntry {
		let entry = self.entries[slot].take().unwrap();
		self.free_slots.push(slot);
		entry
	}

	fn find_in_bucket(
		&self,
		key: SharedKey,
		mut accept: impl FnMut(&SharedEntry) -> bool,
	) -> Option<usize> {
		let mut cursor = self.buckets.get(&key).copied();

		while let Some(slot) = cursor {
			let entry = self.entry(slot);
			debug_assert!(entry.key == key);

			if accept(entry) {
				return Some(slot);
			}

			cursor = entry.local.next;
		}

		None
	}

	fn global_push_front(&mut self, slot: usize) {
		let old_head = self.global_mru;

		{
			let entry = self.entry_mut(slot);
			entry.global.prev = None;
			entry.global.next = old_head;
		}

		match old_head {
			Some(head) => self.entry_mut(head).global.prev = Some(slot),
			None => {
				debug_assert!(self.global_lru.is_none());
				self.global_lru = Some(slot);
			}
		}

		self.global_mru = Some(slot);
	}

	fn global_remove(&mut self, slot: usize) {
		let links = self.entry(slot).global;

		match links.prev {
			Some(prev) => self.entry_mut(prev).global.next = links.next,
			None => self.global_mru = links.next,
		}

		match links.next {
			Some(next) => self.entry_mut(next).global.prev = links.prev,
			None => self.global_lru = links.prev,
		}

		self.entry_mut(slot).global = Links::default();
	}

	fn global_poke_front(&mut self, slot: usize) {
		self.global_remove(slot);
		self.global_push_front(slot);
	}

	fn local_push_front(&mut self, slot: usize) {
		let key = self.entry(slot).key;
		let old_head = self.buckets.insert(key, slot);

		{
			let entry = self.entry_mut(slot);
			entry.local.prev = None;
			entry.local.next = old_head;
		}

		if let Some(head) = old_head {
			self.entry_mut(head).local.prev = Some(slot);
		}
	}

	fn local_remove(&mut self, slot: usize) {
		let key = self.entry(slot).key;
		let links = self.entry(slot).local;

		match links.prev {
			Some(prev) => self.entry_mut(prev).local.next = links.next,
			None => {
				// slot was the bucket head
				match links.next {
					Some(next) => {
						self.buckets.insert(key, next);
					}
					None => {
						self.buckets.remove(&key);
					}
				}
			}
		}

		if let Some(next) = links.next {
			self.entry_mut(next).local.prev = links.prev;
		}

		self.entry_mut(slot).local = Links::default();
	}
}

impl Default for SharedEntityPool {
	fn default() -> SharedEntityPool {
		SharedEntityPool::new()
	}
}

impl Drop for SharedEntityPool {
	fn drop(&mut self) {
		// A pool must be drained through release_all before destruction;
		// leaking entities here would skip backend disposal.
		debug_assert!(self.is_empty(), "shared entity pool dropped while holding entities");
	}
}

impl std::fmt::Debug for SharedEntityPool {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SharedEntityPool")
			.field("entries", &self.entry_count())
			.field("used_bytes", &self.used_memory.total_size_in_bytes())
			.finish()
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use std::hash::Hasher;

	use crate::device::buffer::{BufferMode, BufferUsage};
	use crate::device::entity::{BufferEntityDesc, EmptyPayload, EntityDesc};
	use crate::device::resource::{DeviceResourceBase, DeviceResourceType};
	use crate::device::DeviceApi;

	struct TestVertices {
		base: DeviceResourceBase,
		desc: BufferEntityDesc,
	}

	impl TestVertices {
		fn new(stride: u32, count: u32) -> TestVertices {
			let mut base = DeviceResourceBase::with_sharable(DeviceResourceType::Vertices, true);
			base.freeze();

			let desc = BufferEntityDesc {
				stride,
				count,
				mode: BufferMode::WRITE,
				usage: BufferUsage::Default,
			};

			let mut resource = TestVertices { base, desc };
			let hash = resource.shared_key_hash();
			let key = SharedKey::make(DeviceResourceType::Vertices, hash);
			resource.base.set_shared_key(key);
			resource
		}

		fn make_entity(&self, id: u64) -> TerminalEntity {
			TerminalEntity::new(
				EntityId(id),
				DeviceApi::Headless,
				DeviceResourceType::Vertices,
				EntityDesc::Buffer(self.desc),
				self.desc.size_in_bytes(),
				Box::new(EmptyPayload),
			)
		}
	}

	impl DeviceResourceSharable for TestVertices {
		fn base(&self) -> &DeviceResourceBase {
			&self.base
		}

		fn shared_key_hash(&self) -> u64 {
			let mut hasher = fnv::FnvHasher::default();
			hasher.write_u32(self.desc.stride);
			hasher.write_u32(self.desc.count);
			hasher.write_u32(self.desc.mode.bits());
			hasher.write_u32(self.desc.usage as u32);
			hasher.finish()
		}

		fn match_entity_desc(&self, entity: &TerminalEntity) -> bool {
			matches!(entity.desc(), EntityDesc::Buffer(desc) if *desc == self.desc)
		}
	}

	#[test]
	fn exclusive_release_then_acquire_returns_the_same_entity() {
		let mut pool = SharedEntityPool::new();
		let resource = TestVertices::new(16, 4);

		pool.release_exclusive(resource.shared_key(), resource.make_entity(1));
		assert_eq!(pool.used_memory().total_size_in_bytes(), 64);

		let entity = pool.acquire_exclusive(&resource).expect("pool hit");
		assert_eq!(entity.id(), EntityId(1));
		assert_eq!(pool.used_memory().total_size_in_bytes(), 0);
		assert!(pool.is_empty());
	}

	#[test]
	fn mismatched_descriptions_miss() {
		let mut pool = SharedEntityPool::new();
		let parked = TestVertices::new(16, 4);
		pool.release_exclusive(parked.shared_key(), parked.make_entity(1));

		let other = TestVertices::new(16, 8);
		assert!(pool.acquire_exclusive(&other).is_none());

		pool.release_all();
	}

	#[test]
	fn lru_eviction_walks_from_least_recent() {
		let mut pool = SharedEntityPool::new();

		// Four distinct keys, all 64 bytes
		let resources = [
			TestVertices::new(16, 4),
			TestVertices::new(8, 8),
			TestVertices::new(32, 2),
			TestVertices::new(4, 16),
		];

		for (i, resource) in resources.iter().enumerate() {
			pool.release_exclusive(resource.shared_key(), resource.make_entity(i as u64 + 1));
		}
		assert_eq!(pool.used_memory().total_size_in_bytes(), 4 * 64);

		let remaining = pool.release_lru(3 * 64);
		assert_eq!(remaining, 3 * 64);

		// The first released entity is the least recent and goes first
		assert!(!pool.contains_entity(EntityId(1)));
		assert!(pool.contains_entity(EntityId(2)));
		assert!(pool.contains_entity(EntityId(3)));
		assert!(pool.contains_entity(EntityId(4)));

		pool.release_all();
	}

	#[test]
	fn cooperative_lock_guards_eviction() {
		let mut pool = SharedEntityPool::new();
		let resource = TestVertices::new(16, 4);
		let key = resource.shared_key();

		pool.release_exclusive(key, resource.make_entity(1));

		let id = pool.acquire_cooperative(&resource).expect("pool hit").id();
		assert_eq!(id, EntityId(1));
		assert_eq!(pool.lock_count(id), Some(1));

		// Locked records survive even a zero-byte target
		let remaining = pool.release_lru(0);
		assert_eq!(remaining, 64);
		assert!(pool.contains_entity(id));

		pool.release_cooperative(key, id);
		assert_eq!(pool.lock_count(id), Some(0));

		let remaining = pool.release_lru(0);
		assert_eq!(remaining, 0);
		assert!(!pool.contains_entity(id));
	}

	#[test]
	fn cooperative_acquire_release_restores_lock_count() {
		let mut pool = SharedEntityPool::new();
		let resource = TestVertices::new(16, 4);
		let key = resource.shared_key();

		pool.release_exclusive(key, resource.make_entity(9));

		for _ in 0..3 {
			let id = pool.acquire_cooperative(&resource).unwrap().id();
			pool.release_cooperative(key, id);
		}

		assert_eq!(pool.lock_count(EntityId(9)), Some(0));
		pool.release_all();
	}

	#[test]
	fn byte_accounting_is_exact() {
		let mut pool = SharedEntityPool::new();

		let a = TestVertices::new(16, 4); // 64
		let b = TestVertices::new(16, 16); // 256
		pool.release_exclusive(a.shared_key(), a.make_entity(1));
		pool.release_exclusive(b.shared_key(), b.make_entity(2));
		assert_eq!(pool.used_memory().total_size_in_bytes(), 320);
		assert_eq!(pool.used_memory().allocation_count(), 2);

		let taken = pool.acquire_exclusive(&a).unwrap();
		assert_eq!(taken.video_memory_size_in_bytes(), 64);
		assert_eq!(pool.used_memory().total_size_in_bytes(), 256);

		pool.release_all();
		assert!(pool.used_memory().is_empty());
	}

	#[test]
	fn same_key_bucket_holds_multiple_records() {
		let mut pool = SharedEntityPool::new();
		let resource = TestVertices::new(16, 4);
		let key = resource.shared_key();

		pool.release_exclusive(key, resource.make_entity(1));
		pool.release_exclusive(key, resource.make_entity(2));
		assert_eq!(pool.entry_count(), 2);

		let first = pool.acquire_exclusive(&resource).unwrap();
		let second = pool.acquire_exclusive(&resource).unwrap();
		assert_ne!(first.id(), second.id());
		assert!(pool.acquire_exclusive(&resource).is_none());
	}

	#[test]
	#[should_panic]
	fn release_all_with_live_locks_is_rejected() {
		let mut pool = SharedEntityPool::new();
		let resource = TestVertices::new(16, 4);
		pool.release_exclusive(resource.shared_key(), resource.make_entity(1));

		let _ = pool.acquire_cooperative(&resource);
		pool.release_all();
	}
}
