mod common;

use ember_gfx::device::{BufferMode, BufferUsage, DeviceResourceSharable};

use common::{float4_layout, headless_device, sharable_vertex_buffer};


// Two identical sharable descriptions exchange one terminal entity through
// the pool: destroy parks it, the next create recycles it.
#[test]
fn identical_buffers_recycle_one_entity() {
	let mut device = headless_device();
	let layout = float4_layout();

	let mut first = sharable_vertex_buffer(&layout, 256, BufferMode::WRITE, BufferUsage::Dynamic);
	first.create(device.device(), None).unwrap();
	let first_id = first.terminal_entity().unwrap().id();

	first.destroy(device.device()).unwrap();
	assert_eq!(
		device.shared_entity_pool().used_memory().total_size_in_bytes(),
		4096
	);

	let mut second = sharable_vertex_buffer(&layout, 256, BufferMode::WRITE, BufferUsage::Dynamic);
	second.create(device.device(), None).unwrap();

	// Exclusive pool hit: the very same entity comes back
	assert_eq!(second.terminal_entity().unwrap().id(), first_id);
	assert_eq!(device.shared_entity_pool().used_memory().total_size_in_bytes(), 0);

	second.destroy(device.device()).unwrap();
	device.destroy();
}

#[test]
fn mismatched_descriptions_do_not_recycle() {
	let mut device = headless_device();
	let layout = float4_layout();

	let mut parked = sharable_vertex_buffer(&layout, 256, BufferMode::WRITE, BufferUsage::Dynamic);
	parked.create(device.device(), None).unwrap();
	let parked_id = parked.terminal_entity().unwrap().id();
	parked.destroy(device.device()).unwrap();

	// Same byte size, different element count
	let mut other = sharable_vertex_buffer(&layout, 128, BufferMode::WRITE, BufferUsage::Dynamic);
	other.create(device.device(), None).unwrap();
	assert_ne!(other.terminal_entity().unwrap().id(), parked_id);

	other.destroy(device.device()).unwrap();
	device.destroy();
}

fn park_four_distinct_entities(
	device: &mut ember_gfx::device::DeviceEncapsulator,
) -> Vec<ember_gfx::device::EntityId> {
	let layout = float4_layout();

	// Four distinct keys, all 4096 bytes
	let combos = [
		(BufferMode::WRITE, BufferUsage::Dynamic),
		(BufferMode::WRITE_DISCARD, BufferUsage::Dynamic),
		(BufferMode::WRITE_NO_OVERWRITE, BufferUsage::Dynamic),
		(BufferMode::WRITE, BufferUsage::Default),
	];

	let mut parked = Vec::new();
	for (mode, usage) in combos {
		let mut buffer = sharable_vertex_buffer(&layout, 256, mode, usage);
		buffer.create(device.device(), None).unwrap();
		let id = buffer.terminal_entity().unwrap().id();
		buffer.destroy(device.device()).unwrap();
		parked.push(id);
	}

	parked
}

// Budgeted eviction walks from the least recently parked entity.
#[test]
fn lru_eviction_honors_the_byte_budget() {
	let mut device = headless_device();

	let parked = park_four_distinct_entities(&mut device);
	let size = 4096usize;
	assert_eq!(
		device.shared_entity_pool().used_memory().total_size_in_bytes(),
		(4 * size) as u64
	);

	let remaining = device.trim_video_memory(3 * size);
	assert_eq!(remaining, 3 * size);

	let pool = device.shared_entity_pool();
	assert!(!pool.contains_entity(parked[0]), "first parked entity is evicted");
	assert!(pool.contains_entity(parked[1]));
	assert!(pool.contains_entity(parked[2]));
	assert!(pool.contains_entity(parked[3]));

	device.destroy();
}

// A cooperative checkout pins its record against eviction until released.
#[test]
fn cooperative_locks_guard_eviction() {
	let mut device = headless_device();
	let layout = float4_layout();

	let mut buffer = sharable_vertex_buffer(&layout, 256, BufferMode::WRITE, BufferUsage::Dynamic);
	buffer.create(device.device(), None).unwrap();
	buffer.destroy(device.device()).unwrap();

	let key = buffer.shared_key();
	let pool = device.shared_entity_pool_mut();
	let id = pool.acquire_cooperative(&buffer).expect("pool hit").id();

	let remaining = pool.release_lru(0);
	assert_eq!(remaining, 4096, "locked entity survives a zero budget");
	assert!(pool.contains_entity(id));

	pool.release_cooperative(key, id);

	let remaining = pool.release_lru(0);
	assert_eq!(remaining, 0);
	assert!(!pool.contains_entity(id));

	device.destroy();
}
