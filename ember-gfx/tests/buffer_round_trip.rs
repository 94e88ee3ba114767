mod common;

use ember_gfx::device::{BufferMode, BufferUsage, VertexBuffer};

use common::{float4_layout, headless_device};


// Fill a dynamic buffer, copy it into a staging buffer, read it back.
#[test]
fn dynamic_write_copies_through_staging_read() {
	let mut device = headless_device();
	let layout = float4_layout();

	let mut source = VertexBuffer::new(
		layout.clone(),
		256,
		BufferMode::WRITE,
		BufferUsage::Dynamic,
		false,
	);
	source.freeze();
	source.create(device.device(), None).unwrap();
	assert!(source.available());
	assert_eq!(source.size_in_bytes(), 4096);

	let pattern = vec![0xAAu8; 4096];
	source.set_data(device.device(), 0, &pattern).unwrap();

	let mut staging = VertexBuffer::new(
		layout.clone(),
		256,
		BufferMode::READ,
		BufferUsage::Staging,
		false,
	);
	staging.freeze();
	staging.create(device.device(), None).unwrap();

	staging.copy_from(device.device(), &source).unwrap();

	let mut read_back = vec![0u8; 4096];
	staging.get_data(device.device(), 0, &mut read_back).unwrap();
	assert!(read_back.iter().all(|&byte| byte == 0xAA));

	source.destroy(device.device()).unwrap();
	staging.destroy(device.device()).unwrap();
	device.destroy();
}

#[test]
fn partial_writes_land_at_the_right_elements() {
	let mut device = headless_device();
	let layout = float4_layout();

	let mut buffer = VertexBuffer::new(
		layout.clone(),
		8,
		BufferMode::WRITE,
		BufferUsage::Dynamic,
		false,
	);
	buffer.freeze();
	buffer.create(device.device(), None).unwrap();

	// Two vertices written at element offset 3
	let chunk = vec![0x5Cu8; 32];
	buffer.set_data(device.device(), 3, &chunk).unwrap();

	let mut staging = VertexBuffer::new(
		layout.clone(),
		8,
		BufferMode::READ,
		BufferUsage::Staging,
		false,
	);
	staging.freeze();
	staging.create(device.device(), None).unwrap();
	staging.copy_from(device.device(), &buffer).unwrap();

	let mut read_back = vec![0u8; 128];
	staging.get_data(device.device(), 0, &mut read_back).unwrap();

	for (index, &byte) in read_back.iter().enumerate() {
		let expected = if (48..80).contains(&index) { 0x5C } else { 0 };
		assert_eq!(byte, expected, "byte {index}");
	}

	buffer.destroy(device.device()).unwrap();
	staging.destroy(device.device()).unwrap();
	device.destroy();
}

#[test]
fn sub_part_copies_respect_both_offsets() {
	let mut device = headless_device();
	let layout = float4_layout();

	let mut source = VertexBuffer::new(
		layout.clone(),
		4,
		BufferMode::WRITE,
		BufferUsage::Dynamic,
		false,
	);
	source.freeze();
	source.create(device.device(), None).unwrap();

	let payload: Vec<u8> = (0..64).collect();
	source.set_data(device.device(), 0, &payload).unwrap();

	let mut destination = VertexBuffer::new(
		layout.clone(),
		4,
		BufferMode::READ_WRITE,
		BufferUsage::Staging,
		false,
	);
	destination.freeze();
	destination.create(device.device(), None).unwrap();

	// 16 bytes from source offset 32 land at destination offset 8
	destination
		.copy_sub_part(device.device(), 8, &source, 32, 16)
		.unwrap();

	let mut read_back = vec![0u8; 64];
	destination.get_data(device.device(), 0, &mut read_back).unwrap();
	assert_eq!(&read_back[8..24], &payload[32..48]);
	assert!(read_back[..8].iter().all(|&b| b == 0));
	assert!(read_back[24..].iter().all(|&b| b == 0));

	source.destroy(device.device()).unwrap();
	destination.destroy(device.device()).unwrap();
	device.destroy();
}

#[test]
fn immutable_buffers_take_their_content_at_create() {
	let mut device = headless_device();
	let layout = float4_layout();

	let content: Vec<u8> = (0..32).map(|v| v * 3).collect();

	let mut immutable = VertexBuffer::new(
		layout.clone(),
		2,
		BufferMode::NONE,
		BufferUsage::Immutable,
		false,
	);
	immutable.freeze();
	immutable.create(device.device(), Some(&content)).unwrap();

	let mut staging = VertexBuffer::new(
		layout.clone(),
		2,
		BufferMode::READ,
		BufferUsage::Staging,
		false,
	);
	staging.freeze();
	staging.create(device.device(), None).unwrap();
	staging.copy_from(device.device(), &immutable).unwrap();

	let mut read_back = vec![0u8; 32];
	staging.get_data(device.device(), 0, &mut read_back).unwrap();
	assert_eq!(read_back, content);

	immutable.destroy(device.device()).unwrap();
	staging.destroy(device.device()).unwrap();
	device.destroy();
}
