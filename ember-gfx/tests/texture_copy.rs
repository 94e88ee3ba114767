mod common;

use glam::UVec2;

use ember_gfx::device::{Aabb2u, BufferMode, BufferUsage, CubeFace, Texture2d, TextureCube};
use ember_gfx::surface_format::SurfaceFormatType;
use ember_gfx::Texture;

use common::headless_device;


fn staging_texture(width: u32, height: u32, levels: u32) -> Texture2d {
	let mut texture = Texture2d::new(
		width,
		height,
		levels,
		SurfaceFormatType::R8G8B8A8,
		BufferMode::READ_WRITE,
		BufferUsage::Staging,
		false,
	);
	texture.freeze();
	texture
}

#[test]
fn sub_region_copies_move_the_right_texels() {
	let mut device = headless_device();

	let mut source = staging_texture(16, 16, 1);
	source.create(device.device(), None).unwrap();

	// Every texel holds its linear index
	let texels: Vec<u8> = (0..16 * 16 * 4).map(|v| (v % 251) as u8).collect();
	source.set_data(device.device(), 0, &texels).unwrap();

	let mut destination = staging_texture(16, 16, 1);
	destination.create(device.device(), None).unwrap();

	// 8x8 texels from the source origin land at (4, 4)
	destination
		.copy_sub_part(
			device.device(),
			0,
			UVec2::new(4, 4),
			&source,
			0,
			Aabb2u::new(UVec2::ZERO, UVec2::new(8, 8)),
		)
		.unwrap();

	let mut read_back = vec![0u8; 16 * 16 * 4];
	destination.get_data(device.device(), 0, &mut read_back).unwrap();

	let pitch = 16 * 4;
	for y in 0..16usize {
		for x in 0..16usize {
			let offset = y * pitch + x * 4;
			let inside = (4..12).contains(&x) && (4..12).contains(&y);

			if inside {
				let src_offset = (y - 4) * pitch + (x - 4) * 4;
				assert_eq!(
					&read_back[offset..offset + 4],
					&texels[src_offset..src_offset + 4],
					"texel ({x}, {y})"
				);
			} else {
				assert_eq!(&read_back[offset..offset + 4], &[0, 0, 0, 0], "texel ({x}, {y})");
			}
		}
	}

	source.destroy(device.device()).unwrap();
	destination.destroy(device.device()).unwrap();
	device.destroy();
}

#[test]
fn mip_levels_are_separate_copy_targets() {
	let mut device = headless_device();

	let mut source = staging_texture(8, 8, 2);
	source.create(device.device(), None).unwrap();

	// Fill the 4x4 mip (level 1), which sits after the 8x8 level
	let level1_offset = 8 * 8 * 4;
	let level1: Vec<u8> = (0..4 * 4 * 4).map(|v| 0x40 + (v % 64) as u8).collect();
	source.set_data(device.device(), level1_offset, &level1).unwrap();

	let mut destination = staging_texture(8, 8, 2);
	destination.create(device.device(), None).unwrap();

	destination
		.copy_sub_part(
			device.device(),
			1,
			UVec2::ZERO,
			&source,
			1,
			Aabb2u::new(UVec2::ZERO, UVec2::new(4, 4)),
		)
		.unwrap();

	let mut read_back = vec![0u8; 4 * 4 * 4];
	destination
		.get_data(device.device(), level1_offset, &mut read_back)
		.unwrap();
	assert_eq!(read_back, level1);

	source.destroy(device.device()).unwrap();
	destination.destroy(device.device()).unwrap();
	device.destroy();
}

#[test]
fn cube_faces_address_distinct_sub_resources() {
	let mut device = headless_device();

	let mut cube = TextureCube::new(
		8,
		8,
		2,
		SurfaceFormatType::R8G8B8A8,
		BufferMode::READ_WRITE,
		BufferUsage::Staging,
		false,
	);
	cube.freeze();

	// level + face * level_count
	assert_eq!(cube.sub_resource_index(CubeFace::PositiveX, 0), 0);
	assert_eq!(cube.sub_resource_index(CubeFace::NegativeX, 1), 3);
	assert_eq!(cube.sub_resource_index(CubeFace::NegativeZ, 1), 11);

	cube.create(device.device(), None).unwrap();

	let face_size = cube.face_size_in_bytes();
	assert_eq!(cube.size_in_bytes(), face_size * 6);

	// Write into +X level 0, copy across to -Z level 0
	let face_texels: Vec<u8> = (0..8 * 8 * 4).map(|v| (v % 199) as u8).collect();
	cube.set_data(device.device(), 0, &face_texels).unwrap();

	let mut other = TextureCube::new(
		8,
		8,
		2,
		SurfaceFormatType::R8G8B8A8,
		BufferMode::READ_WRITE,
		BufferUsage::Staging,
		false,
	);
	other.freeze();
	other.create(device.device(), None).unwrap();

	other
		.copy_sub_part(
			device.device(),
			CubeFace::NegativeZ,
			0,
			UVec2::ZERO,
			&cube,
			CubeFace::PositiveX,
			0,
			Aabb2u::new(UVec2::ZERO, UVec2::new(8, 8)),
		)
		.unwrap();

	let negative_z_offset = face_size * CubeFace::NegativeZ as usize;
	let mut read_back = vec![0u8; 8 * 8 * 4];
	other
		.get_data(device.device(), negative_z_offset, &mut read_back)
		.unwrap();
	assert_eq!(read_back, face_texels);

	cube.destroy(device.device()).unwrap();
	other.destroy(device.device()).unwrap();
	device.destroy();
}
