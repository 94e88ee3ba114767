mod common;

use std::cell::Cell;
use std::rc::Rc;

use ember_gfx::device::{DeviceApi, DeviceEncapsulator, DeviceError, DeviceRevision, DeviceStatus};
use ember_gfx::{DeviceApiEncapsulator, Texture};

use common::{headless_device, presentation_parameters};


#[test]
fn create_present_destroy_walks_the_state_machine() {
	let mut device = DeviceEncapsulator::new();
	assert_eq!(device.status(), DeviceStatus::Invalid);

	device
		.create(DeviceApi::Headless, None, &presentation_parameters())
		.unwrap();
	assert_eq!(device.status(), DeviceStatus::Normal);
	assert_eq!(device.revision(), DeviceRevision(0));
	assert_eq!(device.api(), DeviceApi::Headless);

	for _ in 0..3 {
		device.present().unwrap();
	}
	assert_eq!(device.revision(), DeviceRevision(3));

	device.destroy();
	assert_eq!(device.status(), DeviceStatus::Invalid);
}

#[test]
fn unavailable_backends_fail_cleanly() {
	let mut device = DeviceEncapsulator::new();

	let result = device.create(DeviceApi::DirectX11, None, &presentation_parameters());
	assert!(matches!(
		result,
		Err(DeviceError::BackendUnavailable { api: DeviceApi::DirectX11 })
	));

	// The failed create leaves the machine where it started
	assert_eq!(device.status(), DeviceStatus::Invalid);
}

#[test]
#[should_panic]
fn present_from_invalid_is_a_state_error() {
	let mut device = DeviceEncapsulator::new();
	let _ = device.present();
}

#[test]
fn lifecycle_events_fire_in_order() {
	let created = Rc::new(Cell::new(0u32));
	let presented = Rc::new(Cell::new(0u32));
	let destroyed = Rc::new(Cell::new(0u32));

	let mut device = DeviceEncapsulator::new();

	let hits = created.clone();
	device.on_device_create().subscribe(move |args| {
		assert_eq!(args.status, DeviceStatus::Create);
		hits.set(hits.get() + 1);
	});

	let hits = presented.clone();
	device.on_device_present().subscribe(move |args| {
		assert_eq!(args.status, DeviceStatus::Normal);
		hits.set(hits.get() + 1);
	});

	let hits = destroyed.clone();
	device.on_device_destroy().subscribe(move |args| {
		assert_eq!(args.status, DeviceStatus::Destroy);
		hits.set(hits.get() + 1);
	});

	device
		.create(DeviceApi::Headless, None, &presentation_parameters())
		.unwrap();
	device.present().unwrap();
	device.present().unwrap();
	device.destroy();

	assert_eq!(created.get(), 1);
	assert_eq!(presented.get(), 2);
	assert_eq!(destroyed.get(), 1);
}

#[test]
fn reset_rewinds_the_revision_and_invalidates() {
	let mut device = headless_device();

	device.present().unwrap();
	device.present().unwrap();
	assert_eq!(device.revision(), DeviceRevision(2));

	device.reset(&presentation_parameters()).unwrap();
	assert_eq!(device.status(), DeviceStatus::Invalid);
	assert_eq!(device.revision(), DeviceRevision(0));

	// A reset device can only be torn down and rebuilt
	device.destroy();
	assert_eq!(device.status(), DeviceStatus::Invalid);

	device
		.create(DeviceApi::Headless, None, &presentation_parameters())
		.unwrap();
	assert_eq!(device.status(), DeviceStatus::Normal);
	device.destroy();
}

#[test]
fn back_buffers_match_the_presentation_parameters() {
	let mut device = headless_device();

	{
		let back_buffer = device.device().back_buffer_render_target();
		assert_eq!(back_buffer.width(), 640);
		assert_eq!(back_buffer.height(), 480);
	}

	{
		let depth = device.device().back_buffer_depth_stencil();
		assert!(depth.format().is_depth());
	}

	device.destroy();
}
