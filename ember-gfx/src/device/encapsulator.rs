use glam::{UVec2, Vec4};
use raw_window_handle::RawWindowHandle;
use tracing::{debug, info};

use crate::device::backend::{
	ClearOptions, DeviceApiBackend, DeviceApiContext, DeviceApiEncapsulator,
	DeviceApiShaderCompiler, DeviceError, DeviceResult, ShaderCompileError,
};
use crate::device::buffer::UpdateRoute;
use crate::device::entity::TerminalEntity;
use crate::device::geometry::{IndexBuffer, PrimitiveType, VertexBuffer, VertexDeclaration};
use crate::device::headless::HeadlessBackend;
use crate::device::pool::SharedEntityPool;
use crate::device::presentation::{PresentationParameters, Viewport};
use crate::device::shader::{
	ConstantBuffer, ShaderCompiled, ShaderEffect, ShaderProfileType, ShaderProgram,
	ShaderProgramType, ShaderSource,
};
use crate::device::sharable::DeviceResourceSharable;
use crate::device::state::{BlendState, DepthStencilState, RasterizerState, SamplerState};
use crate::device::texture::{Aabb2u, DepthStencil, RenderTarget, Texture, Texture2d, TextureCube};
use crate::device::{DeviceApi, DeviceRevision, DeviceStatus};
use crate::event::Event;
use crate::memory::MemoryTracking;
use crate::thread_bound::ThreadBound;


/// Snapshot handed to device lifecycle event subscribers.
#[derive(Debug, Copy, Clone)]
pub struct DeviceEventArgs {
	pub api: DeviceApi,
	pub status: DeviceStatus,
	pub revision: DeviceRevision,
}

/// Thread-owned façade over one graphics device.
///
/// Owns the concrete backend and the shared entity pool, enforces the
/// `Invalid -> Create -> Normal -> Reset/Destroy` state machine, stamps
/// entities with the monotonic frame revision, and validates every bound
/// resource as frozen and available before dispatch. Implements the same
/// device/context/compiler traits as a backend so resources talk to it
/// directly; sharable creates and destroys route through the pool first.
pub struct DeviceEncapsulator {
	thread: ThreadBound,
	status: DeviceStatus,
	revision: DeviceRevision,
	backend: Option<Box<dyn DeviceApiBackend>>,
	pool: Option<SharedEntityPool>,
	video_memory: MemoryTracking,
	on_device_create: Event<DeviceEventArgs>,
	on_device_destroy: Event<DeviceEventArgs>,
	on_device_reset: Event<DeviceEventArgs>,
	on_device_present: Event<DeviceEventArgs>,
}

impl DeviceEncapsulator {
	pub fn new() -> DeviceEncapsulator {
		DeviceEncapsulator {
			thread: ThreadBound::new(),
			status: DeviceStatus::Invalid,
			revision: DeviceRevision(0),
			backend: None,
			pool: None,
			video_memory: MemoryTracking::new("DeviceEncapsulator"),
			on_device_create: Event::new(),
			on_device_destroy: Event::new(),
			on_device_reset: Event::new(),
			on_device_present: Event::new(),
		}
	}

	pub fn status(&self) -> DeviceStatus {
		self.status
	}

	pub fn revision(&self) -> DeviceRevision {
		self.revision
	}

	pub fn video_memory(&self) -> &MemoryTracking {
		&self.video_memory
	}

	pub fn owned_by_this_thread(&self) -> bool {
		self.thread.owned_by_this_thread()
	}

	#[track_caller]
	pub fn check_thread_id(&self) {
		self.thread.check_thread_id();
	}

	pub fn parameters(&self) -> &PresentationParameters {
		self.check_thread_id();
		self.backend().parameters()
	}

	pub fn shared_entity_pool(&self) -> &SharedEntityPool {
		self.check_thread_id();
		self.pool.as_ref().expect("no device is created")
	}

	pub fn shared_entity_pool_mut(&mut self) -> &mut SharedEntityPool {
		self.check_thread_id();
		self.pool.as_mut().expect("no device is created")
	}

	/// Evicts unlocked pooled entities until at most `target_size_in_bytes`
	/// stay parked. Returns the bytes still held by the pool.
	pub fn trim_video_memory(&mut self, target_size_in_bytes: usize) -> usize {
		self.check_thread_id();

		let pool = self.pool.as_mut().expect("no device is created");
		let before_count = pool.used_memory().allocation_count();
		let before_bytes = pool.used_memory().total_size_in_bytes();

		let remaining = pool.release_lru(target_size_in_bytes);

		let freed_count = before_count - pool.used_memory().allocation_count();
		let freed_bytes = before_bytes - pool.used_memory().total_size_in_bytes();
		self.video_memory.deallocate(freed_count, freed_bytes);

		remaining
	}

	pub fn device(&mut self) -> &mut dyn DeviceApiEncapsulator {
		self
	}

	pub fn immediate(&mut self) -> &mut dyn DeviceApiContext {
		self
	}

	pub fn shader_compiler(&mut self) -> &mut dyn DeviceApiShaderCompiler {
		self
	}

	// Lifecycle events

	pub fn on_device_create(&mut self) -> &mut Event<DeviceEventArgs> {
		&mut self.on_device_create
	}

	pub fn on_device_destroy(&mut self) -> &mut Event<DeviceEventArgs> {
		&mut self.on_device_destroy
	}

	pub fn on_device_reset(&mut self) -> &mut Event<DeviceEventArgs> {
		&mut self.on_device_reset
	}

	pub fn on_device_present(&mut self) -> &mut Event<DeviceEventArgs> {
		&mut self.on_device_present
	}

	/// Builds the backend for `api` and brings the device to `Normal`.
	pub fn create(
		&mut self,
		api: DeviceApi,
		window: Option<RawWindowHandle>,
		parameters: &PresentationParameters,
	) -> DeviceResult<()> {
		self.check_thread_id();
		assert!(self.backend.is_none());
		assert!(self.status == DeviceStatus::Invalid);

		info!(api = api.as_str(), "creating device");
		self.status = DeviceStatus::Create;

		let backend: Box<dyn DeviceApiBackend> = match api {
			DeviceApi::Headless => {
				let _ = window;
				Box::new(HeadlessBackend::new(parameters.clone()))
			}
			// The concrete translations live outside the core; hook them up
			// here when linking a real backend in.
			DeviceApi::DirectX11 | DeviceApi::OpenGl4 => {
				self.status = DeviceStatus::Invalid;
				return Err(DeviceError::BackendUnavailable { api });
			}
		};

		self.backend = Some(backend);
		assert!(self.pool.is_none());
		self.pool = Some(SharedEntityPool::new());

		let args = self.event_args();
		self.on_device_create.emit(&args);

		assert!(self.status == DeviceStatus::Create);
		self.status = DeviceStatus::Normal;
		Ok(())
	}

	/// Tears the device down back to `Invalid`. Every client-held resource
	/// must have been destroyed first; parked pool entities are disposed
	/// here.
	pub fn destroy(&mut self) {
		self.check_thread_id();
		assert!(self.backend.is_some());
		assert!(
			self.status == DeviceStatus::Normal
				|| self.status == DeviceStatus::Invalid && self.revision == DeviceRevision(0),
			"destroy is only legal from Normal or after a reset"
		);

		info!(api = self.backend().api().as_str(), "destroying device");
		self.status = DeviceStatus::Destroy;

		self.backend_mut().clear_state();

		let pool = self.pool.as_mut().expect("no device is created");
		let parked_count = pool.used_memory().allocation_count();
		let parked_bytes = pool.used_memory().total_size_in_bytes();
		pool.release_all();
		self.video_memory.deallocate(parked_count, parked_bytes);
		self.pool = None;

		let args = self.event_args();
		self.on_device_destroy.emit(&args);

		self.backend = None;

		assert!(self.status == DeviceStatus::Destroy);
		self.status = DeviceStatus::Invalid;
	}

	/// Rebuilds the swap chain. The device leaves `Reset` as `Invalid` with
	/// its revision back at zero; it must be destroyed and re-created
	/// before further use.
	pub fn reset(&mut self, parameters: &PresentationParameters) -> DeviceResult<()> {
		self.check_thread_id();
		assert!(self.status == DeviceStatus::Normal);

		info!(api = self.backend().api().as_str(), "resetting device");
		self.status = DeviceStatus::Reset;
		self.revision = DeviceRevision(0);

		// Entities parked against the old swap chain are disposed.
		let pool = self.pool.as_mut().expect("no device is created");
		let parked_count = pool.used_memory().allocation_count();
		let parked_bytes = pool.used_memory().total_size_in_bytes();
		pool.release_all();
		self.video_memory.deallocate(parked_count, parked_bytes);

		let result = self.backend_mut().reset(parameters);

		let args = self.event_args();
		self.on_device_reset.emit(&args);

		assert!(self.status == DeviceStatus::Reset);
		self.status = DeviceStatus::Invalid;
		result
	}

	/// Flips the swap chain and advances the frame revision.
	pub fn present(&mut self) -> DeviceResult<()> {
		self.check_thread_id();
		assert!(self.status == DeviceStatus::Normal);

		self.backend_mut().present()?;
		self.revision = DeviceRevision(self.revision.0 + 1);

		let args = self.event_args();
		self.on_device_present.emit(&args);
		Ok(())
	}

	pub fn clear_state(&mut self) {
		self.check_thread_id();
		assert!(self.status == DeviceStatus::Normal);
		self.backend_mut().clear_state();
	}
}

/// Internal plumbing
impl DeviceEncapsulator {
	fn event_args(&self) -> DeviceEventArgs {
		DeviceEventArgs {
			api: self.backend().api(),
			status: self.status,
			revision: self.revision,
		}
	}

	fn backend(&self) -> &dyn DeviceApiBackend {
		self.backend.as_deref().expect("no device is created")
	}

	fn backend_mut(&mut self) -> &mut dyn DeviceApiBackend {
		self.backend.as_deref_mut().expect("no device is created")
	}

	#[track_caller]
	fn check_operational(&self) {
		self.check_thread_id();
		assert!(
			self.status == DeviceStatus::Create || self.status == DeviceStatus::Normal,
			"device operation in state {:?}",
			self.status
		);
	}

	#[track_caller]
	fn check_bindable(&self) {
		self.check_thread_id();
		assert!(self.status == DeviceStatus::Normal, "bind in state {:?}", self.status);
	}

	fn stamp(&self, entity: Option<&TerminalEntity>) {
		entity
			.expect("binding a resource that is not available")
			.set_last_used(self.revision);
	}

	/// Pool-aware create: a sharable resource first tries to recycle a
	/// compatible parked entity; only a miss reaches the backend.
	fn create_entity_with(
		&mut self,
		sharable: Option<&dyn DeviceResourceSharable>,
		create: impl FnOnce(&mut dyn DeviceApiBackend) -> DeviceResult<TerminalEntity>,
	) -> DeviceResult<TerminalEntity> {
		self.check_operational();

		if let Some(resource) = sharable {
			if resource.sharable() {
				let pool = self.pool.as_mut().expect("no device is created");
				if let Some(entity) = pool.acquire_exclusive(resource) {
					debug!(entity = entity.id().0, "recycled pooled entity");
					return Ok(entity);
				}
			}
		}

		let revision = self.revision;
		let mut entity = create(self.backend_mut())?;
		entity.set_created_at(revision);
		self.video_memory.allocate(1, entity.video_memory_size_in_bytes() as u64);
		Ok(entity)
	}

	/// Pool-aware destroy: a sharable resource parks its detached entity
	/// instead of disposing it.
	fn destroy_entity_with(
		&mut self,
		sharable: Option<&dyn DeviceResourceSharable>,
		entity: TerminalEntity,
		destroy: impl FnOnce(&mut dyn DeviceApiBackend, TerminalEntity) -> DeviceResult<()>,
	) -> DeviceResult<()> {
		self.check_thread_id();
		assert!(
			self.status == DeviceStatus::Create
				|| self.status == DeviceStatus::Normal
				|| self.status == DeviceStatus::Destroy
		);

		if let Some(resource) = sharable {
			if resource.sharable() {
				let key = resource.shared_key();
				self.pool
					.as_mut()
					.expect("no device is created")
					.release_exclusive(key, entity);
				return Ok(());
			}
		}

		self.video_memory.deallocate(1, entity.video_memory_size_in_bytes() as u64);
		destroy(self.backend_mut(), entity)
	}
}

impl DeviceApiEncapsulator for DeviceEncapsulator {
	fn api(&self) -> DeviceApi {
		self.check_thread_id();
		self.backend().api()
	}

	fn set_viewport(&mut self, viewport: Viewport) {
		self.check_bindable();
		self.backend_mut().set_viewport(viewport);
	}

	fn set_viewports(&mut self, viewports: &[Viewport]) {
		self.check_bindable();
		self.backend_mut().set_viewports(viewports);
	}

	fn create_index_buffer(
		&mut self,
		index_buffer: &IndexBuffer,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(Some(index_buffer), |backend| {
			backend.create_index_buffer(index_buffer, initial_data)
		})
	}

	fn destroy_index_buffer(
		&mut self,
		index_buffer: &IndexBuffer,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(Some(index_buffer), entity, |backend, entity| {
			backend.destroy_index_buffer(index_buffer, entity)
		})
	}

	fn create_vertex_buffer(
		&mut self,
		vertex_buffer: &VertexBuffer,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(Some(vertex_buffer), |backend| {
			backend.create_vertex_buffer(vertex_buffer, initial_data)
		})
	}

	fn destroy_vertex_buffer(
		&mut self,
		vertex_buffer: &VertexBuffer,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(Some(vertex_buffer), entity, |backend, entity| {
			backend.destroy_vertex_buffer(vertex_buffer, entity)
		})
	}

	fn buffer_get_data(
		&mut self,
		entity: &TerminalEntity,
		offset: usize,
		dst: &mut [u8],
	) -> DeviceResult<()> {
		self.check_operational();
		self.backend_mut().buffer_get_data(entity, offset, dst)
	}

	fn buffer_set_data(
		&mut self,
		entity: &mut TerminalEntity,
		offset: usize,
		src: &[u8],
		route: UpdateRoute,
	) -> DeviceResult<()> {
		self.check_operational();
		self.backend_mut().buffer_set_data(entity, offset, src, route)
	}

	fn buffer_copy(&mut self, dst: &mut TerminalEntity, src: &TerminalEntity) -> DeviceResult<()> {
		self.check_operational();
		self.backend_mut().buffer_copy(dst, src)
	}

	fn buffer_copy_sub_part(
		&mut self,
		dst: &mut TerminalEntity,
		dst_offset: usize,
		src: &TerminalEntity,
		src_offset: usize,
		length: usize,
	) -> DeviceResult<()> {
		self.check_operational();
		self.backend_mut()
			.buffer_copy_sub_part(dst, dst_offset, src, src_offset, length)
	}

	fn create_vertex_declaration(
		&mut self,
		declaration: &VertexDeclaration,
	) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(None, |backend| backend.create_vertex_declaration(declaration))
	}

	fn destroy_vertex_declaration(
		&mut self,
		declaration: &VertexDeclaration,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(None, entity, |backend, entity| {
			backend.destroy_vertex_declaration(declaration, entity)
		})
	}

	fn create_constant_buffer(
		&mut self,
		constant_buffer: &ConstantBuffer,
	) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(Some(constant_buffer), |backend| {
			backend.create_constant_buffer(constant_buffer)
		})
	}

	fn destroy_constant_buffer(
		&mut self,
		constant_buffer: &ConstantBuffer,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(Some(constant_buffer), entity, |backend, entity| {
			backend.destroy_constant_buffer(constant_buffer, entity)
		})
	}

	fn create_shader_program(&mut self, program: &ShaderProgram) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(Some(program), |backend| backend.create_shader_program(program))
	}

	fn destroy_shader_program(
		&mut self,
		program: &ShaderProgram,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(Some(program), entity, |backend, entity| {
			backend.destroy_shader_program(program, entity)
		})
	}

	fn create_shader_effect(&mut self, effect: &ShaderEffect) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(None, |backend| backend.create_shader_effect(effect))
	}

	fn destroy_shader_effect(
		&mut self,
		effect: &ShaderEffect,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(None, entity, |backend, entity| {
			backend.destroy_shader_effect(effect, entity)
		})
	}

	fn create_blend_state(&mut self, state: &BlendState) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(None, |backend| backend.create_blend_state(state))
	}

	fn destroy_blend_state(
		&mut self,
		state: &BlendState,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(None, entity, |backend, entity| {
			backend.destroy_blend_state(state, entity)
		})
	}

	fn create_rasterizer_state(&mut self, state: &RasterizerState) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(None, |backend| backend.create_rasterizer_state(state))
	}

	fn destroy_rasterizer_state(
		&mut self,
		state: &RasterizerState,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(None, entity, |backend, entity| {
			backend.destroy_rasterizer_state(state, entity)
		})
	}

	fn create_depth_stencil_state(
		&mut self,
		state: &DepthStencilState,
	) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(None, |backend| backend.create_depth_stencil_state(state))
	}

	fn destroy_depth_stencil_state(
		&mut self,
		state: &DepthStencilState,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(None, entity, |backend, entity| {
			backend.destroy_depth_stencil_state(state, entity)
		})
	}

	fn create_sampler_state(&mut self, state: &SamplerState) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(None, |backend| backend.create_sampler_state(state))
	}

	fn destroy_sampler_state(
		&mut self,
		state: &SamplerState,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(None, entity, |backend, entity| {
			backend.destroy_sampler_state(state, entity)
		})
	}

	fn create_texture_2d(
		&mut self,
		texture: &Texture2d,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(Some(texture), |backend| {
			backend.create_texture_2d(texture, initial_data)
		})
	}

	fn destroy_texture_2d(
		&mut self,
		texture: &Texture2d,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(Some(texture), entity, |backend, entity| {
			backend.destroy_texture_2d(texture, entity)
		})
	}

	fn create_texture_cube(
		&mut self,
		texture: &TextureCube,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(Some(texture), |backend| {
			backend.create_texture_cube(texture, initial_data)
		})
	}

	fn destroy_texture_cube(
		&mut self,
		texture: &TextureCube,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(Some(texture), entity, |backend, entity| {
			backend.destroy_texture_cube(texture, entity)
		})
	}

	fn create_render_target(
		&mut self,
		render_target: &RenderTarget,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(Some(&**render_target), |backend| {
			backend.create_render_target(render_target, initial_data)
		})
	}

	fn destroy_render_target(
		&mut self,
		render_target: &RenderTarget,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(Some(&**render_target), entity, |backend, entity| {
			backend.destroy_render_target(render_target, entity)
		})
	}

	fn create_depth_stencil(
		&mut self,
		depth_stencil: &DepthStencil,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<TerminalEntity> {
		self.create_entity_with(Some(&**depth_stencil), |backend| {
			backend.create_depth_stencil(depth_stencil, initial_data)
		})
	}

	fn destroy_depth_stencil(
		&mut self,
		depth_stencil: &DepthStencil,
		entity: TerminalEntity,
	) -> DeviceResult<()> {
		self.destroy_entity_with(Some(&**depth_stencil), entity, |backend, entity| {
			backend.destroy_depth_stencil(depth_stencil, entity)
		})
	}

	fn texture_get_data(
		&mut self,
		entity: &TerminalEntity,
		offset: usize,
		dst: &mut [u8],
	) -> DeviceResult<()> {
		self.check_operational();
		self.backend_mut().texture_get_data(entity, offset, dst)
	}

	fn texture_set_data(
		&mut self,
		entity: &mut TerminalEntity,
		offset: usize,
		src: &[u8],
	) -> DeviceResult<()> {
		self.check_operational();
		self.backend_mut().texture_set_data(entity, offset, src)
	}

	fn texture_copy(&mut self, dst: &mut TerminalEntity, src: &TerminalEntity) -> DeviceResult<()> {
		self.check_operational();
		self.backend_mut().texture_copy(dst, src)
	}

	fn texture_copy_sub_part(
		&mut self,
		dst: &mut TerminalEntity,
		dst_sub_resource: u32,
		dst_pos: UVec2,
		src: &TerminalEntity,
		src_sub_resource: u32,
		src_box: Aabb2u,
	) -> DeviceResult<()> {
		self.check_operational();
		self.backend_mut().texture_copy_sub_part(
			dst,
			dst_sub_resource,
			dst_pos,
			src,
			src_sub_resource,
			src_box,
		)
	}

	fn back_buffer_render_target(&self) -> &RenderTarget {
		self.check_thread_id();
		self.backend().back_buffer_render_target()
	}

	fn back_buffer_depth_stencil(&self) -> &DepthStencil {
		self.check_thread_id();
		self.backend().back_buffer_depth_stencil()
	}

	fn set_render_targets(
		&mut self,
		render_targets: &[&RenderTarget],
		depth_stencil: Option<&DepthStencil>,
	) {
		self.check_bindable();

		for render_target in render_targets {
			assert!(render_target.resource_base().frozen());
			self.stamp(render_target.terminal_entity());
		}
		if let Some(depth_stencil) = depth_stencil {
			assert!(depth_stencil.resource_base().frozen());
			self.stamp(depth_stencil.terminal_entity());
		}

		self.backend_mut().set_render_targets(render_targets, depth_stencil);
	}

	fn clear_render_target(&mut self, render_target: &RenderTarget, color: Vec4) {
		self.check_bindable();
		assert!(render_target.resource_base().frozen());
		assert!(render_target.available());
		self.backend_mut().clear_render_target(render_target, color);
	}

	fn clear_depth_stencil(
		&mut self,
		depth_stencil: &DepthStencil,
		options: ClearOptions,
		depth: f32,
		stencil: u8,
	) {
		self.check_bindable();
		assert!(depth_stencil.resource_base().frozen());
		assert!(depth_stencil.available());
		self.backend_mut().clear_depth_stencil(depth_stencil, options, depth, stencil);
	}
}

impl DeviceApiContext for DeviceEncapsulator {
	fn set_blend_state(&mut self, state: &BlendState) {
		self.check_bindable();
		assert!(state.resource_base().frozen());
		self.stamp(state.terminal_entity());
		self.backend_mut().set_blend_state(state);
	}

	fn set_rasterizer_state(&mut self, state: &RasterizerState) {
		self.check_bindable();
		assert!(state.resource_base().frozen());
		self.stamp(state.terminal_entity());
		self.backend_mut().set_rasterizer_state(state);
	}

	fn set_depth_stencil_state(&mut self, state: &DepthStencilState) {
		self.check_bindable();
		assert!(state.resource_base().frozen());
		self.stamp(state.terminal_entity());
		self.backend_mut().set_depth_stencil_state(state);
	}

	fn set_sampler_state(&mut self, stage: ShaderProgramType, slot: usize, state: &SamplerState) {
		self.check_bindable();
		assert!(state.resource_base().frozen());
		self.stamp(state.terminal_entity());
		self.backend_mut().set_sampler_state(stage, slot, state);
	}

	fn set_index_buffer(&mut self, index_buffer: &IndexBuffer, offset: usize) {
		self.check_bindable();
		assert!(index_buffer.resource_base().frozen());
		self.stamp(index_buffer.terminal_entity());
		self.backend_mut().set_index_buffer(index_buffer, offset);
	}

	fn set_vertex_buffer(&mut self, vertex_buffer: &VertexBuffer, vertex_offset: usize) {
		self.check_bindable();
		assert!(vertex_buffer.resource_base().frozen());
		self.stamp(vertex_buffer.terminal_entity());
		self.backend_mut().set_vertex_buffer(vertex_buffer, vertex_offset);
	}

	fn set_shader_effect(&mut self, effect: &ShaderEffect) {
		self.check_bindable();
		assert!(effect.resource_base().frozen());
		self.stamp(effect.terminal_entity());
		self.backend_mut().set_shader_effect(effect);
	}

	fn set_constant_buffer(
		&mut self,
		stage: ShaderProgramType,
		slot: usize,
		constant_buffer: &ConstantBuffer,
	) {
		self.check_bindable();
		assert!(constant_buffer.resource_base().frozen());
		self.stamp(constant_buffer.terminal_entity());
		self.backend_mut().set_constant_buffer(stage, slot, constant_buffer);
	}

	fn set_texture(&mut self, stage: ShaderProgramType, slot: usize, texture: &dyn Texture) {
		self.check_bindable();
		assert!(texture.frozen());
		self.stamp(texture.terminal_entity());
		self.backend_mut().set_texture(stage, slot, texture);
	}

	fn draw_primitives(
		&mut self,
		primitive_type: PrimitiveType,
		start_vertex: usize,
		primitive_count: usize,
	) {
		self.check_bindable();
		self.backend_mut().draw_primitives(primitive_type, start_vertex, primitive_count);
	}

	fn draw_indexed_primitives(
		&mut self,
		primitive_type: PrimitiveType,
		base_vertex: usize,
		start_index: usize,
		primitive_count: usize,
	) {
		self.check_bindable();
		self.backend_mut().draw_indexed_primitives(
			primitive_type,
			base_vertex,
			start_index,
			primitive_count,
		);
	}

	fn draw_instanced_primitives(
		&mut self,
		primitive_type: PrimitiveType,
		base_vertex: usize,
		start_index: usize,
		primitive_count: usize,
		start_instance: usize,
		instance_count: usize,
	) {
		self.check_bindable();
		self.backend_mut().draw_instanced_primitives(
			primitive_type,
			base_vertex,
			start_index,
			primitive_count,
			start_instance,
			instance_count,
		);
	}

	fn clear_state(&mut self) {
		self.check_bindable();
		self.backend_mut().clear_state();
	}
}

impl DeviceApiShaderCompiler for DeviceEncapsulator {
	fn compile_shader(
		&mut self,
		source: &ShaderSource,
		entry_point: &str,
		program_type: ShaderProgramType,
		profile_type: ShaderProfileType,
	) -> Result<ShaderCompiled, ShaderCompileError> {
		self.check_thread_id();
		self.backend_mut().compile_shader(source, entry_point, program_type, profile_type)
	}

	fn preprocess_shader(&mut self, source: &ShaderSource) -> Result<String, ShaderCompileError> {
		self.check_thread_id();
		self.backend_mut().preprocess_shader(source)
	}
}

impl Default for DeviceEncapsulator {
	fn default() -> DeviceEncapsulator {
		DeviceEncapsulator::new()
	}
}

impl Drop for DeviceEncapsulator {
	fn drop(&mut self) {
		if !std::thread::panicking() {
			debug_assert!(
				self.status == DeviceStatus::Invalid && self.backend.is_none(),
				"device encapsulator dropped without being destroyed"
			);
		}
	}
}
