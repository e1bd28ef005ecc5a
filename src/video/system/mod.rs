//! The render state tracker. `RenderSystem` owns the driver, the probed
//! capabilities, the resource managers and a shadow of the driver state, and
//! turns the state requested for each draw into the minimal set of driver
//! commands.

mod pipeline;
mod state;
mod texture_units;

pub use self::state::{SceneBlend, ShadowState, TextureUnitShadow};

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use crate::errors::*;
use crate::material::Material;
use crate::math::Color;
use crate::utils::hash::FastHashMap;
use crate::video::capabilities::{Capabilities, Capability};
use crate::video::config::RenderSystemParams;
use crate::video::driver::{self, Cap, ClientArray, Command, ContextHandle, Driver, WindowDesc};
use crate::video::program::{GpuProgram, GpuProgramManager, GpuProgramParameters};
use crate::video::resource::prelude::*;
use crate::video::types::*;
use crate::video::viewport::Viewport;

/// A vertex array enabled for the duration of one draw call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum VertexArray {
    Client(ClientArray),
    TexCoord(usize),
    Attribute(usize),
}

pub struct RenderSystem {
    driver: Arc<dyn Driver>,
    params: RenderSystemParams,
    caps: Capabilities,
    state: ShadowState,

    contexts: FastHashMap<ContextHandle, GLContext>,
    main_context: Option<ContextHandle>,
    current_context: Option<ContextHandle>,
    background_contexts: Mutex<Vec<(ThreadId, GLContext)>>,
    thread_init: Mutex<()>,

    programs: GpuProgramManager,
    buffers: HardwareBufferManager,
    targets: RenderTargetManager,
    textures: TextureManager,

    window: RenderTargetHandle,
    active_target: Option<RenderTargetHandle>,
    active_viewport: Option<usize>,
    viewport_height: i32,
    bound_programs: [Option<Arc<GpuProgram>>; 3],
    shutdown: bool,
}

impl RenderSystem {
    /// Creates the primary window and its context, probes the hardware and
    /// brings the driver into a known state.
    pub fn new(
        driver: Arc<dyn Driver>,
        params: RenderSystemParams,
        window: WindowDesc,
    ) -> Result<Self> {
        let main = driver.create_window(&window)?;

        let mut caps = Capabilities::probe(driver.as_ref())?;
        if let Some(units) = params.fixed_function_texture_units {
            caps.fixed_function_texture_units = units.min(caps.num_texture_units);
        }

        caps.log();

        let mut targets = RenderTargetManager::new(driver.clone(), &caps, params.depth_buffer_pool);
        let window = targets.create_window(window.title.clone(), main, &window);
        let textures = TextureManager::new(driver.clone(), params.warning_texture_size)?;
        let buffers = HardwareBufferManager::new(driver.clone(), &caps);
        let programs = GpuProgramManager::new(driver.clone(), params.auto_add_param_name);

        let mut contexts = FastHashMap::default();
        contexts.insert(
            main,
            GLContext {
                handle: main,
                initialized: true,
            },
        );

        let num_units = caps
            .num_texture_units
            .max(caps.fixed_function_texture_units)
            .max(1);

        let mut rs = RenderSystem {
            driver,
            params,
            caps,
            state: ShadowState::new(num_units),

            contexts,
            main_context: Some(main),
            current_context: Some(main),
            background_contexts: Mutex::new(Vec::new()),
            thread_init: Mutex::new(()),

            programs,
            buffers,
            targets,
            textures,

            window,
            active_target: None,
            active_viewport: None,
            viewport_height: 0,
            bound_programs: Default::default(),
            shutdown: false,
        };

        rs.one_time_context_initialization();
        rs.reset_render_state()?;

        info!(
            "RenderSystem is ready with {} texture units ({} fixed-function).",
            rs.caps.num_texture_units, rs.caps.fixed_function_texture_units
        );

        Ok(rs)
    }

    #[inline]
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    #[inline]
    pub fn params(&self) -> &RenderSystemParams {
        &self.params
    }

    /// The shadow of the driver state.
    #[inline]
    pub fn state(&self) -> &ShadowState {
        &self.state
    }

    /// The render target of the primary window.
    #[inline]
    pub fn primary_window(&self) -> RenderTargetHandle {
        self.window
    }

    #[inline]
    pub fn main_context(&self) -> Option<ContextHandle> {
        self.main_context
    }

    #[inline]
    pub fn current_context(&self) -> Option<ContextHandle> {
        self.current_context
    }

    #[inline]
    pub fn programs(&self) -> &GpuProgramManager {
        &self.programs
    }

    #[inline]
    pub fn programs_mut(&mut self) -> &mut GpuProgramManager {
        &mut self.programs
    }

    #[inline]
    pub fn buffers(&self) -> &HardwareBufferManager {
        &self.buffers
    }

    #[inline]
    pub fn buffers_mut(&mut self) -> &mut HardwareBufferManager {
        &mut self.buffers
    }

    #[inline]
    pub fn targets(&self) -> &RenderTargetManager {
        &self.targets
    }

    #[inline]
    pub fn targets_mut(&mut self) -> &mut RenderTargetManager {
        &mut self.targets
    }

    #[inline]
    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    #[inline]
    pub fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    /// Creates a render target drawing into `face` at mip `level` of `texture`.
    pub fn create_render_texture<T: Into<String>>(
        &mut self,
        name: T,
        texture: TextureHandle,
        face: CubeFace,
        level: u32,
    ) -> Result<RenderTargetHandle> {
        let surface = self
            .textures
            .get(texture)
            .and_then(|v| v.surface(face, level, 0))
            .ok_or_else(|| Error::HandleInvalid(format!("{}", texture)))?;

        let context = self.current_context.ok_or(Error::MainContextMissing)?;
        self.targets
            .create_render_texture(name, context, texture, surface, &self.caps)
    }

    pub fn create_multi_render_target<T: Into<String>>(
        &mut self,
        name: T,
    ) -> Result<RenderTargetHandle> {
        let context = self.current_context.ok_or(Error::MainContextMissing)?;
        Ok(self.targets.create_multi_render_target(name, context))
    }

    /// Compiles `material` against the probed hardware. Passes are split to
    /// fit the texture units if `auto_manage_texture_units` is configured.
    pub fn compile_material(&self, material: &mut Material) {
        material.compile(&self.caps, self.params.auto_manage_texture_units);
    }

    /// Brings the driver and the shadow state into the same baseline.
    pub fn reset_render_state(&mut self) -> Result<()> {
        let num_units = self.state.units.len();
        self.state = ShadowState::new(num_units);

        let cmds = [
            Command::Disable(Cap::CullFace),
            Command::FrontFace(FrontFaceOrder::CounterClockwise),
            Command::Enable(Cap::DepthTest),
            Command::DepthMask(true),
            Command::DepthFunc(CompareFunction::LessEqual),
            Command::Disable(Cap::PolygonOffsetFill),
            Command::Disable(Cap::Blend),
            Command::BlendFunc(SceneBlendFactor::One, SceneBlendFactor::Zero),
            Command::ColorMask(true, true, true, true),
            Command::Disable(Cap::StencilTest),
            Command::StencilMask(0xFFFF_FFFF),
            Command::Disable(Cap::ScissorTest),
            Command::Disable(Cap::Lighting),
            Command::LightModelAmbient(Color::black()),
            Command::Disable(Cap::AlphaTest),
            Command::ShadeModel(ShadeOptions::Gouraud),
            Command::PolygonMode(PolygonMode::Solid),
            Command::Disable(Cap::Normalize),
            Command::Disable(Cap::Fog),
            Command::BindFramebuffer(0),
        ];

        for cmd in cmds.iter() {
            self.driver.apply(cmd.clone());
        }

        self.state.scene_blend = Some(SceneBlend::new(
            SceneBlendFactor::One,
            SceneBlendFactor::Zero,
            SceneBlendOperation::Add,
        ));

        driver::check(self.driver.as_ref())
    }

    /// Driver state every context needs once, right after it was created.
    fn one_time_context_initialization(&self) {
        self.driver.apply(Command::LightModelSeparateSpecular(true));
        self.driver.apply(Command::LightModelLocalViewer(true));
        self.driver.apply(Command::Enable(Cap::ColorSum));
        self.driver.apply(Command::Disable(Cap::Dither));

        if self.params.fsaa > 0 && self.caps.has(Capability::Multisample) {
            self.driver.apply(Command::Enable(Cap::Multisample));
        }
    }

    /// Makes `context` current. Programs, lights and texture units are released
    /// before the switch, programs are bound again afterwards.
    pub fn switch_context(&mut self, context: ContextHandle) -> Result<()> {
        for v in self.bound_programs.iter() {
            if let Some(ref program) = *v {
                program.unbind();
            }
        }

        for i in 0..self.state.enabled_lights {
            self.driver.apply(Command::Disable(Cap::Light(i)));
        }

        self.state.enabled_lights = 0;
        self.disable_texture_units_from(0)?;

        if let Some(current) = self.current_context {
            self.driver.end_current(current);
        }

        self.current_context = Some(context);
        self.driver.make_current(context);

        let initialized = {
            let ctx = self
                .contexts
                .entry(context)
                .or_insert_with(|| GLContext::new(context));

            let initialized = ctx.initialized;
            ctx.initialized = true;
            initialized
        };

        if !initialized {
            debug!("Initializing {}.", context);
            self.one_time_context_initialization();
        }

        for v in self.bound_programs.iter() {
            if let Some(ref program) = *v {
                program.bind();
            }
        }

        // The new context has its own masks.
        let [r, g, b, a] = self.state.color_write;
        self.driver.apply(Command::DepthMask(self.state.depth_write));
        self.driver.apply(Command::ColorMask(r, g, b, a));
        self.driver.apply(Command::StencilMask(self.state.stencil_mask));

        driver::check(self.driver.as_ref())
    }

    /// Stops rendering into `context`. Falls back to the main context, or
    /// releases everything if `context` is the main context.
    pub fn unregister_context(&mut self, context: ContextHandle) -> Result<()> {
        if self.current_context == Some(context) {
            match self.main_context {
                Some(main) if main != context => self.switch_context(main)?,
                _ => {
                    self.driver.end_current(context);
                    self.current_context = None;
                    self.main_context = None;
                }
            }
        }

        self.contexts.remove(&context);
        Ok(())
    }

    /// Creates a context sharing objects with the main context, and makes it
    /// current on the calling thread.
    pub fn register_thread(&self) -> Result<ContextHandle> {
        let _guard = lock(&self.thread_init);

        let main = self.main_context.ok_or(Error::MainContextMissing)?;
        let handle = self.driver.create_shared_context(main)?;

        self.driver.make_current(handle);
        self.one_time_context_initialization();

        let ctx = GLContext {
            handle,
            initialized: true,
        };

        lock(&self.background_contexts).push((thread::current().id(), ctx));
        debug!("Registered {} for thread {:?}.", handle, thread::current().id());
        Ok(handle)
    }

    /// Releases the context of the calling thread.
    pub fn unregister_thread(&self) -> Result<()> {
        let _guard = lock(&self.thread_init);

        let id = thread::current().id();
        let ctx = {
            let mut contexts = lock(&self.background_contexts);
            match contexts.iter().position(|v| v.0 == id) {
                Some(index) => contexts.remove(index).1,
                None => return Ok(()),
            }
        };

        self.driver.end_current(ctx.handle);
        self.driver.destroy_context(ctx.handle)
    }

    /// Releases the current context so background threads can register.
    pub fn pre_extra_threads_started(&self) {
        let _guard = lock(&self.thread_init);
        if let Some(ctx) = self.current_context {
            self.driver.end_current(ctx);
        }
    }

    pub fn post_extra_threads_started(&self) {
        let _guard = lock(&self.thread_init);
        if let Some(ctx) = self.current_context {
            self.driver.make_current(ctx);
        }
    }

    #[inline]
    pub fn num_background_contexts(&self) -> usize {
        lock(&self.background_contexts).len()
    }

    #[inline]
    pub fn active_render_target(&self) -> Option<RenderTargetHandle> {
        self.active_target
    }

    /// Redirects rendering into `handle`, switching context and provisioning
    /// depth buffers as required.
    pub fn set_render_target(&mut self, handle: RenderTargetHandle) -> Result<()> {
        if let Some(prev) = self.active_target {
            self.targets.unbind(prev);
        }

        let (context, is_window, gamma) = {
            let target = self
                .targets
                .get(handle)
                .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))?;

            (
                target.context(),
                target.fbo().is_none(),
                target.is_hardware_gamma_enabled(),
            )
        };

        if is_window {
            if self.current_context != Some(context) {
                self.switch_context(context)?;
            }
        } else {
            let current = self.current_context.ok_or(Error::MainContextMissing)?;
            self.targets.ensure_depth(handle, current, &self.caps)?;
        }

        self.targets.bind(handle);

        if self.caps.has(Capability::HardwareGamma) {
            if gamma {
                self.driver.apply(Command::Enable(Cap::FramebufferSrgb));
            } else {
                self.driver.apply(Command::Disable(Cap::FramebufferSrgb));
            }
        }

        self.active_target = Some(handle);
        driver::check(self.driver.as_ref())
    }

    /// Sets the viewport and scissor rectangle. Nothing happens if `vp` is the
    /// active viewport and has not been updated since.
    pub fn set_viewport(&mut self, vp: &mut Viewport) -> Result<()> {
        if self.active_viewport == Some(vp.id()) && !vp.is_updated() {
            return Ok(());
        }

        self.set_render_target(vp.target())?;

        let (x, w, h) = (vp.actual_left(), vp.actual_width(), vp.actual_height());
        let mut y = vp.actual_top();

        if !self.requires_flipping() {
            y = self.target_height() - y - h;
        }

        self.driver.apply(Command::Enable(Cap::ScissorTest));
        self.driver.apply(Command::Viewport(x, y, w, h));
        self.driver.apply(Command::Scissor(x, y, w, h));

        self.active_viewport = Some(vp.id());
        self.viewport_height = h;
        vp.clear_updated();

        driver::check(self.driver.as_ref())
    }

    pub fn begin_frame(&mut self) -> Result<()> {
        if self.active_viewport.is_none() {
            return Err(Error::InvalidConfiguration(
                "a frame can not begin without an active viewport".to_owned(),
            ));
        }

        self.driver.apply(Command::Enable(Cap::ScissorTest));
        Ok(())
    }

    /// Forgets the texture blend modes of every unit but the first, so that
    /// multitexturing is set up completely in the next frame.
    pub fn end_frame(&mut self) {
        for unit in self.state.units.iter_mut().skip(1) {
            unit.color_blend = None;
            unit.alpha_blend = None;
        }
    }

    /// Issues a draw call.
    pub fn render(&mut self, op: &RenderOperation) -> Result<()> {
        let (vertex_buffer, stride) = {
            let buf = self
                .buffers
                .get(op.vertex_buffer)
                .ok_or_else(|| Error::HandleInvalid(format!("{}", op.vertex_buffer)))?;

            let stride = match buf.kind() {
                HardwareBufferKind::Vertex { stride, .. } => stride,
                HardwareBufferKind::Index { .. } => {
                    return Err(Error::InvalidConfiguration(format!(
                        "{} is not a vertex buffer",
                        op.vertex_buffer
                    )));
                }
            };

            let id = buf
                .id()
                .ok_or(Error::Unimplemented("Rendering from system memory buffers"))?;

            (id, stride)
        };

        self.driver.apply(Command::BindBuffer(vertex_buffer));
        let arrays = self.bind_vertex_declaration(&op.vertex_declaration, stride);

        match op.indices {
            Some(ref indices) => {
                let buf = self
                    .buffers
                    .get(indices.buffer)
                    .ok_or_else(|| Error::HandleInvalid(format!("{}", indices.buffer)))?;

                let format = match buf.kind() {
                    HardwareBufferKind::Index { format, .. } => format,
                    HardwareBufferKind::Vertex { .. } => {
                        return Err(Error::InvalidConfiguration(format!(
                            "{} is not an index buffer",
                            indices.buffer
                        )));
                    }
                };

                let id = buf
                    .id()
                    .ok_or(Error::Unimplemented("Rendering from system memory buffers"))?;

                self.driver.apply(Command::BindBuffer(id));
                self.driver.apply(Command::DrawElements(
                    op.operation_type,
                    indices.count,
                    format,
                    indices.start,
                ));
            }
            None => {
                self.driver.apply(Command::DrawArrays(
                    op.operation_type,
                    op.vertex_start,
                    op.vertex_count,
                ));
            }
        }

        self.unbind_vertex_arrays(&arrays);
        driver::check(self.driver.as_ref())
    }

    /// Points the vertex arrays at the elements of the bound vertex buffer,
    /// and returns the arrays that were enabled.
    fn bind_vertex_declaration(
        &mut self,
        declaration: &[VertexElement],
        stride: usize,
    ) -> Vec<VertexArray> {
        let mut arrays = Vec::new();
        let programmable = self.is_gpu_program_bound(GpuProgramType::Fragment);

        for element in declaration {
            let array = match element.semantic {
                VertexElementSemantic::Position => ClientArray::Vertex,
                VertexElementSemantic::Normal => ClientArray::Normal,
                VertexElementSemantic::Diffuse => ClientArray::Color,
                VertexElementSemantic::Specular => ClientArray::SecondaryColor,
                VertexElementSemantic::TexCoords => {
                    // Programs read coordinate sets directly, fixed units
                    // read the set they were assigned.
                    let units: Vec<usize> = if programmable {
                        vec![element.index]
                    } else {
                        self.state
                            .units
                            .iter()
                            .take(self.caps.fixed_function_texture_units)
                            .enumerate()
                            .filter(|(_, v)| v.coord_set == element.index)
                            .map(|(i, _)| i)
                            .collect()
                    };

                    for unit in units {
                        self.driver.apply(Command::ClientActiveTexture(unit));
                        self.driver.apply(Command::ArrayPointer {
                            array: ClientArray::TexCoord,
                            format: element.format,
                            stride,
                            offset: element.offset,
                        });
                        self.driver
                            .apply(Command::EnableClientState(ClientArray::TexCoord));
                        arrays.push(VertexArray::TexCoord(unit));
                    }

                    self.driver.apply(Command::ClientActiveTexture(0));
                    continue;
                }
                semantic => {
                    if !self.is_gpu_program_bound(GpuProgramType::Vertex) {
                        debug!(
                            "Skipped {:?} vertex element without a vertex program.",
                            semantic
                        );
                        continue;
                    }

                    if let Some(index) = semantic.attribute_index() {
                        self.driver.apply(Command::VertexAttribPointer {
                            index,
                            format: element.format,
                            stride,
                            offset: element.offset,
                        });
                        self.driver.apply(Command::EnableVertexAttribArray(index));
                        arrays.push(VertexArray::Attribute(index));
                    }

                    continue;
                }
            };

            self.driver.apply(Command::ArrayPointer {
                array,
                format: element.format,
                stride,
                offset: element.offset,
            });
            self.driver.apply(Command::EnableClientState(array));
            arrays.push(VertexArray::Client(array));
        }

        arrays
    }

    fn unbind_vertex_arrays(&mut self, arrays: &[VertexArray]) {
        let mut texcoords = false;
        for v in arrays {
            match *v {
                VertexArray::Client(array) => {
                    self.driver.apply(Command::DisableClientState(array));
                }
                VertexArray::TexCoord(unit) => {
                    self.driver.apply(Command::ClientActiveTexture(unit));
                    self.driver
                        .apply(Command::DisableClientState(ClientArray::TexCoord));
                    texcoords = true;
                }
                VertexArray::Attribute(index) => {
                    self.driver.apply(Command::DisableVertexAttribArray(index));
                }
            }
        }

        if texcoords {
            self.driver.apply(Command::ClientActiveTexture(0));
        }
    }

    /// Clears the buffers of the active render target. Write masks are forced
    /// on for the clear and restored afterwards.
    pub fn clear_frame_buffer(
        &mut self,
        buffers: FrameBufferType,
        color: Color,
        depth: f32,
        stencil: i32,
    ) -> Result<()> {
        let depth_write = self.state.depth_write;
        let [r, g, b, a] = self.state.color_write;
        let color_mask = !(r && g && b && a);

        if !depth_write {
            self.driver.apply(Command::DepthMask(true));
        }

        if color_mask {
            self.driver.apply(Command::ColorMask(true, true, true, true));
        }

        self.driver.apply(Command::ClearColor(color));
        self.driver.apply(Command::ClearDepth(depth));
        self.driver.apply(Command::ClearStencil(stencil));
        self.driver.apply(Command::Clear(buffers));

        if !depth_write {
            self.driver.apply(Command::DepthMask(false));
        }

        if color_mask {
            self.driver.apply(Command::ColorMask(r, g, b, a));
        }

        driver::check(self.driver.as_ref())
    }

    pub fn bind_gpu_program(&mut self, program: &Arc<GpuProgram>) -> Result<()> {
        if !program.is_supported(&self.caps) {
            return Err(Error::CapabilityMissing(format!(
                "program '{}' with syntax '{}'",
                program.name(),
                program.syntax()
            )));
        }

        let index = program.program_type().index();
        if let Some(ref current) = self.bound_programs[index] {
            if Arc::ptr_eq(current, program) {
                return Ok(());
            }

            current.unbind();
        }

        program.bind();
        self.bound_programs[index] = Some(program.clone());
        driver::check(self.driver.as_ref())
    }

    /// Uploads `params` to the program bound to the `ty` stage.
    pub fn bind_gpu_program_parameters(
        &mut self,
        ty: GpuProgramType,
        params: &GpuProgramParameters,
    ) -> Result<()> {
        match self.bound_programs[ty.index()] {
            Some(ref program) => {
                program.upload_parameters(params);
                driver::check(self.driver.as_ref())
            }
            None => Ok(()),
        }
    }

    pub fn unbind_gpu_program(&mut self, ty: GpuProgramType) {
        if let Some(program) = self.bound_programs[ty.index()].take() {
            program.unbind();
        }
    }

    #[inline]
    pub fn is_gpu_program_bound(&self, ty: GpuProgramType) -> bool {
        self.bound_programs[ty.index()].is_some()
    }

    /// Releases every resource in dependency order: programs, hardware buffers,
    /// render targets, background contexts, the driver and finally textures.
    pub fn shutdown(&mut self) {
        if self.shutdown {
            return;
        }

        self.shutdown = true;
        self.bound_programs = Default::default();

        self.programs.unload_all();
        self.buffers.delete_all();
        self.targets.delete_all();

        let background: Vec<_> = lock(&self.background_contexts).drain(..).collect();
        for (_, ctx) in background {
            self.driver.end_current(ctx.handle);
            if let Err(err) = self.driver.destroy_context(ctx.handle) {
                warn!("Failed to destroy {}. {}", ctx.handle, err);
            }
        }

        self.driver.stop();
        self.textures.delete_all();

        self.contexts.clear();
        self.current_context = None;
        self.main_context = None;
        self.active_target = None;
        self.active_viewport = None;

        info!("RenderSystem has been shut down.");
    }

    /// Returns true if polygon winding must be flipped for the active target.
    fn flipping(&self) -> bool {
        self.requires_flipping() ^ self.params.invert_vertex_winding
    }

    fn requires_flipping(&self) -> bool {
        self.active_target
            .and_then(|v| self.targets.get(v))
            .map(|v| v.requires_flipping())
            .unwrap_or(false)
    }

    fn target_height(&self) -> i32 {
        self.active_target
            .and_then(|v| self.targets.get(v))
            .map(|v| v.height() as i32)
            .unwrap_or(0)
    }
}

impl Drop for RenderSystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    match mutex.lock() {
        Ok(v) => v,
        Err(err) => err.into_inner(),
    }
}
