//! An in-memory driver that records every call, used to run the render system
//! without a graphics device.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::*;
use crate::utils::hash::FastHashMap;
use crate::video::capabilities::Extensions;
use crate::video::types::{CubeFace, GpuProgramType, PixelRegion};

/// A call received by the `HeadlessDriver`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(ObjectKind, u32),
    Delete(ObjectKind, u32),
    Command(Command),
    CheckFramebufferStatus,
    LoadProgram(GpuProgramType, u32),
    Download(DownloadSource),
    CreateWindow(ContextHandle),
    CreateSharedContext(ContextHandle, ContextHandle),
    MakeCurrent(ContextHandle),
    EndCurrent(ContextHandle),
    DestroyContext(ContextHandle),
    Stop,
}

#[derive(Debug, Clone)]
struct Image {
    bpp: usize,
    width: u32,
    height: u32,
    depth: u32,
    bytes: Vec<u8>,
}

struct HeadlessState {
    next_id: u32,
    next_context: u32,
    current: Option<ContextHandle>,
    calls: Vec<Call>,
    errors: VecDeque<DriverError>,
    framebuffer_status: FramebufferStatus,
    program_error: Option<ProgramError>,
    fail_deletes: bool,
    buffers: FastHashMap<u32, Vec<u8>>,
    images: FastHashMap<(u32, CubeFace, u32), Image>,
}

pub struct HeadlessDriver {
    version: String,
    vendor: String,
    renderer: String,
    extensions: Vec<String>,
    limits: FastHashMap<Limit, i32>,
    state: Mutex<HeadlessState>,
}

impl Default for HeadlessDriver {
    fn default() -> Self {
        HeadlessDriver::new()
    }
}

impl HeadlessDriver {
    /// Creates a driver reporting OpenGL 2.1 with every known extension.
    pub fn new() -> Self {
        let mut limits = FastHashMap::default();
        limits.insert(Limit::MaxTextureUnits, 4);
        limits.insert(Limit::MaxTextureImageUnits, 16);
        limits.insert(Limit::MaxLights, 8);
        limits.insert(Limit::MaxClipPlanes, 6);
        limits.insert(Limit::StencilBits, 8);
        limits.insert(Limit::MaxColorAttachments, 4);
        limits.insert(Limit::MaxDrawBuffers, 4);
        limits.insert(Limit::MaxVertexUniformComponents, 1024);
        limits.insert(Limit::MaxFragmentUniformComponents, 1024);
        limits.insert(Limit::MaxTextureMaxAnisotropy, 16);
        limits.insert(Limit::MaxTextureSize, 4096);

        HeadlessDriver {
            version: "2.1.0 Headless".to_owned(),
            vendor: "pigment".to_owned(),
            renderer: "headless".to_owned(),
            extensions: Extensions::names().iter().map(|v| (*v).to_owned()).collect(),
            limits,
            state: Mutex::new(HeadlessState {
                next_id: 1,
                next_context: 1,
                current: None,
                calls: Vec::new(),
                errors: VecDeque::new(),
                framebuffer_status: FramebufferStatus::Complete,
                program_error: None,
                fail_deletes: false,
                buffers: FastHashMap::default(),
                images: FastHashMap::default(),
            }),
        }
    }

    pub fn with_version<T: Into<String>>(mut self, version: T) -> Self {
        self.version = version.into();
        self
    }

    /// Replaces the reported extension list.
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|v| (*v).to_owned()).collect();
        self
    }

    pub fn without_extension(mut self, extension: &str) -> Self {
        self.extensions.retain(|v| v != extension);
        self
    }

    pub fn with_limit(mut self, limit: Limit, value: i32) -> Self {
        self.limits.insert(limit, value);
        self
    }

    pub fn set_framebuffer_status(&self, status: FramebufferStatus) {
        self.state().framebuffer_status = status;
    }

    /// Queues an error returned by the next `get_error`.
    pub fn push_error(&self, err: DriverError) {
        self.state().errors.push_back(err);
    }

    /// Sets the diagnostics reported after every following program load.
    pub fn set_program_error(&self, err: Option<ProgramError>) {
        self.state().program_error = err;
    }

    /// Makes every following `delete` fail, as if the context was already gone.
    pub fn fail_deletes(&self, fail: bool) {
        self.state().fail_deletes = fail;
    }

    pub fn current_context(&self) -> Option<ContextHandle> {
        self.state().current
    }

    /// Returns every call received so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Returns the state-changing commands received so far.
    pub fn commands(&self) -> Vec<Command> {
        self.state()
            .calls
            .iter()
            .filter_map(|v| match *v {
                Call::Command(ref cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    /// Counts how many times `cmd` was applied.
    pub fn count(&self, cmd: &Command) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|v| match *v {
                Call::Command(ref c) => c == cmd,
                _ => false,
            })
            .count()
    }

    /// Counts the calls matching `f`.
    pub fn count_calls<F: Fn(&Call) -> bool>(&self, f: F) -> usize {
        self.state().calls.iter().filter(|v| f(v)).count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn state(&self) -> MutexGuard<HeadlessState> {
        match self.state.lock() {
            Ok(v) => v,
            Err(err) => err.into_inner(),
        }
    }

    fn record(&self, call: Call) {
        self.state().calls.push(call);
    }
}

impl Driver for HeadlessDriver {
    fn version(&self) -> String {
        self.version.clone()
    }

    fn vendor(&self) -> String {
        self.vendor.clone()
    }

    fn renderer(&self) -> String {
        self.renderer.clone()
    }

    fn extensions(&self) -> Vec<String> {
        self.extensions.clone()
    }

    fn get_integer(&self, limit: Limit) -> i32 {
        self.limits.get(&limit).cloned().unwrap_or(0)
    }

    fn get_error(&self) -> Option<DriverError> {
        self.state().errors.pop_front()
    }

    fn create(&self, kind: ObjectKind) -> u32 {
        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;
        state.calls.push(Call::Create(kind, id));
        id
    }

    fn delete(&self, kind: ObjectKind, id: u32) -> Result<()> {
        let mut state = self.state();
        state.calls.push(Call::Delete(kind, id));

        if state.fail_deletes {
            return Err(Error::Driver(format!(
                "{} {:?}({}) is not a valid name.",
                DriverError::InvalidValue,
                kind,
                id
            )));
        }

        state.buffers.remove(&id);
        state.images.retain(|k, _| k.0 != id);
        Ok(())
    }

    fn apply(&self, cmd: Command) {
        let mut state = self.state();

        match cmd {
            Command::BufferData { id, size, .. } => {
                state.buffers.insert(id, vec![0; size]);
            }
            Command::BufferSubData {
                id,
                offset,
                ref data,
            } => {
                let buf = state.buffers.entry(id).or_insert_with(Vec::new);
                if buf.len() < offset + data.len() {
                    buf.resize(offset + data.len(), 0);
                }
                buf[offset..offset + data.len()].copy_from_slice(data);
            }
            Command::TexImage {
                id,
                face,
                level,
                format,
                width,
                height,
                depth,
                ..
            } => {
                let bpp = format.bytes();
                let len = bpp * (width * height * depth) as usize;
                let image = Image {
                    bpp,
                    width,
                    height,
                    depth,
                    bytes: vec![0; len],
                };
                state.images.insert((id, face, level), image);
            }
            Command::TexSubImage {
                id,
                face,
                level,
                region,
                ref data,
                ..
            } => {
                if let Some(image) = state.images.get_mut(&(id, face, level)) {
                    write_region(image, region, data);
                }
            }
            _ => {}
        }

        state.calls.push(Call::Command(cmd));
    }

    fn check_framebuffer_status(&self) -> FramebufferStatus {
        let mut state = self.state();
        state.calls.push(Call::CheckFramebufferStatus);
        state.framebuffer_status
    }

    fn load_program(&self, ty: GpuProgramType, id: u32, _: &str) {
        self.record(Call::LoadProgram(ty, id));
    }

    fn program_error(&self) -> Option<ProgramError> {
        self.state().program_error.clone()
    }

    fn download(&self, src: DownloadSource) -> Result<Vec<u8>> {
        let mut state = self.state();
        state.calls.push(Call::Download(src));

        let (bytes, len) = match src {
            DownloadSource::Buffer { id, offset, len } => {
                let bytes = state
                    .buffers
                    .get(&id)
                    .map(|v| v.iter().skip(offset).take(len).cloned().collect())
                    .unwrap_or_else(Vec::new);
                (bytes, len)
            }
            DownloadSource::Texture {
                id,
                face,
                level,
                len,
                ..
            } => {
                let bytes = state
                    .images
                    .get(&(id, face, level))
                    .map(|v| v.bytes.clone())
                    .unwrap_or_else(Vec::new);
                (bytes, len)
            }
        };

        let mut bytes = bytes;
        bytes.resize(len, 0);
        Ok(bytes)
    }

    fn create_window(&self, _: &WindowDesc) -> Result<ContextHandle> {
        let mut state = self.state();
        let ctx = ContextHandle(state.next_context);
        state.next_context += 1;
        state.current = Some(ctx);
        state.calls.push(Call::CreateWindow(ctx));
        Ok(ctx)
    }

    fn create_shared_context(&self, main: ContextHandle) -> Result<ContextHandle> {
        let mut state = self.state();
        let ctx = ContextHandle(state.next_context);
        state.next_context += 1;
        state.calls.push(Call::CreateSharedContext(main, ctx));
        Ok(ctx)
    }

    fn make_current(&self, ctx: ContextHandle) {
        let mut state = self.state();
        state.current = Some(ctx);
        state.calls.push(Call::MakeCurrent(ctx));
    }

    fn end_current(&self, ctx: ContextHandle) {
        let mut state = self.state();
        if state.current == Some(ctx) {
            state.current = None;
        }
        state.calls.push(Call::EndCurrent(ctx));
    }

    fn destroy_context(&self, ctx: ContextHandle) -> Result<()> {
        self.record(Call::DestroyContext(ctx));
        Ok(())
    }

    fn stop(&self) {
        self.record(Call::Stop);
    }
}

fn write_region(image: &mut Image, region: PixelRegion, data: &[u8]) {
    let bpp = image.bpp;
    let row = region.width() as usize * bpp;

    let mut src = 0;
    for z in region.front..region.back.min(image.depth) {
        for y in region.top..region.bottom.min(image.height) {
            let dst = ((z * image.height + y) * image.width + region.left) as usize * bpp;
            if src + row > data.len() || dst + row > image.bytes.len() {
                return;
            }

            image.bytes[dst..dst + row].copy_from_slice(&data[src..src + row]);
            src += row;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::types::{BufferUsage, PixelFormat, TextureType};

    #[test]
    fn record() {
        let driver = HeadlessDriver::new();
        let id = driver.create(ObjectKind::Buffer);
        driver.apply(Command::BindBuffer(id));
        driver.apply(Command::BindBuffer(id));

        assert_eq!(driver.count(&Command::BindBuffer(id)), 2);
        assert_eq!(driver.calls()[0], Call::Create(ObjectKind::Buffer, id));

        driver.clear_calls();
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn storage() {
        let driver = HeadlessDriver::new();
        let id = driver.create(ObjectKind::Buffer);
        driver.apply(Command::BufferData {
            id,
            size: 8,
            usage: BufferUsage::Dynamic,
        });
        driver.apply(Command::BufferSubData {
            id,
            offset: 2,
            data: vec![1, 2, 3],
        });

        let src = DownloadSource::Buffer {
            id,
            offset: 0,
            len: 8,
        };
        assert_eq!(driver.download(src).unwrap(), vec![0, 0, 1, 2, 3, 0, 0, 0]);

        let tex = driver.create(ObjectKind::Texture);
        driver.apply(Command::TexImage {
            ty: TextureType::TwoD,
            id: tex,
            face: CubeFace::PositiveX,
            level: 0,
            format: PixelFormat::L8,
            width: 4,
            height: 4,
            depth: 1,
        });
        driver.apply(Command::TexSubImage {
            ty: TextureType::TwoD,
            id: tex,
            face: CubeFace::PositiveX,
            level: 0,
            region: PixelRegion::rect(1, 1, 3, 2),
            data: vec![7, 9],
        });

        let src = DownloadSource::Texture {
            ty: TextureType::TwoD,
            id: tex,
            face: CubeFace::PositiveX,
            level: 0,
            len: 16,
        };
        let bytes = driver.download(src).unwrap();
        assert_eq!(&bytes[4..8], &[0, 7, 9, 0]);
    }

    #[test]
    fn errors() {
        let driver = HeadlessDriver::new();
        assert!(check(&driver).is_ok());

        driver.push_error(DriverError::OutOfMemory);
        assert!(check(&driver).is_err());
        assert!(check(&driver).is_ok());

        driver.fail_deletes(true);
        assert!(driver.delete(ObjectKind::Texture, 1).is_err());
    }
}
