//! Vertex and index buffers.

use std::sync::Arc;

use crate::errors::*;
use crate::utils::object_pool::ObjectPool;
use crate::video::capabilities::{Capabilities, Capability};
use crate::video::driver::{Command, DownloadSource, Driver, ObjectKind};
use crate::video::types::*;

impl_handle!(HardwareBufferHandle);

/// The layout of the elements of a buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardwareBufferKind {
    Vertex { stride: usize, len: usize },
    Index { format: IndexType, len: usize },
}

impl HardwareBufferKind {
    pub fn size_in_bytes(self) -> usize {
        match self {
            HardwareBufferKind::Vertex { stride, len } => stride * len,
            HardwareBufferKind::Index { format, len } => format.stride() * len,
        }
    }
}

/// A byte range of driver memory, or of system memory if the driver has no
/// buffer objects.
#[derive(Debug)]
pub struct HardwareBuffer {
    driver: Arc<dyn Driver>,
    id: Option<u32>,
    kind: HardwareBufferKind,
    usage: BufferUsage,
    staging: Option<Vec<u8>>,
    lock: Option<(usize, usize, LockOptions)>,
}

impl HardwareBuffer {
    fn new(
        driver: Arc<dyn Driver>,
        kind: HardwareBufferKind,
        usage: BufferUsage,
        system_memory: bool,
    ) -> Self {
        let size = kind.size_in_bytes();

        let (id, staging) = if system_memory {
            (None, Some(vec![0; size]))
        } else {
            let id = driver.create(ObjectKind::Buffer);
            driver.apply(Command::BufferData { id, size, usage });
            (Some(id), None)
        };

        HardwareBuffer {
            driver,
            id,
            kind,
            usage,
            staging,
            lock: None,
        }
    }

    /// The driver buffer object, `None` for system memory buffers.
    #[inline]
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    #[inline]
    pub fn is_system_memory(&self) -> bool {
        self.id.is_none()
    }

    #[inline]
    pub fn kind(&self) -> HardwareBufferKind {
        self.kind
    }

    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.kind.size_in_bytes()
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    /// Locks `len` bytes from `offset` for CPU access.
    pub fn lock(&mut self, offset: usize, len: usize, options: LockOptions) -> Result<&mut [u8]> {
        if self.lock.is_some() {
            return Err(Error::AlreadyLocked);
        }

        if offset + len > self.size_in_bytes() {
            return Err(Error::OutOfBounds);
        }

        if let Some(id) = self.id {
            if self.staging.is_none() {
                self.staging = Some(vec![0; self.size_in_bytes()]);
            }

            if options != LockOptions::Discard && !self.usage.is_write_only() {
                let bytes = self
                    .driver
                    .download(DownloadSource::Buffer { id, offset, len })?;

                if let Some(ref mut staging) = self.staging {
                    let n = bytes.len().min(len);
                    staging[offset..offset + n].copy_from_slice(&bytes[..n]);
                }
            }
        }

        self.lock = Some((offset, len, options));

        match self.staging {
            Some(ref mut v) => Ok(&mut v[offset..offset + len]),
            None => Err(Error::NotLocked),
        }
    }

    pub fn unlock(&mut self) -> Result<()> {
        let (offset, len, options) = self.lock.take().ok_or(Error::NotLocked)?;

        if let Some(id) = self.id {
            if options != LockOptions::ReadOnly {
                if let Some(ref staging) = self.staging {
                    let data = staging[offset..offset + len].to_vec();
                    self.driver
                        .apply(Command::BufferSubData { id, offset, data });
                }
            }

            if self.usage.is_static() {
                self.staging = None;
            }
        }

        Ok(())
    }

    /// Writes `data` at `offset`, discarding the range first.
    pub fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let options = if offset == 0 && data.len() == self.size_in_bytes() {
            LockOptions::Discard
        } else {
            LockOptions::Normal
        };

        self.lock(offset, data.len(), options)?.copy_from_slice(data);
        self.unlock()
    }

    /// Reads `dst.len()` bytes from `offset`.
    pub fn read(&mut self, offset: usize, dst: &mut [u8]) -> Result<()> {
        let len = dst.len();
        dst.copy_from_slice(self.lock(offset, len, LockOptions::ReadOnly)?);
        self.unlock()
    }
}

impl Drop for HardwareBuffer {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            if let Err(err) = self.driver.delete(ObjectKind::Buffer, id) {
                warn!("Failed to delete hardware buffer {}. {}", id, err);
            }
        }
    }
}

/// A range of indices into an index buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IndexData {
    pub buffer: HardwareBufferHandle,
    pub start: usize,
    pub count: usize,
}

/// Everything a single draw call needs. The elements of
/// `vertex_declaration` lie interleaved in `vertex_buffer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOperation {
    pub operation_type: OperationType,
    pub vertex_buffer: HardwareBufferHandle,
    pub vertex_declaration: Vec<VertexElement>,
    pub vertex_start: usize,
    pub vertex_count: usize,
    pub indices: Option<IndexData>,
}

/// Creates and owns every vertex and index buffer.
pub struct HardwareBufferManager {
    driver: Arc<dyn Driver>,
    buffers: ObjectPool<HardwareBufferHandle, HardwareBuffer>,
    system_memory: bool,
}

impl HardwareBufferManager {
    pub fn new(driver: Arc<dyn Driver>, caps: &Capabilities) -> Self {
        let system_memory = !caps.has(Capability::VertexBuffer);
        if system_memory {
            info!("Vertex buffer objects are unavailable, buffers live in system memory.");
        }

        HardwareBufferManager {
            driver,
            buffers: ObjectPool::new(),
            system_memory,
        }
    }

    pub fn create_vertex_buffer(
        &mut self,
        stride: usize,
        len: usize,
        usage: BufferUsage,
    ) -> HardwareBufferHandle {
        let kind = HardwareBufferKind::Vertex { stride, len };
        self.create(kind, usage)
    }

    pub fn create_index_buffer(
        &mut self,
        format: IndexType,
        len: usize,
        usage: BufferUsage,
    ) -> HardwareBufferHandle {
        let kind = HardwareBufferKind::Index { format, len };
        self.create(kind, usage)
    }

    #[inline]
    pub fn get(&self, handle: HardwareBufferHandle) -> Option<&HardwareBuffer> {
        self.buffers.get(handle)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: HardwareBufferHandle) -> Option<&mut HardwareBuffer> {
        self.buffers.get_mut(handle)
    }

    /// Deletes the buffer with `handle`.
    pub fn delete(&mut self, handle: HardwareBufferHandle) -> bool {
        self.buffers.free(handle).is_some()
    }

    pub fn delete_all(&mut self) {
        self.buffers.drain();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    fn create(&mut self, kind: HardwareBufferKind, usage: BufferUsage) -> HardwareBufferHandle {
        let buf = HardwareBuffer::new(self.driver.clone(), kind, usage, self.system_memory);
        self.buffers.create(buf)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::capabilities::Capabilities;
    use crate::video::driver::{Call, HeadlessDriver};

    #[test]
    fn lock() {
        let driver = Arc::new(HeadlessDriver::new());
        let caps = Capabilities::probe(driver.as_ref()).unwrap();
        let mut buffers = HardwareBufferManager::new(driver.clone(), &caps);

        let handle = buffers.create_vertex_buffer(4, 8, BufferUsage::Dynamic);
        let buf = buffers.get_mut(handle).unwrap();
        assert!(!buf.is_system_memory());

        buf.write(4, &[1, 2, 3, 4]).unwrap();
        assert!(buf.lock(30, 4, LockOptions::Normal).is_err());

        let mut dst = [0; 8];
        buf.read(0, &mut dst).unwrap();
        assert_eq!(dst, [0, 0, 0, 0, 1, 2, 3, 4]);

        buf.lock(0, 4, LockOptions::Normal).unwrap();
        match buf.lock(0, 4, LockOptions::Normal) {
            Err(Error::AlreadyLocked) => {}
            _ => panic!(),
        }
        buf.unlock().unwrap();

        let id = buf.id().unwrap();
        assert!(buffers.delete(handle));
        assert_eq!(
            driver.count_calls(|v| *v == Call::Delete(ObjectKind::Buffer, id)),
            1
        );
    }

    #[test]
    fn system_memory() {
        let driver = Arc::new(
            HeadlessDriver::new()
                .with_version("1.4.0")
                .without_extension("GL_ARB_vertex_buffer_object"),
        );
        let caps = Capabilities::probe(driver.as_ref()).unwrap();
        let mut buffers = HardwareBufferManager::new(driver.clone(), &caps);

        let handle = buffers.create_index_buffer(IndexType::U16, 3, BufferUsage::Static);
        let buf = buffers.get_mut(handle).unwrap();
        assert!(buf.is_system_memory());

        buf.write(0, &[1, 0, 2, 0, 3, 0]).unwrap();
        let mut dst = [0; 2];
        buf.read(2, &mut dst).unwrap();
        assert_eq!(dst, [2, 0]);
        assert_eq!(driver.count_calls(|v| *v == Call::Create(ObjectKind::Buffer, 1)), 0);
    }
}
