//! CPU access to single images of textures.

use std::sync::Arc;

use crate::errors::*;
use crate::video::driver::{Command, DownloadSource, Driver};
use crate::video::types::*;

/// The image of a texture face and mip level a pixel buffer mirrors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PixelBufferDesc {
    pub ty: TextureType,
    pub id: u32,
    pub face: CubeFace,
    pub level: u32,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub usage: BufferUsage,
}

/// A mutable view into a locked region of the staging buffer. Pitches are
/// in pixels.
#[derive(Debug)]
pub struct PixelBox<'a> {
    pub region: PixelRegion,
    pub format: PixelFormat,
    pub row_pitch: usize,
    pub slice_pitch: usize,
    data: &'a mut [u8],
}

impl<'a> PixelBox<'a> {
    /// Gets the bytes of pixel (x, y, z), relative to the locked region.
    pub fn pixel_mut(&mut self, x: u32, y: u32, z: u32) -> Option<&mut [u8]> {
        if x >= self.region.width() || y >= self.region.height() || z >= self.region.depth() {
            return None;
        }

        let bpp = self.format.bytes();
        let offset = (z as usize * self.slice_pitch + y as usize * self.row_pitch + x as usize) * bpp;
        self.data.get_mut(offset..offset + bpp)
    }

    pub fn pixel(&self, x: u32, y: u32, z: u32) -> Option<&[u8]> {
        if x >= self.region.width() || y >= self.region.height() || z >= self.region.depth() {
            return None;
        }

        let bpp = self.format.bytes();
        let offset = (z as usize * self.slice_pitch + y as usize * self.row_pitch + x as usize) * bpp;
        self.data.get(offset..offset + bpp)
    }

    /// Sets every pixel in the region to `value`.
    pub fn fill(&mut self, value: &[u8]) {
        for z in 0..self.region.depth() {
            for y in 0..self.region.height() {
                for x in 0..self.region.width() {
                    if let Some(v) = self.pixel_mut(x, y, z) {
                        let len = v.len().min(value.len());
                        v[..len].copy_from_slice(&value[..len]);
                    }
                }
            }
        }
    }
}

/// One image of a texture, with a staging buffer allocated while locked.
///
/// Locking downloads the current contents unless they are discarded or the
/// buffer is write-only. Unlocking uploads the locked region unless it was
/// locked for reading, and frees the staging buffer of static buffers.
#[derive(Debug)]
pub struct HardwarePixelBuffer {
    driver: Arc<dyn Driver>,
    desc: PixelBufferDesc,
    staging: Option<Vec<u8>>,
    lock: Option<(PixelRegion, LockOptions)>,
}

impl HardwarePixelBuffer {
    pub fn new(driver: Arc<dyn Driver>, desc: PixelBufferDesc) -> Self {
        HardwarePixelBuffer {
            driver,
            desc,
            staging: None,
            lock: None,
        }
    }

    #[inline]
    pub fn desc(&self) -> &PixelBufferDesc {
        &self.desc
    }

    /// The region covering the whole image.
    pub fn extent(&self) -> PixelRegion {
        PixelRegion::new(0, 0, 0, self.desc.width, self.desc.height, self.desc.depth)
    }

    pub fn size_in_bytes(&self) -> usize {
        let d = &self.desc;
        (d.width * d.height * d.depth) as usize * d.format.bytes()
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    #[inline]
    pub fn has_staging(&self) -> bool {
        self.staging.is_some()
    }

    pub fn lock(&mut self, region: PixelRegion, options: LockOptions) -> Result<PixelBox> {
        if self.lock.is_some() {
            return Err(Error::AlreadyLocked);
        }

        if !self.extent().contains(&region) {
            return Err(Error::OutOfBounds);
        }

        let len = self.size_in_bytes();
        if self.staging.is_none() {
            self.staging = Some(vec![0; len]);
        }

        if options != LockOptions::Discard && !self.desc.usage.is_write_only() {
            let d = &self.desc;
            let bytes = self.driver.download(DownloadSource::Texture {
                ty: d.ty,
                id: d.id,
                face: d.face,
                level: d.level,
                len,
            })?;

            if let Some(ref mut staging) = self.staging {
                let n = bytes.len().min(len);
                staging[..n].copy_from_slice(&bytes[..n]);
            }
        }

        self.lock = Some((region, options));

        let d = self.desc;
        let offset = self.offset(region.left, region.top, region.front);
        let data = match self.staging {
            Some(ref mut v) => &mut v[offset..],
            None => return Err(Error::NotLocked),
        };

        Ok(PixelBox {
            region,
            format: d.format,
            row_pitch: d.width as usize,
            slice_pitch: (d.width * d.height) as usize,
            data,
        })
    }

    #[inline]
    pub fn lock_all(&mut self, options: LockOptions) -> Result<PixelBox> {
        let region = self.extent();
        self.lock(region, options)
    }

    pub fn unlock(&mut self) -> Result<()> {
        let (region, options) = self.lock.take().ok_or(Error::NotLocked)?;

        if options != LockOptions::ReadOnly {
            let data = self.copy_region(region);
            let d = &self.desc;
            self.driver.apply(Command::TexSubImage {
                ty: d.ty,
                id: d.id,
                face: d.face,
                level: d.level,
                region,
                data,
            });
        }

        if self.desc.usage.is_static() {
            self.staging = None;
        }

        Ok(())
    }

    /// Uploads tightly packed `data` into `region` without staging.
    pub fn write(&mut self, region: PixelRegion, data: &[u8]) -> Result<()> {
        if !self.extent().contains(&region) {
            return Err(Error::OutOfBounds);
        }

        let len = (region.width() * region.height() * region.depth()) as usize;
        if data.len() != len * self.desc.format.bytes() {
            return Err(Error::OutOfBounds);
        }

        let d = &self.desc;
        self.driver.apply(Command::TexSubImage {
            ty: d.ty,
            id: d.id,
            face: d.face,
            level: d.level,
            region,
            data: data.to_vec(),
        });

        Ok(())
    }

    fn offset(&self, x: u32, y: u32, z: u32) -> usize {
        let d = &self.desc;
        ((z * d.width * d.height + y * d.width + x) as usize) * d.format.bytes()
    }

    fn copy_region(&self, region: PixelRegion) -> Vec<u8> {
        let staging = match self.staging {
            Some(ref v) => v,
            None => return Vec::new(),
        };

        let row = region.width() as usize * self.desc.format.bytes();
        let mut data = Vec::with_capacity(row * (region.height() * region.depth()) as usize);

        for z in region.front..region.back {
            for y in region.top..region.bottom {
                let offset = self.offset(region.left, y, z);
                data.extend_from_slice(&staging[offset..offset + row]);
            }
        }

        data
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::driver::{Call, HeadlessDriver, ObjectKind};

    fn buffer(driver: &Arc<HeadlessDriver>, usage: BufferUsage) -> HardwarePixelBuffer {
        let id = driver.create(ObjectKind::Texture);
        driver.apply(Command::TexImage {
            ty: TextureType::TwoD,
            id,
            face: CubeFace::PositiveX,
            level: 0,
            format: PixelFormat::A8R8G8B8,
            width: 4,
            height: 4,
            depth: 1,
        });

        let desc = PixelBufferDesc {
            ty: TextureType::TwoD,
            id,
            face: CubeFace::PositiveX,
            level: 0,
            format: PixelFormat::A8R8G8B8,
            width: 4,
            height: 4,
            depth: 1,
            usage,
        };

        HardwarePixelBuffer::new(driver.clone(), desc)
    }

    fn downloads(driver: &HeadlessDriver) -> usize {
        driver.count_calls(|v| match *v {
            Call::Download(_) => true,
            _ => false,
        })
    }

    #[test]
    fn lock() {
        let driver = Arc::new(HeadlessDriver::new());
        let mut buf = buffer(&driver, BufferUsage::Dynamic);

        {
            let mut pixels = buf.lock(PixelRegion::rect(1, 1, 3, 3), LockOptions::Normal).unwrap();
            pixels.fill(&[1, 2, 3, 4]);
            assert!(pixels.pixel_mut(2, 0, 0).is_none());
        }

        assert!(buf.lock_all(LockOptions::Normal).is_err());
        buf.unlock().unwrap();
        assert!(buf.unlock().is_err());
        assert_eq!(downloads(&driver), 1);
        assert!(buf.has_staging());

        let pixels = buf.lock_all(LockOptions::ReadOnly).unwrap();
        assert_eq!(pixels.pixel(1, 1, 0), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(pixels.pixel(0, 0, 0), Some(&[0u8, 0, 0, 0][..]));
    }

    #[test]
    fn relock_reads_latest_contents() {
        let driver = Arc::new(HeadlessDriver::new());
        let mut buf = buffer(&driver, BufferUsage::Dynamic);

        buf.lock_all(LockOptions::Normal).unwrap().fill(&[1, 1, 1, 1]);
        buf.unlock().unwrap();
        assert!(buf.has_staging());

        let full = buf.extent();
        buf.write(full, &[7; 64]).unwrap();

        {
            let pixels = buf.lock_all(LockOptions::ReadOnly).unwrap();
            assert_eq!(pixels.pixel(0, 0, 0), Some(&[7u8, 7, 7, 7][..]));
        }
        buf.unlock().unwrap();
        assert_eq!(downloads(&driver), 2);

        // A discarding lock never reads back.
        buf.lock_all(LockOptions::Discard).unwrap();
        buf.unlock().unwrap();
        assert_eq!(downloads(&driver), 2);
    }

    #[test]
    fn static_usage() {
        let driver = Arc::new(HeadlessDriver::new());
        let mut buf = buffer(&driver, BufferUsage::StaticWriteOnly);

        buf.lock_all(LockOptions::Normal).unwrap().fill(&[9, 9, 9, 9]);
        buf.unlock().unwrap();
        assert_eq!(downloads(&driver), 0);
        assert!(!buf.has_staging());

        let uploads = driver.count_calls(|v| match *v {
            Call::Command(Command::TexSubImage { ref data, .. }) => data.len() == 64,
            _ => false,
        });
        assert_eq!(uploads, 1);

        assert!(buf.lock(PixelRegion::rect(0, 0, 5, 1), LockOptions::Discard).is_err());
    }
}
