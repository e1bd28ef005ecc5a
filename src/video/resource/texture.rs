//! Textures and the warning texture bound in place of missing ones.

use std::sync::Arc;

use crate::errors::*;
use crate::utils::hash::FastHashMap;
use crate::utils::object_pool::ObjectPool;
use crate::video::driver::{Command, Driver, ObjectKind};
use crate::video::types::*;

use super::pixel_buffer::{HardwarePixelBuffer, PixelBufferDesc};
use super::render_buffer::{SurfaceDesc, SurfaceSource};

impl_handle!(TextureHandle);

/// The name of the texture bound when a unit has none.
pub const WARNING_TEXTURE_NAME: &str = "__warning_texture";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureDesc {
    pub name: String,
    pub ty: TextureType,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Number of mip levels below the base level.
    pub num_mipmaps: u32,
    pub usage: BufferUsage,
}

impl TextureDesc {
    /// Describes a 2D texture without mipmaps.
    pub fn new_2d<T: Into<String>>(name: T, format: PixelFormat, width: u32, height: u32) -> Self {
        TextureDesc {
            name: name.into(),
            ty: TextureType::TwoD,
            format,
            width,
            height,
            depth: 1,
            num_mipmaps: 0,
            usage: BufferUsage::Static,
        }
    }

    pub fn num_faces(&self) -> usize {
        if self.ty == TextureType::CubeMap {
            6
        } else {
            1
        }
    }
}

#[derive(Debug)]
pub struct Texture {
    driver: Arc<dyn Driver>,
    desc: TextureDesc,
    id: u32,
    surfaces: Vec<HardwarePixelBuffer>,
}

impl Texture {
    fn new(driver: Arc<dyn Driver>, desc: TextureDesc) -> Result<Self> {
        if desc.width == 0 || desc.height == 0 || desc.depth == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "texture '{}' has empty size {}x{}x{}",
                desc.name, desc.width, desc.height, desc.depth
            )));
        }

        if desc.ty == TextureType::CubeMap && desc.width != desc.height {
            return Err(Error::InvalidConfiguration(format!(
                "cube map '{}' must be square",
                desc.name
            )));
        }

        let id = driver.create(ObjectKind::Texture);
        let mut surfaces = Vec::new();

        for face in 0..desc.num_faces() {
            let face = CubeFace::from_index(face);

            for level in 0..=desc.num_mipmaps {
                let width = (desc.width >> level).max(1);
                let height = (desc.height >> level).max(1);
                let depth = if desc.ty == TextureType::ThreeD {
                    (desc.depth >> level).max(1)
                } else {
                    1
                };

                driver.apply(Command::TexImage {
                    ty: desc.ty,
                    id,
                    face,
                    level,
                    format: desc.format,
                    width,
                    height,
                    depth,
                });

                let buf = PixelBufferDesc {
                    ty: desc.ty,
                    id,
                    face,
                    level,
                    format: desc.format,
                    width,
                    height,
                    depth,
                    usage: desc.usage,
                };

                surfaces.push(HardwarePixelBuffer::new(driver.clone(), buf));
            }
        }

        Ok(Texture {
            driver,
            desc,
            id,
            surfaces,
        })
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.desc.name
    }

    #[inline]
    pub fn texture_type(&self) -> TextureType {
        self.desc.ty
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.desc.format
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.desc.height
    }

    /// Gets the pixel buffer of `face` at mip `level`.
    pub fn buffer(&mut self, face: CubeFace, level: u32) -> Option<&mut HardwarePixelBuffer> {
        let index = self.surface_index(face, level)?;
        self.surfaces.get_mut(index)
    }

    /// Describes `face` at mip `level` as a color attachment. `zoffset`
    /// selects the slice of 3D textures.
    pub fn surface(&self, face: CubeFace, level: u32, zoffset: u32) -> Option<SurfaceDesc> {
        let index = self.surface_index(face, level)?;
        let desc = self.surfaces.get(index)?.desc();

        Some(SurfaceDesc {
            source: SurfaceSource::Texture {
                ty: self.desc.ty,
                id: self.id,
                face,
                level,
            },
            format: RenderBufferFormat::Color(self.desc.format),
            width: desc.width,
            height: desc.height,
            zoffset,
        })
    }

    fn surface_index(&self, face: CubeFace, level: u32) -> Option<usize> {
        if level > self.desc.num_mipmaps {
            return None;
        }

        let face = face as usize;
        if face >= self.desc.num_faces() {
            return None;
        }

        Some(face * (self.desc.num_mipmaps as usize + 1) + level as usize)
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if let Err(err) = self.driver.delete(ObjectKind::Texture, self.id) {
            warn!("Failed to delete texture '{}'. {}", self.desc.name, err);
        }
    }
}

/// Creates, names and owns textures.
pub struct TextureManager {
    driver: Arc<dyn Driver>,
    textures: ObjectPool<TextureHandle, Texture>,
    names: FastHashMap<String, TextureHandle>,
    warning: TextureHandle,
}

impl TextureManager {
    /// Creates the manager along with a `warning_size` squared checkerboard
    /// warning texture.
    pub fn new(driver: Arc<dyn Driver>, warning_size: u32) -> Result<Self> {
        let mut textures = TextureManager {
            driver,
            textures: ObjectPool::new(),
            names: FastHashMap::default(),
            warning: TextureHandle::default(),
        };

        textures.warning = textures.create_warning_texture(warning_size.max(2))?;
        Ok(textures)
    }

    pub fn create(&mut self, desc: TextureDesc) -> Result<TextureHandle> {
        if self.names.contains_key(&desc.name) {
            return Err(Error::InvalidConfiguration(format!(
                "texture '{}' already exists",
                desc.name
            )));
        }

        let name = desc.name.clone();
        let texture = Texture::new(self.driver.clone(), desc)?;
        let handle = self.textures.create(texture);
        self.names.insert(name, handle);
        Ok(handle)
    }

    #[inline]
    pub fn get(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: TextureHandle) -> Option<&mut Texture> {
        self.textures.get_mut(handle)
    }

    pub fn find(&self, name: &str) -> Option<TextureHandle> {
        self.names.get(name).cloned()
    }

    /// The texture bound when a unit refers to a missing texture.
    #[inline]
    pub fn warning_texture(&self) -> TextureHandle {
        self.warning
    }

    pub fn warning_texture_id(&self) -> u32 {
        self.get(self.warning).map(|v| v.id()).unwrap_or(0)
    }

    pub fn delete(&mut self, handle: TextureHandle) -> bool {
        match self.textures.free(handle) {
            Some(v) => {
                self.names.remove(v.name());
                true
            }
            None => false,
        }
    }

    pub fn delete_all(&mut self) {
        self.names.clear();
        self.textures.drain();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn create_warning_texture(&mut self, size: u32) -> Result<TextureHandle> {
        let desc = TextureDesc::new_2d(WARNING_TEXTURE_NAME, PixelFormat::A8R8G8B8, size, size);
        let handle = self.create(desc)?;

        let half = size / 2;
        let mut bytes = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                if (x < half) == (y < half) {
                    bytes.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0x00]);
                } else {
                    bytes.extend_from_slice(&[0xFF, 0x00, 0x00, 0x00]);
                }
            }
        }

        let buf = self
            .get_mut(handle)
            .and_then(|v| v.buffer(CubeFace::PositiveX, 0))
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))?;

        let region = buf.extent();
        buf.write(region, &bytes)?;
        Ok(handle)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::driver::{Call, DownloadSource, HeadlessDriver};

    #[test]
    fn warning() {
        let driver = Arc::new(HeadlessDriver::new());
        let textures = TextureManager::new(driver.clone(), 8).unwrap();

        let warning = textures.warning_texture();
        assert_eq!(textures.find(WARNING_TEXTURE_NAME), Some(warning));

        let id = textures.warning_texture_id();
        let bytes = driver
            .download(DownloadSource::Texture {
                ty: TextureType::TwoD,
                id,
                face: CubeFace::PositiveX,
                level: 0,
                len: 256,
            })
            .unwrap();

        assert_eq!(&bytes[0..4], &[0xFF, 0xFF, 0xFF, 0x00]);
        assert_eq!(&bytes[16..20], &[0xFF, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn faces() {
        let driver = Arc::new(HeadlessDriver::new());
        let mut textures = TextureManager::new(driver.clone(), 8).unwrap();

        let mut desc = TextureDesc::new_2d("sky", PixelFormat::R8G8B8, 32, 32);
        desc.ty = TextureType::CubeMap;
        desc.num_mipmaps = 2;

        let handle = textures.create(desc.clone()).unwrap();
        assert!(textures.create(desc).is_err());

        let sky = textures.get_mut(handle).unwrap();
        assert!(sky.buffer(CubeFace::NegativeZ, 2).is_some());
        assert!(sky.buffer(CubeFace::NegativeZ, 3).is_none());

        let surface = sky.surface(CubeFace::PositiveY, 1, 0).unwrap();
        assert_eq!((surface.width, surface.height), (16, 16));

        let id = sky.id();
        assert!(textures.delete(handle));
        assert!(textures.find("sky").is_none());
        assert_eq!(
            driver.count_calls(|v| *v == Call::Delete(ObjectKind::Texture, id)),
            1
        );
    }
}
