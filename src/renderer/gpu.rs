use glam::UVec2;
use wgpu::util::DeviceExt;

use crate::error::{Result, TilemapError};
use crate::map::texel_bytes;
use crate::params::{MapParams, MapUniform};

use super::TextureSink;

/// Uploads packed maps as `Rgba8Uint` textures.
///
/// Integer format: the decoder reads raw bytes with `textureLoad`, so no
/// filtering or sRGB conversion may touch them.
pub struct GpuTextureSink<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
}

/// A map's index texture on the GPU.
pub struct GpuIndexTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub texels: UVec2,
}

impl TextureSink for GpuTextureSink<'_> {
    type Texture = GpuIndexTexture;

    fn upload_indices(&mut self, label: &str, texels: UVec2, data: &[u8]) -> Result<GpuIndexTexture> {
        let expected = texel_bytes(texels)
            .ok_or(TilemapError::Allocation { what: "index texture", bytes: usize::MAX })?;
        if data.len() != expected || texels.x == 0 || texels.y == 0 {
            return Err(TilemapError::Allocation { what: "index texture", bytes: expected });
        }

        let texture = self.device.create_texture_with_data(
            self.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: texels.x,
                    height: texels.y,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Uint,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(GpuIndexTexture { texture, view, texels })
    }
}

/// Uniform buffer holding one decoder instance's [`MapUniform`].
pub struct GpuParamBuffer {
    pub buffer: wgpu::Buffer,
}

impl GpuParamBuffer {
    pub fn new(device: &wgpu::Device, label: &str, params: &MapParams) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&MapUniform::from(params)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        Self { buffer }
    }

    /// Push the current parameter values; call once per frame after the
    /// scroll update.
    pub fn write(&self, queue: &wgpu::Queue, params: &MapParams) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&MapUniform::from(params)));
    }
}
