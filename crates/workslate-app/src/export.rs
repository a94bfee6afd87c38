//! Offscreen rendering of a slide to PNG.

use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use vello::peniko::Color;
use vello::wgpu;
use vello::{AaConfig, RenderParams, Scene};
use workslate_render::{RenderResult, RendererError};

/// Bytes per row of a readback buffer: padded to wgpu's copy alignment.
fn padded_row_bytes(width: u32) -> u32 {
    (width * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

/// Drop the per-row padding of a readback buffer.
fn unpad_rows(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let padded = padded_row_bytes(width) as usize;
    let row = (width * 4) as usize;
    let mut rgba = Vec::with_capacity(row * height as usize);
    for chunk in data.chunks(padded).take(height as usize) {
        rgba.extend_from_slice(&chunk[..row]);
    }
    rgba
}

/// Default file name for an exported slide (`index` is zero-based).
pub fn slide_file_name(index: usize) -> String {
    format!("slide_{}.png", index + 1)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// Render `scene` into a `width` x `height` texture and read it back.
pub fn render_scene_to_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    renderer: &mut vello::Renderer,
    scene: &Scene,
    width: u32,
    height: u32,
) -> RenderResult<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(RendererError::RenderFailed("empty export size".to_string()));
    }

    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("slide export texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let params = RenderParams {
        base_color: Color::WHITE,
        width,
        height,
        antialiasing_method: AaConfig::Area,
    };
    renderer
        .render_to_texture(device, queue, scene, &view, &params)
        .map_err(|e| RendererError::RenderFailed(e.to_string()))?;

    let bytes_per_row = padded_row_bytes(width);
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("slide export readback"),
        size: u64::from(bytes_per_row) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("slide export copy"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        size,
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).ok();
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| RendererError::RenderFailed(e.to_string()))?;
    match rx.recv() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(RendererError::RenderFailed(e.to_string())),
        Err(_) => return Err(RendererError::RenderFailed("readback never completed".to_string())),
    }

    let rgba = unpad_rows(&slice.get_mapped_range(), width, height);
    buffer.unmap();
    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| RendererError::RenderFailed("readback size mismatch".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_padding_is_removed() {
        // 3 px wide rows are 12 bytes, padded to 256.
        assert_eq!(padded_row_bytes(3), 256);
        assert_eq!(padded_row_bytes(64), 256);
        let mut data = vec![0u8; 256 * 2];
        data[..12].fill(1);
        data[256..268].fill(2);
        let rgba = unpad_rows(&data, 3, 2);
        assert_eq!(rgba.len(), 24);
        assert!(rgba[..12].iter().all(|&b| b == 1));
        assert!(rgba[12..].iter().all(|&b| b == 2));
    }

    #[test]
    fn test_png_encoding_and_names() {
        let image = RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]));
        let png = encode_png(&image).unwrap();
        assert!(png.starts_with(b"\x89PNG"));
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 2));
        assert_eq!(slide_file_name(0), "slide_1.png");
    }
}
