//! Raster image import: decode, downsample and embed as a data URL.

use crate::shapes::Image;
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, imageops::FilterType};
use kurbo::Size;
use std::io::Cursor;
use thiserror::Error;

/// Largest dimension an imported image is scaled down to.
pub const DEFAULT_MAX_DIMENSION: u32 = 1024;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Could not encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("Image has no pixels")]
    Empty,
}

/// Dimensions of an image scaled to fit `max_dim`, preserving aspect ratio.
/// Images already within bounds keep their size.
pub fn fit_dimensions(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    if width <= max_dim && height <= max_dim {
        return (width, height);
    }
    let ratio = (max_dim as f64 / width as f64).min(max_dim as f64 / height as f64);
    let w = ((width as f64 * ratio).round() as u32).max(1);
    let h = ((height as f64 * ratio).round() as u32).max(1);
    (w, h)
}

/// Decode `bytes`, downsample to `max_dim` and return an image object
/// centred on a canvas of `canvas_size`.
pub fn import_image(bytes: &[u8], max_dim: u32, canvas_size: Size) -> Result<Image, ImportError> {
    let decoded = image::load_from_memory(bytes).map_err(ImportError::Decode)?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(ImportError::Empty);
    }

    let (w, h) = fit_dimensions(decoded.width(), decoded.height(), max_dim);
    let scaled = if (w, h) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(w, h, FilterType::Triangle)
    };

    let src = encode_png_data_url(&scaled)?;
    let (w, h) = (w as f64, h as f64);
    log::info!("Imported image ({}x{})", w, h);
    Ok(Image::new(
        canvas_size.width / 2.0 - w / 2.0,
        canvas_size.height / 2.0 - h / 2.0,
        w,
        h,
        src,
    ))
}

fn encode_png_data_url(image: &DynamicImage) -> Result<String, ImportError> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(ImportError::Encode)?;
    Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png)))
}

/// Raw bytes of a base64 data URL (`data:<mime>;base64,<payload>`).
pub fn data_url_bytes(src: &str) -> Option<Vec<u8>> {
    let (header, payload) = src.strip_prefix("data:")?.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload).ok()
}
