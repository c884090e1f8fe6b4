// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview rendering — turn an archival container into a PNG the list view can
// display, and produce the placeholder shown when that is impossible.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use registrar_core::DecodeError;
use tracing::{debug, error, instrument};

use crate::container::TiffReader;

/// Placeholder size, matching the landscape card the list view reserves.
pub const PLACEHOLDER_WIDTH: u32 = 1200;
pub const PLACEHOLDER_HEIGHT: u32 = 800;
const PLACEHOLDER_FILL: Rgba<u8> = Rgba([224, 224, 224, 255]);

/// A displayable preview encoded as PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPreview {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl RenderedPreview {
    pub const MIME: &'static str = "image/png";

    /// `data:` URL suitable for an `<img src>`.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", Self::MIME, STANDARD.encode(&self.png))
    }
}

/// Decode the first frame of `container` and re-encode it as PNG.
///
/// When `max_dimension` is set, frames larger than it on either edge are
/// downscaled to fit, preserving aspect ratio.
#[instrument(skip(container), fields(bytes = container.len()))]
pub fn render_preview(
    container: &[u8],
    max_dimension: Option<u32>,
) -> Result<RenderedPreview, DecodeError> {
    let rgba = TiffReader::new(container)?.decode_first_frame()?;
    let mut image = DynamicImage::ImageRgba8(rgba);

    let oversized = max_dimension
        .filter(|max| *max > 0)
        .filter(|max| image.width() > *max || image.height() > *max);
    if let Some(max) = oversized {
        debug!(
            from_w = image.width(),
            from_h = image.height(),
            max,
            "downscaling preview"
        );
        image = image.resize(max, max, FilterType::Triangle);
    }

    encode_png(&image)
}

/// The neutral image served whenever a preview cannot be produced.
///
/// Deterministic: every call yields identical bytes.
pub fn placeholder() -> RenderedPreview {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        PLACEHOLDER_WIDTH,
        PLACEHOLDER_HEIGHT,
        PLACEHOLDER_FILL,
    ));
    encode_png(&image).unwrap_or_else(|err| {
        error!(error = %err, "placeholder encoding failed");
        RenderedPreview {
            width: PLACEHOLDER_WIDTH,
            height: PLACEHOLDER_HEIGHT,
            png: Vec::new(),
        }
    })
}

fn encode_png(image: &DynamicImage) -> Result<RenderedPreview, DecodeError> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|err| DecodeError::Encode(err.to_string()))?;
    Ok(RenderedPreview {
        width: image.width(),
        height: image.height(),
        png: buffer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::TiffWriter;
    use image::{Rgb, RgbImage};

    fn container(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([1, 2, 3])));
        TiffWriter::archival().encode_image(&image).expect("encode").bytes
    }

    #[test]
    fn renders_png_of_first_frame() {
        let preview = render_preview(&container(20, 10), None).expect("render");
        assert_eq!((preview.width, preview.height), (20, 10));
        let decoded = image::load_from_memory_with_format(&preview.png, ImageFormat::Png)
            .expect("valid png");
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn downscales_to_max_dimension() {
        let preview = render_preview(&container(400, 200), Some(100)).expect("render");
        assert_eq!((preview.width, preview.height), (100, 50));
    }

    #[test]
    fn small_frames_are_not_upscaled() {
        let preview = render_preview(&container(40, 20), Some(100)).expect("render");
        assert_eq!((preview.width, preview.height), (40, 20));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(render_preview(b"GIF89a....", None).is_err());
    }

    #[test]
    fn placeholder_is_deterministic() {
        let a = placeholder();
        let b = placeholder();
        assert_eq!(a, b);
        assert_eq!((a.width, a.height), (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT));
        assert!(!a.png.is_empty());
    }

    #[test]
    fn data_url_has_png_prefix() {
        let url = placeholder().data_url();
        assert!(url.starts_with("data:image/png;base64,iVBOR"));
    }
}
