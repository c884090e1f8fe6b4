// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// TIFF reader — walk the frame (IFD) directory of an archival container and
// decode the first frame into an RGBA8 raster.

use std::io::Cursor;

use image::{
    DynamicImage, GrayAlphaImage, GrayImage, ImageBuffer, Luma, LumaA, Rgb, RgbImage, Rgba,
    RgbaImage,
};
use registrar_core::DecodeError;
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::{debug, info, instrument};

/// Directory entry describing one frame of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub color: ColorType,
}

/// Read-only view over the bytes of an archival container.
pub struct TiffReader<'a> {
    bytes: &'a [u8],
}

impl<'a> TiffReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(Self { bytes })
    }

    fn decoder(&self) -> Result<Decoder<Cursor<&'a [u8]>>, DecodeError> {
        Decoder::new(Cursor::new(self.bytes))
            .map_err(|err| DecodeError::Container(err.to_string()))
    }

    /// Parse every frame header in the container, in file order.
    #[instrument(skip(self), fields(bytes = self.bytes.len()))]
    pub fn frame_directory(&self) -> Result<Vec<FrameInfo>, DecodeError> {
        let mut decoder = self.decoder()?;
        let mut frames = Vec::new();
        loop {
            frames.push(frame_info(&mut decoder, frames.len())?);
            if !decoder.more_images() {
                break;
            }
            decoder
                .next_image()
                .map_err(|err| DecodeError::Container(err.to_string()))?;
        }
        debug!(frames = frames.len(), "frame directory parsed");
        Ok(frames)
    }

    /// Decode the first frame to RGBA8.
    ///
    /// Only the first IFD is read; later frames are never touched, so damage
    /// past the first frame does not affect the preview. Zero-sized frames are
    /// rejected as corrupt rather than treated as empty images.
    #[instrument(skip(self), fields(bytes = self.bytes.len()))]
    pub fn decode_first_frame(&self) -> Result<RgbaImage, DecodeError> {
        let mut decoder = self.decoder()?;
        let first = frame_info(&mut decoder, 0)?;
        validate_dimensions(first.width, first.height)?;

        let colormap = match first.color {
            ColorType::Palette(_) => Some(decoder.get_tag_u32_vec(Tag::ColorMap).map_err(
                |err| DecodeError::Frame {
                    index: 0,
                    reason: format!("palette frame without colour map: {err}"),
                },
            )?),
            _ => None,
        };
        let samples = decoder.read_image().map_err(|err| DecodeError::Frame {
            index: 0,
            reason: err.to_string(),
        })?;

        let rgba = to_rgba8(first, samples, colormap.as_deref())?;
        info!(
            width = rgba.width(),
            height = rgba.height(),
            more_frames = decoder.more_images(),
            color = ?first.color,
            "first frame decoded"
        );
        Ok(rgba)
    }
}

/// Header of the IFD the decoder is positioned on.
fn frame_info<R>(decoder: &mut Decoder<R>, index: usize) -> Result<FrameInfo, DecodeError>
where
    R: std::io::Read + std::io::Seek,
{
    let frame_error = |err: tiff::TiffError| DecodeError::Frame {
        index,
        reason: err.to_string(),
    };
    let (width, height) = decoder.dimensions().map_err(frame_error)?;
    let color = decoder.colortype().map_err(frame_error)?;
    Ok(FrameInfo {
        index,
        width,
        height,
        color,
    })
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Convert a frame's native sample layout to RGBA8.
fn to_rgba8(
    frame: FrameInfo,
    samples: DecodingResult,
    colormap: Option<&[u32]>,
) -> Result<RgbaImage, DecodeError> {
    let FrameInfo {
        index,
        width: w,
        height: h,
        color,
    } = frame;

    let image = match (color, samples) {
        (ColorType::Gray(8), DecodingResult::U8(buf)) => {
            GrayImage::from_raw(w, h, buf).map(DynamicImage::ImageLuma8)
        }
        (ColorType::Gray(16), DecodingResult::U16(buf)) => {
            ImageBuffer::<Luma<u16>, _>::from_raw(w, h, buf).map(DynamicImage::ImageLuma16)
        }
        (ColorType::Gray(1), DecodingResult::U8(buf)) => {
            expand_bilevel(w, h, &buf).map(DynamicImage::ImageLuma8)
        }
        (ColorType::GrayA(8), DecodingResult::U8(buf)) => {
            GrayAlphaImage::from_raw(w, h, buf).map(DynamicImage::ImageLumaA8)
        }
        (ColorType::GrayA(16), DecodingResult::U16(buf)) => {
            ImageBuffer::<LumaA<u16>, _>::from_raw(w, h, buf).map(DynamicImage::ImageLumaA16)
        }
        (ColorType::RGB(8), DecodingResult::U8(buf)) => {
            RgbImage::from_raw(w, h, buf).map(DynamicImage::ImageRgb8)
        }
        (ColorType::RGB(16), DecodingResult::U16(buf)) => {
            ImageBuffer::<Rgb<u16>, _>::from_raw(w, h, buf).map(DynamicImage::ImageRgb16)
        }
        (ColorType::RGBA(8), DecodingResult::U8(buf)) => {
            RgbaImage::from_raw(w, h, buf).map(DynamicImage::ImageRgba8)
        }
        (ColorType::RGBA(16), DecodingResult::U16(buf)) => {
            ImageBuffer::<Rgba<u16>, _>::from_raw(w, h, buf).map(DynamicImage::ImageRgba16)
        }
        (ColorType::CMYK(8), DecodingResult::U8(buf)) => {
            cmyk_to_rgb(w, h, &buf).map(DynamicImage::ImageRgb8)
        }
        (ColorType::Palette(8), DecodingResult::U8(buf)) => colormap
            .and_then(|map| apply_palette(w, h, &buf, map))
            .map(DynamicImage::ImageRgb8),
        (ColorType::YCbCr(8), DecodingResult::U8(buf)) => {
            if buf.len() != w as usize * h as usize * 3 {
                return Err(DecodeError::UnsupportedLayout("subsampled YCbCr".into()));
            }
            ycbcr_to_rgb(w, h, &buf).map(DynamicImage::ImageRgb8)
        }
        (other, _) => return Err(DecodeError::UnsupportedLayout(format!("{other:?}"))),
    };

    image
        .map(|image| image.to_rgba8())
        .ok_or_else(|| DecodeError::Frame {
            index,
            reason: "sample buffer does not match frame dimensions".into(),
        })
}

/// Unpack 1-bit rows (MSB first, each row byte-aligned) to 8-bit luma.
fn expand_bilevel(width: u32, height: u32, packed: &[u8]) -> Option<GrayImage> {
    let stride = (width as usize).div_ceil(8);
    if packed.len() < stride * height as usize {
        return None;
    }
    Some(GrayImage::from_fn(width, height, |x, y| {
        let byte = packed[y as usize * stride + x as usize / 8];
        let bit = (byte >> (7 - (x % 8))) & 1;
        Luma([if bit == 1 { 255 } else { 0 }])
    }))
}

/// Naive CMYK to RGB; archival scans rarely use CMYK but some scanners emit it.
fn cmyk_to_rgb(width: u32, height: u32, cmyk: &[u8]) -> Option<RgbImage> {
    if cmyk.len() != width as usize * height as usize * 4 {
        return None;
    }
    let rgb = cmyk
        .chunks_exact(4)
        .flat_map(|px| {
            let k = 255 - u16::from(px[3]);
            [px[0], px[1], px[2]].map(|c| ((255 - u16::from(c)) * k / 255) as u8)
        })
        .collect();
    RgbImage::from_raw(width, height, rgb)
}

/// Look up 8-bit indices in a TIFF colour map.
///
/// The map holds all reds, then all greens, then all blues, as 16-bit values.
fn apply_palette(width: u32, height: u32, indices: &[u8], colormap: &[u32]) -> Option<RgbImage> {
    const ENTRIES: usize = 256;
    if colormap.len() < ENTRIES * 3 || indices.len() != width as usize * height as usize {
        return None;
    }
    let channel = |plane: usize, index: u8| (colormap[plane * ENTRIES + usize::from(index)] >> 8) as u8;
    let rgb = indices
        .iter()
        .flat_map(|&index| [channel(0, index), channel(1, index), channel(2, index)])
        .collect();
    RgbImage::from_raw(width, height, rgb)
}

/// Full-range BT.601 YCbCr to RGB, one sample triple per pixel.
fn ycbcr_to_rgb(width: u32, height: u32, ycbcr: &[u8]) -> Option<RgbImage> {
    let rgb = ycbcr
        .chunks_exact(3)
        .flat_map(|px| {
            let y = f32::from(px[0]);
            let cb = f32::from(px[1]) - 128.0;
            let cr = f32::from(px[2]) - 128.0;
            [
                y + 1.402 * cr,
                y - 0.344_136 * cb - 0.714_136 * cr,
                y + 1.772 * cb,
            ]
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
        })
        .collect();
    RgbImage::from_raw(width, height, rgb)
}
