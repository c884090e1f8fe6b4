// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// TIFF writer — encode page images into the archival container using the
// `tiff` crate directly, so the resolution and compression tags are under our
// control (the `image` crate's TIFF encoder writes neither).

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use image::DynamicImage;
use registrar_core::{ArchivalBuffer, Compression, EncodeError, EncodeParams};
use tiff::encoder::compression::{Deflate, DeflateLevel};
use tiff::encoder::{Rational, TiffEncoder, TiffValue, colortype};
use tiff::tags::ResolutionUnit;
use tracing::{debug, info, instrument};

/// Encodes page images into archival TIFF buffers.
///
/// Parameters are fixed at construction; [`TiffWriter::archival`] gives the
/// submission profile (300 DPI, Adobe Deflate, no binarization).
#[derive(Debug, Clone, Copy)]
pub struct TiffWriter {
    params: EncodeParams,
}

impl Default for TiffWriter {
    fn default() -> Self {
        Self::archival()
    }
}

impl TiffWriter {
    pub fn new(params: EncodeParams) -> Self {
        Self { params }
    }

    /// Writer using the submission profile.
    pub fn archival() -> Self {
        Self::new(EncodeParams::ARCHIVAL)
    }

    pub fn params(&self) -> EncodeParams {
        self.params
    }

    // -- Entry points ---------------------------------------------------------

    /// Read an image file (JPEG, PNG, ...) and encode it as a one-frame TIFF.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn encode_file(&self, path: impl AsRef<Path>) -> Result<ArchivalBuffer, EncodeError> {
        let image = image::open(path.as_ref()).map_err(|err| EncodeError::Source {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        })?;
        self.encode_image(&image)
    }

    /// Encode a single decoded image as a one-frame TIFF.
    pub fn encode_image(&self, image: &DynamicImage) -> Result<ArchivalBuffer, EncodeError> {
        self.encode_frames(std::slice::from_ref(image))
    }

    /// Encode several images as consecutive frames of one container.
    ///
    /// The returned dimensions are those of the first frame.
    pub fn encode_frames(&self, images: &[DynamicImage]) -> Result<ArchivalBuffer, EncodeError> {
        let first = images
            .first()
            .ok_or_else(|| EncodeError::Tiff("no frames to write".into()))?;

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut cursor).map_err(tiff_error)?;
            for image in images {
                self.write_image(&mut encoder, image)?;
            }
        }
        let bytes = cursor.into_inner();

        info!(
            frames = images.len(),
            width = first.width(),
            height = first.height(),
            bytes = bytes.len(),
            dpi = self.params.dpi,
            "TIFF encoded"
        );
        Ok(ArchivalBuffer {
            bytes,
            params: self.params,
            width: first.width(),
            height: first.height(),
        })
    }

    // -- Frame writing --------------------------------------------------------

    /// Append one frame, keeping grayscale scans single-channel.
    fn write_image<W: Write + Seek>(
        &self,
        encoder: &mut TiffEncoder<W>,
        image: &DynamicImage,
    ) -> Result<(), EncodeError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(EncodeError::EmptyImage { width, height });
        }

        let color = image.color();
        if color.has_alpha() {
            debug!("writing RGBA frame");
            let rgba = image.to_rgba8();
            self.write_frame::<_, colortype::RGBA8>(encoder, width, height, rgba.as_raw())
        } else if color.has_color() {
            debug!("writing RGB frame");
            let rgb = image.to_rgb8();
            self.write_frame::<_, colortype::RGB8>(encoder, width, height, rgb.as_raw())
        } else {
            debug!("writing grayscale frame");
            let gray = image.to_luma8();
            self.write_frame::<_, colortype::Gray8>(encoder, width, height, gray.as_raw())
        }
    }

    fn write_frame<W, C>(
        &self,
        encoder: &mut TiffEncoder<W>,
        width: u32,
        height: u32,
        samples: &[C::Inner],
    ) -> Result<(), EncodeError>
    where
        W: Write + Seek,
        C: colortype::ColorType,
        [C::Inner]: TiffValue,
    {
        let compression = match self.params.compression {
            Compression::AdobeDeflate => Deflate::with_level(DeflateLevel::Balanced),
        };
        let mut frame = encoder
            .new_image_with_compression::<C, _>(width, height, compression)
            .map_err(tiff_error)?;
        frame.resolution(
            ResolutionUnit::Inch,
            Rational {
                n: self.params.dpi,
                d: 1,
            },
        );
        frame.write_data(samples).map_err(tiff_error)
    }
}

fn tiff_error(err: tiff::TiffError) -> EncodeError {
    EncodeError::Tiff(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use tiff::decoder::Decoder;
    use tiff::decoder::ifd::Value;
    use tiff::tags::Tag;

    fn sample_rgb() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(40, 30, |x, y| {
            Rgb([(x * 6) as u8, (y * 8) as u8, 128])
        }))
    }

    #[test]
    fn writes_archival_tags() {
        let buffer = TiffWriter::archival()
            .encode_image(&sample_rgb())
            .expect("encode");
        assert_eq!(buffer.width, 40);
        assert_eq!(buffer.height, 30);
        assert_eq!(buffer.params, EncodeParams::ARCHIVAL);

        let mut decoder = Decoder::new(Cursor::new(&buffer.bytes)).expect("decoder");
        assert_eq!(decoder.dimensions().expect("dims"), (40, 30));
        assert_eq!(
            decoder.get_tag_u32(Tag::Compression).expect("compression"),
            u32::from(Compression::AdobeDeflate.tag_value())
        );
        assert_eq!(decoder.get_tag_u32(Tag::ResolutionUnit).expect("unit"), 2);
        assert_eq!(
            decoder.get_tag(Tag::XResolution).expect("xres"),
            Value::Rational(300, 1)
        );
        assert_eq!(
            decoder.get_tag(Tag::YResolution).expect("yres"),
            Value::Rational(300, 1)
        );
    }

    #[test]
    fn grayscale_stays_single_channel() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([200])));
        let buffer = TiffWriter::archival().encode_image(&gray).expect("encode");
        let mut decoder = Decoder::new(Cursor::new(&buffer.bytes)).expect("decoder");
        assert_eq!(decoder.colortype().expect("colortype"), tiff::ColorType::Gray(8));
    }

    #[test]
    fn multiple_frames_share_one_container() {
        let frames = [sample_rgb(), DynamicImage::ImageLuma8(GrayImage::new(5, 5))];
        let buffer = TiffWriter::archival().encode_frames(&frames).expect("encode");
        let mut decoder = Decoder::new(Cursor::new(&buffer.bytes)).expect("decoder");
        assert!(decoder.more_images());
        decoder.next_image().expect("second frame");
        assert_eq!(decoder.dimensions().expect("dims"), (5, 5));
        assert!(!decoder.more_images());
    }

    #[test]
    fn empty_image_is_rejected() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 10));
        let err = TiffWriter::archival().encode_image(&empty).unwrap_err();
        assert_eq!(err, EncodeError::EmptyImage { width: 0, height: 10 });
    }

    #[test]
    fn missing_source_file_reports_path() {
        let err = TiffWriter::archival()
            .encode_file("/nonexistent/page.png")
            .unwrap_err();
        assert!(matches!(err, EncodeError::Source { ref path, .. } if path == "/nonexistent/page.png"));
    }

    #[test]
    fn encodes_png_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("front.png");
        sample_rgb().save(&path).expect("save png");

        let buffer = TiffWriter::archival().encode_file(&path).expect("encode");
        assert_eq!((buffer.width, buffer.height), (40, 30));
        assert!(!buffer.is_empty());
    }
}
