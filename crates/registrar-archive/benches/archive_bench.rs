// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the archival container path: encoding a scanned
// page to TIFF and rendering a received container back into a PNG preview.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use registrar_archive::{TiffWriter, render_preview};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// A 600x400 gradient, roughly the texture of a photographed form.
fn synthetic_page() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(600, 400, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn bench_encode(c: &mut Criterion) {
    let page = synthetic_page();
    let writer = TiffWriter::archival();

    c.bench_function("tiff_encode (600x400 rgb)", |b| {
        b.iter(|| {
            let buffer = writer.encode_image(black_box(&page)).expect("encode");
            black_box(buffer.len());
        });
    });
}

fn bench_preview(c: &mut Criterion) {
    let container = TiffWriter::archival()
        .encode_image(&synthetic_page())
        .expect("encode")
        .bytes;

    c.bench_function("render_preview (600x400 -> png)", |b| {
        b.iter(|| {
            let preview = render_preview(black_box(&container), None).expect("render");
            black_box(preview.png.len());
        });
    });

    c.bench_function("render_preview (600x400 -> max 200)", |b| {
        b.iter(|| {
            let preview = render_preview(black_box(&container), Some(200)).expect("render");
            black_box(preview.png.len());
        });
    });
}

criterion_group!(benches, bench_encode, bench_preview);
criterion_main!(benches);
