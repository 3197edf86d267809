use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use std::io::Cursor;

/// Encodes a gradient of the given size in `format`
pub fn encode_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let buffer = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(buffer)
        .write_to(&mut out, format)
        .expect("Failed to encode test image");
    out.into_inner()
}

pub fn test_image_base64(width: u32, height: u32, format: ImageFormat) -> String {
    STANDARD.encode(encode_test_image(width, height, format))
}

/// Bytes recognised as PNG by their signature, padded to `size`
pub fn oversized_payload(size: usize) -> Vec<u8> {
    let mut bytes = encode_test_image(8, 8, ImageFormat::Png);
    bytes.resize(size, 0);
    bytes
}
