//! Fixtures shared by unit tests.

use std::io::Cursor;

/// Encodes a blank RGB image of the given size as PNG.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}
