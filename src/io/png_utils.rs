// Copyright @yucwang 2026

use crate::core::error::{ObserveError, ObserveResult};
use crate::math::bitmap::Bitmap;
use std::path::Path;

fn to_u8(v: f32) -> u8 {
    (v.max(0.0).min(1.0) * 255.0 + 0.5) as u8
}

/// Write a display frame (sRGB in `[0, 1]`) as an 8-bit image. The format is
/// chosen from the file extension.
pub fn write_display_frame<P: AsRef<Path>>(frame: &Bitmap, path: P) -> ObserveResult<()> {
    let path = path.as_ref();
    let image = image::RgbImage::from_fn(frame.width() as u32, frame.height() as u32, |x, y| {
        let p = frame[(x as usize, y as usize)];
        image::Rgb([to_u8(p.x), to_u8(p.y), to_u8(p.z)])
    });
    image.save(path).map_err(|e| ObserveError::Image(e.to_string()))?;
    log::info!("Image written to: {}.", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Vector3f;

    #[test]
    fn test_quantisation() {
        assert_eq!(to_u8(0.0), 0);
        assert_eq!(to_u8(1.0), 255);
        assert_eq!(to_u8(2.0), 255);
        assert_eq!(to_u8(-1.0), 0);
        assert_eq!(to_u8(0.5), 128);
    }

    #[test]
    fn test_write_png_round_trip() {
        let mut frame = Bitmap::new(3, 2);
        frame[(2, 1)] = Vector3f::new(1.0, 0.0, 0.5);
        let path = std::env::temp_dir().join(format!("spectral_camera_png_{}.png", std::process::id()));
        write_display_frame(&frame, &path).unwrap();

        let read = image::open(&path).unwrap().to_rgb8();
        assert_eq!(read.dimensions(), (3, 2));
        assert_eq!(read.get_pixel(2, 1).0, [255, 0, 128]);
        assert_eq!(read.get_pixel(0, 0).0, [0, 0, 0]);
        let _ = std::fs::remove_file(&path);
    }
}
