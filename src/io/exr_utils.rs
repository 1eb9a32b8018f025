/* Copyright 2020 @TwoCookingMice */

use crate::core::error::{ObserveError, ObserveResult};
use crate::math::bitmap::Bitmap;
use crate::math::colour::ciexyz_to_linear_srgb;
use crate::math::constants::{Float, Vector3f};

use exr::prelude::*;

// Write EXR Image to file
pub fn write_exr_to_file(image: &[(Float, Float, Float)],
                         width: usize,
                         height: usize,
                         file_path: &str) -> ObserveResult<()> {
    log::info!("Starting writing openexr images: {}.", file_path);

    write_rgb_file(file_path, width, height, |x, y| {
        let p = image[y * width + x];
        (p.0, p.1, p.2)
    })
    .map_err(|e| ObserveError::Image(e.to_string()))?;

    log::info!("EXR written to: {}.", file_path);
    Ok(())
}

/// Write a tristimulus frame as linear sRGB floats.
pub fn write_xyz_frame(xyz_frame: &Bitmap, file_path: &str) -> ObserveResult<()> {
    let linear: Vec<(Float, Float, Float)> = xyz_frame
        .raw_copy()
        .into_iter()
        .map(|(x, y, z)| {
            let rgb = ciexyz_to_linear_srgb(&Vector3f::new(x, y, z));
            (rgb.x, rgb.y, rgb.z)
        })
        .collect();
    write_exr_to_file(&linear, xyz_frame.width(), xyz_frame.height(), file_path)
}
