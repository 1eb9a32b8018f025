// Copyright @yucwang 2023

pub mod camera_loader;
pub mod exr_utils;
pub mod png_utils;
pub mod preview;
