/* Copyright 2020 @Yuchen Wong */

pub type Float = f32;

pub type Vector3f = nalgebra::Vector3<Float>;

pub const EPSILON: Float = 1e-4;

// Visible range sampled by default, in nanometres.
pub const DEFAULT_MIN_WAVELENGTH: Float = 375.0;
pub const DEFAULT_MAX_WAVELENGTH: Float = 740.0;
