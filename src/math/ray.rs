// Copyright 2020 @TwoCookingMice

use super::constants::Vector3f;

/// A ray leaving the camera aperture. The direction is always unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
}

impl Ray3f {
    pub fn new(origin: Vector3f, dir: Vector3f) -> Self {
        Self { origin, dir: dir.normalize() }
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }
}
