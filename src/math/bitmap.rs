// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f };

use std::ops;
use std::vec::Vec;

/// Row-major grid of colour triplets, addressed by `(x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    data: Vec<Vector3f>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = Vector3f;

    fn index(&self, index: (usize, usize)) -> &Vector3f {
        assert!(index.0 < self.width && index.1 < self.height,
                "pixel ({}, {}) outside {}x{} bitmap", index.0, index.1, self.width, self.height);
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Vector3f {
        assert!(index.0 < self.width && index.1 < self.height,
                "pixel ({}, {}) outside {}x{} bitmap", index.0, index.1, self.width, self.height);
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        let pixel_number = width * height;
        Self { data: vec!(Vector3f::zeros(); pixel_number),
               width: width,
               height: height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    /// Multiply every cell by `factor`.
    pub fn scale(&mut self, factor: Float) {
        for value in self.data.iter_mut() {
            *value *= factor;
        }
    }

    pub fn clear(&mut self) {
        for value in self.data.iter_mut() {
            *value = Vector3f::zeros();
        }
    }

    pub fn raw_copy(&self) -> Vec<(Float, Float, Float)> {
        self.data.iter().map(|v| (v.x, v.y, v.z)).collect()
    }
}

/* Test for Bitmap */
