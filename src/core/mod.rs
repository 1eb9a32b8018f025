// Copyright @yucwang 2021

pub mod accumulator;
pub mod camera;
pub mod channel;
pub mod config;
pub mod error;
pub mod rng;
pub mod sensor;
pub mod statistics;
pub mod world;
