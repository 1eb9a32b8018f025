// Copyright @yucwang 2021

pub mod parallel;
pub mod renderer;
pub mod sequential;
