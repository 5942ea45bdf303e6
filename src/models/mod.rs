pub mod camera;
pub mod layer;
pub mod region;
pub mod style;
