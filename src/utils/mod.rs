pub mod style;
pub mod summary;
pub mod tiles;
