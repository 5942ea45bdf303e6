pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod endpoints;
pub mod error;
pub mod legend;
pub mod manifest;
pub mod models;
pub mod utils;
pub mod viewer;

pub use catalog::RegionCatalog;
pub use config::{Config, Source};
pub use coordinator::{DualPanelCoordinator, PanelLink};
pub use endpoints::server::ViewerServer;
