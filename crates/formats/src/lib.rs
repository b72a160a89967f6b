pub mod data_loader;
pub mod geojson;
pub mod map_config;
pub mod map_package;
pub mod table;

pub use data_loader::*;
pub use geojson::*;
pub use map_config::*;
pub use map_package::*;
pub use table::*;
