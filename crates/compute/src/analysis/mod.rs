pub mod classify;
pub mod join;
pub mod observations;
pub mod statistics;

pub use classify::*;
pub use join::*;
pub use observations::*;
pub use statistics::*;
