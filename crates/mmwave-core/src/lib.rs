pub mod bounds;
pub mod config;
pub mod logging;
pub mod point;
pub mod pointcloud;
