pub mod animation;
pub mod camera;
pub mod config;
pub mod core;
pub mod error;
pub mod lifecycle;
pub mod loading;
pub mod point_cloud;
pub mod proximity;
pub mod scene;
