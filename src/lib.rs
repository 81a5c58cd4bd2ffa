pub mod app;
pub mod config;
pub mod error;
pub mod idle;
pub mod pose;
pub mod render;
pub mod sensor;
pub mod skeleton;
