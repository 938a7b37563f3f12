pub mod app;
pub mod audio;
pub mod config;
pub mod cover;
pub mod manifest;
pub mod model;
pub mod player;
pub mod recommend;
pub mod ui;
