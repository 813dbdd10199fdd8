pub mod actors;
pub mod api;
pub mod config;
pub mod geo;
pub mod messages;
pub mod surface;
