pub mod errors;
pub mod events;
pub mod models;
pub mod ports;
pub mod projection;
pub mod service;
