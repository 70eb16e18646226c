pub mod errors;
pub mod models;
pub mod ports;
pub mod registry;
pub mod service;
pub mod verification;
