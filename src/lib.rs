pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod startup;
pub mod telemetry;
pub mod upstream;
