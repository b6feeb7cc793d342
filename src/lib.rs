pub mod audit;
pub mod cli;
pub mod config;
pub mod output;
pub mod pki;
pub mod telemetry;
