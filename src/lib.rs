pub mod arrivals;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod events;
pub mod models;
pub mod output;
pub mod state;
pub mod stats;
