// Library for tests to access modules

pub mod config;
pub mod decoder;
pub mod duration;
pub mod error;
pub mod metrics;
pub mod models;
pub mod projector;
pub mod routes;
pub mod tdarr_client;
pub mod version;
pub mod worker;
