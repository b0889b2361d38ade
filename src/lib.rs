pub mod ai;
pub mod config;
pub mod documents;
pub mod error;
pub mod export;
pub mod models;
pub mod routes;
pub mod state;
pub mod youtube;
