pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod dataset;
pub mod entities;
pub mod extractor;
pub mod fetcher;
pub mod health;
pub mod inference;
pub mod middleware;
pub mod orchestrator;
pub mod passwords;
pub mod repositories;
pub mod safety;
pub mod telemetry;
pub mod text;

#[cfg(test)]
mod test_support;
