//! Curation dataset: user feedback, listing, and per-tag statistics.

pub mod dtos;
pub mod handlers;
