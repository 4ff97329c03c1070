//! Orquideas Core - Domain models, configuration, and dataset readers
//!
//! This crate contains the domain types shared by the spatial join and the
//! aggregators, the layered configuration, and the readers that turn polygon
//! and occurrence files into typed records.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;

pub use error::{OrquideaError, Result};
