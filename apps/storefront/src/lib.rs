// apps/storefront/src/lib.rs

//! Storefront REST API: products, categories, users, carts and a chat relay,
//! backed by Postgres (or an in-memory store) with a Redis-or-local cache in
//! front of the categories listing.

pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod repos;
pub mod services;
pub mod state;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
