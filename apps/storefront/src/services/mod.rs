// apps/storefront/src/services/mod.rs

pub mod auth_service;
pub mod category_cache;
pub mod chat_relay;
pub mod seeder;
pub mod token_service;
