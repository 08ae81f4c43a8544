use crate::persistence::InMemoryStore;
use crate::token::TokenIssuer;
use axum::extract::State;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod config;
pub mod domain;
pub mod dto;
pub mod logging;
pub mod persistence;
pub mod routes;
pub mod routing_utils;
pub mod token;

/// Everything handlers share across requests
pub struct SharedData {
    pub store: InMemoryStore,
    pub tokens: TokenIssuer,
}

impl SharedData {
    pub fn new(jwt_secret: &str) -> Self {
        SharedData {
            store: InMemoryStore::new(),
            tokens: TokenIssuer::new(jwt_secret.as_bytes()),
        }
    }
}

/// Extractor type handlers use to reach [SharedData]
pub type AppState = State<Arc<SharedData>>;
