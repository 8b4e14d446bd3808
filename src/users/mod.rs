use crate::state::AppState;
use axum::Router;

mod dto;
mod filter;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
