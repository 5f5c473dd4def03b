pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod pagination;
pub mod repository;
pub mod services;

pub use error::{AppError, Result};
