//! Error types for the bot process.
//!
//! `AppError` is the top-level error that wraps the domain-specific errors and the
//! errors of the libraries the bot talks to. Event handlers and scheduled jobs never
//! propagate it to Discord; they log it and carry on.

pub mod cache;
pub mod config;
pub mod internal;

use thiserror::Error;

use crate::error::{cache::CacheError, config::ConfigError, internal::InternalError};

/// Top-level application error type.
///
/// Aggregates all possible error types that can occur in the application. Most
/// variants use `#[from]` for automatic error conversion with `?`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Fast cache operation failed.
    #[error(transparent)]
    CacheErr(#[from] CacheError),

    /// Internal issue indicating unexpected data, usually a malformed stored id.
    #[error(transparent)]
    InternalErr(#[from] InternalError),

    /// Database operation error from SeaORM.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// A cached record could not be (de)serialized.
    #[error(transparent)]
    SerdeErr(#[from] serde_json::Error),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}
