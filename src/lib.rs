//! Pocket Ledger is a single-page web app for tracking income and expenses.
//!
//! The page is served as HTML and driven by htmx. Behind it, a transaction
//! store and a view controller talk to each other over an in-process event
//! bus, and the ledger is persisted in a string key/value store backed by
//! SQLite.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::{HxReswap, SwapOption};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod bus;
mod db;
mod endpoints;
mod event;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod routing;
mod storage;
mod theme;
mod tracker;
mod transaction;
mod view;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use bus::{EventBus, Outbox, SubscriptionId};
pub use db::initialize as initialize_db;
pub use event::{Event, EventKind};
pub use logging::logging_middleware;
pub use routing::build_router;
pub use storage::{SqliteStorage, Storage};
pub use tracker::Tracker;
pub use transaction::{
    IdGenerator, RandomIdGenerator, Totals, Transaction, TransactionData, TransactionId,
    TransactionType,
};

use crate::{alert::Alert, internal_server_error::InternalServerError};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Could not acquire the lock on the tracker or one of its components.
    #[error("could not acquire the application state lock")]
    StateLockError,

    /// A row button sent an action other than edit or delete.
    #[error("unknown transaction action \"{0}\"")]
    UnknownRowAction(String),
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", error);
        Error::SqlError(error)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::DatabaseLockError | Error::StateLockError => {
                InternalServerError::default().into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert for the page's alert container.
    fn into_alert_response(self) -> Response {
        let (status, alert) = match self {
            Error::UnknownRowAction(action) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid transaction action",
                    &format!("\"{action}\" is not an action that can be applied to a transaction."),
                ),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        };

        (status, HxReswap(SwapOption::InnerHtml), alert).into_response()
    }
}
