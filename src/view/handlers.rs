//! Route handlers for the ledger page.
//!
//! Every interaction is fed to the [Tracker] as a [UserAction] and answered
//! with a fresh render of the ledger region.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRefresh;

use crate::{
    AppState, Error,
    theme::{PREFERS_COLOR_SCHEME_HEADER, preferred_theme},
    tracker::Tracker,
    transaction::TransactionId,
    view::{RowActionForm, TransactionForm, UserAction},
};

/// The state needed by the ledger handlers.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub tracker: Arc<Mutex<Tracker>>,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            tracker: state.tracker.clone(),
        }
    }
}

/// Render the full ledger page.
///
/// Until the user picks a theme, the page follows the browser's color scheme.
/// The response asks the browser to send it as a client hint.
pub async fn get_ledger_page(State(state): State<LedgerState>, headers: HeaderMap) -> Response {
    let tracker = match state.tracker.lock() {
        Ok(tracker) => tracker,
        Err(error) => {
            tracing::error!("could not acquire tracker lock: {error}");
            return Error::StateLockError.into_response();
        }
    };

    let client_hints = [
        ("accept-ch", PREFERS_COLOR_SCHEME_HEADER),
        ("critical-ch", PREFERS_COLOR_SCHEME_HEADER),
        ("vary", PREFERS_COLOR_SCHEME_HEADER),
    ];

    match tracker.render_page(preferred_theme(&headers)) {
        Ok(page) => (client_hints, page).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Open the form for a new transaction.
pub async fn get_new_transaction_form(State(state): State<LedgerState>) -> Response {
    interact(&state, UserAction::OpenNewForm)
}

/// Submit the new transaction form.
pub async fn create_transaction_endpoint(
    State(state): State<LedgerState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    interact(&state, UserAction::SubmitNew(form))
}

/// Handle a click on a row's edit or delete button.
pub async fn transaction_action_endpoint(
    State(state): State<LedgerState>,
    Form(form): Form<RowActionForm>,
) -> Response {
    interact(&state, UserAction::Row(form))
}

/// Submit the edit form for the transaction in the path.
pub async fn edit_transaction_endpoint(
    State(state): State<LedgerState>,
    Path(transaction_id): Path<String>,
    Form(form): Form<TransactionForm>,
) -> Response {
    interact(
        &state,
        UserAction::SubmitEdit {
            id: TransactionId::new(transaction_id),
            form,
        },
    )
}

/// Dismiss the transaction form.
pub async fn close_modal_endpoint(State(state): State<LedgerState>) -> Response {
    interact(&state, UserAction::CloseModal)
}

/// Switch themes and ask the client to reload the page.
pub async fn toggle_theme_endpoint(
    State(state): State<LedgerState>,
    headers: HeaderMap,
) -> Response {
    let mut tracker = match state.tracker.lock() {
        Ok(tracker) => tracker,
        Err(error) => {
            tracing::error!("could not acquire tracker lock: {error}");
            return Error::StateLockError.into_alert_response();
        }
    };

    let action = UserAction::ToggleTheme {
        preferred: preferred_theme(&headers),
    };

    match tracker.interact(action) {
        Ok(()) => (HxRefresh(true), StatusCode::OK).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

fn interact(state: &LedgerState, action: UserAction) -> Response {
    let mut tracker = match state.tracker.lock() {
        Ok(tracker) => tracker,
        Err(error) => {
            tracing::error!("could not acquire tracker lock: {error}");
            return Error::StateLockError.into_alert_response();
        }
    };

    if let Err(error) = tracker.interact(action) {
        tracing::error!("could not handle user action: {error}");
        return error.into_alert_response();
    }

    match tracker.render_ledger() {
        Ok((status, ledger)) => (status, ledger).into_response(),
        Err(error) => error.into_alert_response(),
    }
}
