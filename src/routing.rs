//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    internal_server_error::get_internal_server_error_page,
    logging::logging_middleware,
    not_found::get_404_not_found,
    view::{
        close_modal_endpoint, create_transaction_endpoint, edit_transaction_endpoint,
        get_ledger_page, get_new_transaction_form, toggle_theme_endpoint,
        transaction_action_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_ledger_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_form))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .route(endpoints::TRANSACTIONS_API, post(create_transaction_endpoint))
        .route(
            endpoints::TRANSACTION_ACTION,
            post(transaction_action_endpoint),
        )
        .route(endpoints::TRANSACTION, put(edit_transaction_endpoint))
        .route(endpoints::CLOSE_MODAL, post(close_modal_endpoint))
        .route(endpoints::THEME, post(toggle_theme_endpoint))
        .layer(middleware::from_fn(logging_middleware))
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}
