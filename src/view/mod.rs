//! The ledger page: the view controller, its markup and the route handlers
//! that drive it.

mod controller;
mod handlers;
mod templates;

pub use controller::{
    RowActionForm, TransactionForm, UserAction, ViewController, subscribe_view,
};
pub use handlers::{
    LedgerState, close_modal_endpoint, create_transaction_endpoint, edit_transaction_endpoint,
    get_ledger_page, get_new_transaction_form, toggle_theme_endpoint,
    transaction_action_endpoint,
};
