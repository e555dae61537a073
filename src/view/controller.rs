//! The view controller: keeps the last published snapshot of the ledger and
//! turns user interaction into bus events.

use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use maud::Markup;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    alert::Alert,
    bus::EventBus,
    event::{Event, EventKind},
    storage::Storage,
    theme::{Theme, load_theme, save_theme},
    html::format_currency,
    transaction::{
        MAX_AMOUNT, Totals, Transaction, TransactionData, TransactionId, TransactionType,
    },
    view::templates::{LedgerProps, ledger_page, ledger_view},
};

/// The fields of the transaction form as submitted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    pub description: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

impl TransactionForm {
    /// Pre-fill the form with the fields of `transaction`.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            description: transaction.description.clone(),
            amount: transaction.amount.to_string(),
            transaction_type: transaction.transaction_type,
        }
    }

    /// Validate the form and convert it into transaction data.
    ///
    /// # Errors
    /// Returns a message for the user if the description is blank or the
    /// amount is not a number greater than zero and at most [MAX_AMOUNT].
    pub fn parse(&self) -> Result<TransactionData, String> {
        let description = self.description.trim();

        if description.is_empty() {
            return Err("Description cannot be empty".to_owned());
        }

        let amount: f64 = self
            .amount
            .trim()
            .parse()
            .map_err(|_| format!("\"{}\" is not a valid amount", self.amount))?;

        if !amount.is_finite() || amount <= 0.0 {
            return Err("Amount must be greater than zero".to_owned());
        }

        if amount > MAX_AMOUNT {
            return Err(format!(
                "Amount cannot be more than {}",
                format_currency(MAX_AMOUNT)
            ));
        }

        Ok(TransactionData::new(
            description,
            amount,
            self.transaction_type,
        ))
    }
}

/// The row metadata sent by a transaction's edit or delete button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowActionForm {
    pub transaction_id: String,
    pub transaction_action: String,
}

/// What a row button asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

impl RowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowAction::Edit => "edit",
            RowAction::Delete => "delete",
        }
    }

    /// Decode a row's action attribute.
    ///
    /// # Errors
    /// Returns [Error::UnknownRowAction] for anything other than "edit" or "delete".
    pub fn parse(action: &str) -> Result<Self, Error> {
        match action {
            "edit" => Ok(RowAction::Edit),
            "delete" => Ok(RowAction::Delete),
            other => Err(Error::UnknownRowAction(other.to_owned())),
        }
    }
}

/// The transaction form currently shown in the modal.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Creating a new transaction.
    New {
        form: TransactionForm,
        error: Option<String>,
    },
    /// Editing the transaction with `id`.
    Edit {
        id: TransactionId,
        form: TransactionForm,
        error: Option<String>,
    },
}

/// Interaction coming from the page.
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    /// The "Add new" button was clicked.
    OpenNewForm,
    /// The new transaction form was submitted.
    SubmitNew(TransactionForm),
    /// An edit or delete button in the list was clicked.
    Row(RowActionForm),
    /// The edit form for `id` was submitted.
    SubmitEdit {
        id: TransactionId,
        form: TransactionForm,
    },
    /// The close button or the modal backdrop was clicked.
    CloseModal,
    /// The theme button was clicked. `preferred` is the browser's theme, used
    /// when no theme has been saved yet.
    ToggleTheme { preferred: Theme },
}

/// Renders the ledger from the most recently published list.
pub struct ViewController {
    transactions: Vec<Transaction>,
    totals: Totals,
    modal: Option<Modal>,
    alert: Option<(StatusCode, Alert)>,
    theme: Option<Theme>,
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for ViewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewController")
            .field("transactions", &self.transactions)
            .field("totals", &self.totals)
            .field("modal", &self.modal)
            .field("alert", &self.alert)
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

impl ViewController {
    /// Create a controller with an empty snapshot and the theme saved in `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            transactions: Vec::new(),
            totals: Totals::default(),
            modal: None,
            alert: None,
            theme: load_theme(storage.as_ref()),
            storage,
        }
    }

    /// The snapshot the view renders.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    #[cfg(test)]
    pub fn totals(&self) -> Totals {
        self.totals
    }

    #[cfg(test)]
    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    #[cfg(test)]
    pub fn theme(&self) -> Option<Theme> {
        self.theme
    }

    /// Turn a user action into the event to publish, if any.
    ///
    /// # Errors
    /// Returns [Error::UnknownRowAction] if a row button sent an action that
    /// is neither edit nor delete.
    pub fn handle_action(&mut self, action: UserAction) -> Result<Option<Event>, Error> {
        let event = match action {
            UserAction::OpenNewForm => {
                self.modal = Some(Modal::New {
                    form: TransactionForm::default(),
                    error: None,
                });
                None
            }
            UserAction::SubmitNew(form) => match form.parse() {
                Ok(data) => {
                    self.modal = None;
                    Some(Event::TransactionSubmitted(data))
                }
                Err(error) => {
                    self.modal = Some(Modal::New {
                        form,
                        error: Some(error),
                    });
                    None
                }
            },
            UserAction::Row(row) => {
                let id = TransactionId::new(row.transaction_id);

                match RowAction::parse(&row.transaction_action)? {
                    RowAction::Edit => Some(Event::EditDataRequested(id)),
                    RowAction::Delete => Some(Event::DeleteRequested(id)),
                }
            }
            UserAction::SubmitEdit { id, form } => match form.parse() {
                Ok(data) => {
                    self.modal = None;
                    Some(Event::EditCommitted { id, data })
                }
                Err(error) => {
                    self.modal = Some(Modal::Edit {
                        id,
                        form,
                        error: Some(error),
                    });
                    None
                }
            },
            UserAction::CloseModal => {
                self.modal = None;
                None
            }
            UserAction::ToggleTheme { preferred } => {
                let theme = self.theme.unwrap_or(preferred).toggled();
                self.theme = Some(theme);

                if let Err(error) = save_theme(self.storage.as_ref(), theme) {
                    tracing::error!("Could not save theme preference: {error}");
                }

                None
            }
        };

        Ok(event)
    }

    /// React to an event published by the store.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::TransactionsChanged(transactions) => {
                self.totals = Totals::from_transactions(transactions);
                self.transactions = transactions.clone();
            }
            Event::EditDataReady(transaction) => {
                self.modal = Some(Modal::Edit {
                    id: transaction.id.clone(),
                    form: TransactionForm::from_transaction(transaction),
                    error: None,
                });
            }
            Event::TransactionNotFound(id) => {
                tracing::debug!("Showing not found alert for transaction {id}");
                self.modal = None;
                self.alert = Some((
                    StatusCode::NOT_FOUND,
                    Alert::error(
                        "Could not find transaction",
                        "The transaction may have already been deleted. \
                        The list has been refreshed.",
                    ),
                ));
            }
            _ => {}
        }
    }

    /// Render the ledger region. A pending alert is shown once and sets the status.
    pub fn render_ledger(&mut self) -> (StatusCode, Markup) {
        let (status, alert) = match self.alert.take() {
            Some((status, alert)) => (status, Some(alert)),
            None => (StatusCode::OK, None),
        };

        let markup = ledger_view(&LedgerProps {
            transactions: &self.transactions,
            totals: self.totals,
            modal: self.modal.as_ref(),
            alert: alert.as_ref(),
        });

        (status, markup)
    }

    /// Render the full page in the saved theme, or `preferred` if the user has
    /// not picked one.
    pub fn render_page(&mut self, preferred: Theme) -> Markup {
        let theme = self.theme.unwrap_or(preferred);
        let (_, ledger) = self.render_ledger();

        ledger_page(theme, &ledger)
    }
}

/// Subscribe `view` to the events it renders.
pub fn subscribe_view(view: &Arc<Mutex<ViewController>>, bus: &mut EventBus) {
    let kinds = [
        EventKind::TransactionsChanged,
        EventKind::EditDataReady,
        EventKind::TransactionNotFound,
    ];

    for kind in kinds {
        let view = view.clone();

        bus.subscribe(kind, move |event, _| {
            let mut view = view.lock().map_err(|error| {
                tracing::error!("could not acquire view lock: {error}");
                Error::StateLockError
            })?;

            view.handle_event(event);

            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::{
        Error,
        event::Event,
        storage::{SqliteStorage, Storage, THEME_KEY},
        theme::Theme,
        transaction::{
            MAX_AMOUNT, Totals, Transaction, TransactionData, TransactionId, TransactionType,
        },
    };

    use super::{Modal, RowActionForm, TransactionForm, UserAction, ViewController};

    fn get_test_view() -> (ViewController, Arc<SqliteStorage>) {
        let storage = Arc::new(SqliteStorage::in_memory().unwrap());

        (ViewController::new(storage.clone()), storage)
    }

    fn form(description: &str, amount: &str, transaction_type: TransactionType) -> TransactionForm {
        TransactionForm {
            description: description.to_owned(),
            amount: amount.to_owned(),
            transaction_type,
        }
    }

    fn row(id: &str, action: &str) -> UserAction {
        UserAction::Row(RowActionForm {
            transaction_id: id.to_owned(),
            transaction_action: action.to_owned(),
        })
    }

    fn coffee(id: &str) -> Transaction {
        Transaction::from_data(
            TransactionId::new(id),
            TransactionData::new("Coffee", 4.5, TransactionType::Expense),
        )
    }

    #[test]
    fn open_new_form_defaults_to_income() {
        let (mut view, _) = get_test_view();

        let event = view.handle_action(UserAction::OpenNewForm).unwrap();

        assert_eq!(event, None);
        match view.modal() {
            Some(Modal::New { form, error }) => {
                assert_eq!(form.transaction_type, TransactionType::Income);
                assert!(form.description.is_empty());
                assert!(form.amount.is_empty());
                assert_eq!(error, &None);
            }
            other => panic!("want new transaction form, got {other:?}"),
        }
    }

    #[test]
    fn submit_new_publishes_parsed_data_and_closes_form() {
        let (mut view, _) = get_test_view();
        view.handle_action(UserAction::OpenNewForm).unwrap();

        let event = view
            .handle_action(UserAction::SubmitNew(form(
                "Coffee",
                "4.5",
                TransactionType::Expense,
            )))
            .unwrap();

        assert_eq!(
            event,
            Some(Event::TransactionSubmitted(TransactionData::new(
                "Coffee",
                4.5,
                TransactionType::Expense
            )))
        );
        assert_eq!(view.modal(), None);
    }

    #[test]
    fn invalid_amount_keeps_form_open_with_error() {
        let cases = ["", "abc", "0", "-3", "inf", "NaN", "1e300", "1000000000000.01"];

        for amount in cases {
            let (mut view, _) = get_test_view();

            let event = view
                .handle_action(UserAction::SubmitNew(form(
                    "Coffee",
                    amount,
                    TransactionType::Expense,
                )))
                .unwrap();

            assert_eq!(event, None, "amount {amount:?} should not be published");
            assert!(
                matches!(view.modal(), Some(Modal::New { error: Some(_), .. })),
                "want form error for amount {amount:?}, got {:?}",
                view.modal()
            );
        }
    }

    #[test]
    fn blank_description_is_rejected() {
        let (mut view, _) = get_test_view();

        let event = view
            .handle_action(UserAction::SubmitNew(form(
                "   ",
                "1",
                TransactionType::Income,
            )))
            .unwrap();

        assert_eq!(event, None);
        assert!(matches!(
            view.modal(),
            Some(Modal::New { error: Some(error), .. }) if error == "Description cannot be empty"
        ));
    }

    #[test]
    fn row_actions_become_events() {
        let (mut view, _) = get_test_view();

        assert_eq!(
            view.handle_action(row("ab", "edit")).unwrap(),
            Some(Event::EditDataRequested(TransactionId::new("ab")))
        );
        assert_eq!(
            view.handle_action(row("ab", "delete")).unwrap(),
            Some(Event::DeleteRequested(TransactionId::new("ab")))
        );
    }

    #[test]
    fn unknown_row_action_is_an_error() {
        let (mut view, _) = get_test_view();

        let result = view.handle_action(row("ab", "archive"));

        assert_eq!(result, Err(Error::UnknownRowAction("archive".to_owned())));
    }

    #[test]
    fn edit_data_opens_prefilled_form() {
        let (mut view, _) = get_test_view();
        let transaction = coffee("ab");

        view.handle_event(&Event::EditDataReady(transaction.clone()));

        assert_eq!(
            view.modal(),
            Some(&Modal::Edit {
                id: transaction.id,
                form: form("Coffee", "4.5", TransactionType::Expense),
                error: None,
            })
        );
    }

    #[test]
    fn submit_edit_publishes_id_and_data() {
        let (mut view, _) = get_test_view();
        view.handle_event(&Event::EditDataReady(coffee("ab")));

        let event = view
            .handle_action(UserAction::SubmitEdit {
                id: TransactionId::new("ab"),
                form: form("Tea", "3", TransactionType::Expense),
            })
            .unwrap();

        assert_eq!(
            event,
            Some(Event::EditCommitted {
                id: TransactionId::new("ab"),
                data: TransactionData::new("Tea", 3.0, TransactionType::Expense),
            })
        );
        assert_eq!(view.modal(), None);
    }

    #[test]
    fn close_modal_publishes_nothing() {
        let (mut view, _) = get_test_view();
        view.handle_action(UserAction::OpenNewForm).unwrap();

        let event = view.handle_action(UserAction::CloseModal).unwrap();

        assert_eq!(event, None);
        assert_eq!(view.modal(), None);
    }

    #[test]
    fn changed_list_updates_snapshot_and_totals() {
        let (mut view, _) = get_test_view();
        let transactions = vec![coffee("1")];

        view.handle_event(&Event::TransactionsChanged(transactions.clone()));

        assert_eq!(view.transactions(), transactions);
        assert_eq!(
            view.totals(),
            Totals {
                income: 0.0,
                expense: 4.5
            }
        );
    }

    #[test]
    fn not_found_closes_form_and_shows_alert_once() {
        let (mut view, _) = get_test_view();
        view.handle_event(&Event::EditDataReady(coffee("ab")));

        view.handle_event(&Event::TransactionNotFound(TransactionId::new("ab")));

        assert_eq!(view.modal(), None);
        let (status, _) = view.render_ledger();
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = view.render_ledger();
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn largest_amount_is_accepted() {
        let result = form("House", "1000000000000", TransactionType::Expense).parse();

        assert_eq!(
            result,
            Ok(TransactionData::new(
                "House",
                MAX_AMOUNT,
                TransactionType::Expense
            ))
        );
    }

    #[test]
    fn huge_amount_has_limit_message() {
        let result = form("Galaxy", "1e300", TransactionType::Expense).parse();

        assert_eq!(
            result,
            Err("Amount cannot be more than $1,000,000,000,000.00".to_owned())
        );
    }

    #[test]
    fn toggle_theme_persists_choice() {
        let (mut view, storage) = get_test_view();
        assert_eq!(view.theme(), None);

        view.handle_action(UserAction::ToggleTheme {
            preferred: Theme::Light,
        })
        .unwrap();

        assert_eq!(view.theme(), Some(Theme::Dark));
        assert_eq!(storage.get_item(THEME_KEY), Ok(Some("dark".to_owned())));
    }

    #[test]
    fn first_toggle_starts_from_browser_preference() {
        let (mut view, storage) = get_test_view();

        view.handle_action(UserAction::ToggleTheme {
            preferred: Theme::Dark,
        })
        .unwrap();

        assert_eq!(view.theme(), Some(Theme::Light));
        assert_eq!(storage.get_item(THEME_KEY), Ok(Some("light".to_owned())));
    }

    #[test]
    fn saved_theme_overrides_browser_preference() {
        let (mut view, storage) = get_test_view();
        storage.set_item(THEME_KEY, "dark").unwrap();
        let mut view_with_saved = ViewController::new(storage);

        let page = view_with_saved.render_page(Theme::Light).into_string();
        assert!(page.contains(r#"data-theme="dark""#));

        let page = view.render_page(Theme::Dark).into_string();
        assert!(page.contains(r#"data-theme="dark""#));
        let page = view.render_page(Theme::Light).into_string();
        assert!(page.contains(r#"data-theme="light""#));
    }
}
