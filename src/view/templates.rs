//! Markup for the ledger page: totals, the transaction list and the form modal.

use maud::{Markup, html};
use serde_json::json;

use crate::{
    alert::Alert,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, ICON_BUTTON_STYLE, PAGE_CONTAINER_STYLE, base,
        dollar_input_styles, format_balance, format_currency,
    },
    theme::Theme,
    transaction::{Totals, Transaction, TransactionType},
    view::controller::{Modal, RowAction, TransactionForm},
};

/// The ID of the element that interaction responses replace.
pub const LEDGER_ID: &str = "ledger";

const EMPTY_LIST_MESSAGE: &str =
    "Oops! No transaction here, click the \"Add new\" button to create one.";

/// Everything needed to render the ledger region.
pub struct LedgerProps<'a> {
    pub transactions: &'a [Transaction],
    pub totals: Totals,
    pub modal: Option<&'a Modal>,
    pub alert: Option<&'a Alert>,
}

pub fn ledger_page(theme: Theme, ledger: &Markup) -> Markup {
    let next_theme = theme.toggled();

    let content = html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            header class="flex justify-between items-center w-full max-w-2xl mb-6"
            {
                h1 class="text-2xl font-bold" { "Pocket Ledger" }

                button
                    id="toggle-theme"
                    type="button"
                    hx-post=(endpoints::THEME)
                    hx-target-error="#alert-container"
                    title={ "Switch to " (next_theme) " theme" }
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    @if theme.is_dark() { "Light mode" } @else { "Dark mode" }
                }
            }

            (ledger)
        }
    };

    base("Ledger", theme, &[dollar_input_styles()], &content)
}

/// The region swapped by every interaction.
///
/// Descendants inherit the htmx target, so buttons and forms inside only need
/// to name their endpoint. A 404 still re-renders the ledger since it carries
/// the not found alert, other errors go to the alert container.
pub fn ledger_view(props: &LedgerProps<'_>) -> Markup {
    let target = format!("#{LEDGER_ID}");

    html! {
        div
            id=(LEDGER_ID)
            hx-target=(target)
            hx-target-404=(target)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full max-w-2xl space-y-6"
        {
            @if let Some(alert) = props.alert {
                (alert.clone().into_html())
            }

            (stats_view(props.totals))

            section class="space-y-4"
            {
                header class="flex justify-between items-end"
                {
                    h2 class="text-xl font-bold" { "Transactions" }

                    button
                        id="add-transaction"
                        type="button"
                        hx-get=(endpoints::NEW_TRANSACTION_VIEW)
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Add new"
                    }
                }

                (transaction_list_view(props.transactions))
            }

            @if let Some(modal) = props.modal {
                (modal_view(modal))
            }
        }
    }
}

fn stats_view(totals: Totals) -> Markup {
    let balance = totals.balance();
    let balance_style = if balance < 0.0 {
        "text-2xl font-semibold text-red-600 dark:text-red-400"
    } else {
        "text-2xl font-semibold"
    };

    html! {
        section class="grid grid-cols-1 sm:grid-cols-3 gap-4"
        {
            div class=(CARD_STYLE)
            {
                h3 class="text-sm text-gray-600 dark:text-gray-400" { "Income" }
                p id="total-income" class="text-2xl font-semibold text-green-600 dark:text-green-400"
                {
                    (format_currency(totals.income))
                }
            }

            div class=(CARD_STYLE)
            {
                h3 class="text-sm text-gray-600 dark:text-gray-400" { "Expenses" }
                p id="total-expense" class="text-2xl font-semibold text-red-600 dark:text-red-400"
                {
                    (format_currency(totals.expense))
                }
            }

            div class=(CARD_STYLE)
            {
                h3 class="text-sm text-gray-600 dark:text-gray-400" { "Balance" }
                p id="balance" class=(balance_style)
                {
                    (format_balance(balance))
                }
            }
        }
    }
}

fn transaction_list_view(transactions: &[Transaction]) -> Markup {
    html! {
        ul id="transaction-list" class="space-y-2"
        {
            @if transactions.is_empty() {
                span id="no-transactions" class="block text-center text-gray-500 dark:text-gray-400"
                {
                    (EMPTY_LIST_MESSAGE)
                }
            }

            @for transaction in transactions {
                (transaction_row(transaction))
            }
        }
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let (type_class, sign) = if transaction.is_income() {
        ("income", "+")
    } else {
        ("expense", "-")
    };

    html! {
        li
            class={ "transaction-item " (type_class) " flex justify-between items-center " (CARD_STYLE) }
        {
            div
            {
                p class="price font-semibold" { (sign) " " (format_currency(transaction.amount)) }
                p class="description text-sm text-gray-600 dark:text-gray-400" { (transaction.description) }
            }

            div class="flex gap-2"
            {
                (row_action_button(transaction, RowAction::Edit))
                (row_action_button(transaction, RowAction::Delete))
            }
        }
    }
}

fn row_action_button(transaction: &Transaction, action: RowAction) -> Markup {
    let hx_vals = json!({
        "transaction_id": transaction.id.as_str(),
        "transaction_action": action.as_str(),
    })
    .to_string();

    let (title, icon_path) = match action {
        RowAction::Edit => ("Edit", EDIT_ICON_PATH),
        RowAction::Delete => ("Delete", DELETE_ICON_PATH),
    };

    html! {
        button
            type="button"
            title=(title)
            data-transaction-id=(transaction.id)
            data-transaction-action=(action.as_str())
            hx-post=(endpoints::TRANSACTION_ACTION)
            hx-vals=(hx_vals)
            class=(ICON_BUTTON_STYLE)
        {
            svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" class="w-5 h-5" fill="currentColor"
            {
                path d=(icon_path) {}
            }
        }
    }
}

const EDIT_ICON_PATH: &str = "M14.06,9L15,9.94L5.92,19H5V18.08L14.06,9M17.66,3C17.41,3 17.15,3.1 \
    16.96,3.29L15.13,5.12L18.88,8.87L20.71,7.04C21.1,6.65 21.1,6 20.71,5.63L18.37,3.29C18.17,3.09 \
    17.92,3 17.66,3M14.06,6.19L3,17.25V21H6.75L17.81,9.94L14.06,6.19Z";

const DELETE_ICON_PATH: &str = "M9,3V4H4V6H5V19A2,2 0 0,0 7,21H17A2,2 0 0,0 19,19V6H20V4H15V3H9M7,\
    6H17V19H7V6M9,8V17H11V8H9M13,8V17H15V8H13Z";

fn modal_view(modal: &Modal) -> Markup {
    let (title, submit_label, form, error) = match modal {
        Modal::New { form, error } => ("New Transaction", "Add", form, error),
        Modal::Edit { form, error, .. } => ("Edit Transaction", "Save Changes", form, error),
    };

    let form_body = html! {
        (transaction_form_fields(form))

        @if let Some(error) = error {
            p class="text-red-600 dark:text-red-400" { (error) }
        }

        button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
    };

    html! {
        div
            id="modal-backdrop"
            hx-post=(endpoints::CLOSE_MODAL)
            hx-trigger="click target:#modal-backdrop"
            class="fixed inset-0 z-40 flex items-center justify-center bg-black/50"
        {
            dialog
                id="modal"
                open
                class="relative w-full max-w-md p-6 rounded-lg shadow bg-white dark:bg-gray-800 text-gray-900 dark:text-white"
            {
                header class="flex justify-between items-center mb-4"
                {
                    h2 id="modal-title" class="text-xl font-bold" { (title) }

                    button
                        id="close-modal"
                        type="button"
                        title="Close"
                        hx-post=(endpoints::CLOSE_MODAL)
                        class=(ICON_BUTTON_STYLE)
                    {
                        "×"
                    }
                }

                @match modal {
                    Modal::New { .. } => {
                        form id="modal-form" hx-post=(endpoints::TRANSACTIONS_API) class="space-y-4"
                        {
                            (form_body)
                        }
                    }
                    Modal::Edit { id, .. } => {
                        form
                            id="modal-form"
                            hx-put=(format_endpoint(endpoints::TRANSACTION, id.as_str()))
                            class="space-y-4"
                        {
                            (form_body)
                        }
                    }
                }
            }
        }
    }
}

pub fn transaction_form_fields(form: &TransactionForm) -> Markup {
    let is_expense = matches!(form.transaction_type, TransactionType::Expense);
    let description = (!form.description.is_empty()).then_some(form.description.as_str());
    let amount = (!form.amount.is_empty()).then_some(form.amount.as_str());

    html! {
        div
        {
            label
                for="input-description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="input-description"
                type="text"
                placeholder="Example: Budget"
                required
                autofocus
                value=[description]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="input-amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="input-amount"
                    type="number"
                    step="0.01"
                    min="0.01"
                    placeholder="0.01"
                    required
                    value=[amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="type"
                        id="input-expense"
                        type="radio"
                        value="expense"
                        checked[is_expense]
                        required
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="input-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="type"
                        id="input-income"
                        type="radio"
                        value="income"
                        checked[!is_expense]
                        required
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="input-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::{
        alert::Alert,
        endpoints,
        test_utils::{
            assert_form_error_message, assert_form_input, assert_form_input_with_value,
            assert_form_submit_button_with_text, assert_hx_endpoint, assert_valid_html,
            must_get_form,
        },
        theme::Theme,
        transaction::{Totals, Transaction, TransactionData, TransactionId, TransactionType},
        view::controller::{Modal, TransactionForm},
    };

    use super::{LedgerProps, ledger_page, ledger_view, transaction_form_fields};

    fn transaction(id: &str, description: &str, amount: f64, kind: TransactionType) -> Transaction {
        Transaction::from_data(
            TransactionId::new(id),
            TransactionData::new(description, amount, kind),
        )
    }

    fn render(props: &LedgerProps<'_>) -> Html {
        Html::parse_fragment(&ledger_view(props).into_string())
    }

    fn text_of(html: &Html, selector: &str) -> String {
        html.select(&Selector::parse(selector).unwrap())
            .next()
            .unwrap_or_else(|| panic!("no element matches {selector}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[test]
    fn empty_list_shows_message() {
        let html = render(&LedgerProps {
            transactions: &[],
            totals: Totals::default(),
            modal: None,
            alert: None,
        });

        assert_valid_html(&html);
        assert!(text_of(&html, "#no-transactions").starts_with("Oops!"));
        assert_eq!(text_of(&html, "#balance"), "$0.00");
    }

    #[test]
    fn rows_carry_id_and_action_metadata() {
        let transactions = [transaction("ab12", "Coffee", 4.5, TransactionType::Expense)];
        let html = render(&LedgerProps {
            transactions: &transactions,
            totals: Totals::from_transactions(&transactions),
            modal: None,
            alert: None,
        });

        let buttons = html
            .select(&Selector::parse("#transaction-list button").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(buttons.len(), 2);
        for (button, want_action) in buttons.iter().zip(["edit", "delete"]) {
            assert_eq!(button.value().attr("data-transaction-id"), Some("ab12"));
            assert_eq!(
                button.value().attr("data-transaction-action"),
                Some(want_action)
            );
            assert_eq!(
                button.value().attr("hx-post"),
                Some(endpoints::TRANSACTION_ACTION)
            );
        }
        assert_eq!(text_of(&html, ".transaction-item.expense .price"), "- $4.50");
        assert!(
            html.select(&Selector::parse("#no-transactions").unwrap())
                .next()
                .is_none()
        );
    }

    #[test]
    fn negative_balance_is_prefixed() {
        let transactions = [transaction("1", "Coffee", 4.5, TransactionType::Expense)];
        let html = render(&LedgerProps {
            transactions: &transactions,
            totals: Totals::from_transactions(&transactions),
            modal: None,
            alert: None,
        });

        assert_eq!(text_of(&html, "#total-income"), "$0.00");
        assert_eq!(text_of(&html, "#total-expense"), "$4.50");
        assert_eq!(text_of(&html, "#balance"), "- $4.50");
    }

    #[test]
    fn description_is_escaped() {
        let transactions = [transaction(
            "1",
            "<script>alert(1)</script>",
            1.0,
            TransactionType::Income,
        )];
        let markup = ledger_view(&LedgerProps {
            transactions: &transactions,
            totals: Totals::from_transactions(&transactions),
            modal: None,
            alert: None,
        })
        .into_string();

        assert!(!markup.contains("<script>alert(1)</script>"));
        assert!(markup.contains("&lt;script&gt;"));
    }

    #[test]
    fn new_modal_posts_to_transactions_api() {
        let modal = Modal::New {
            form: TransactionForm::default(),
            error: None,
        };
        let html = render(&LedgerProps {
            transactions: &[],
            totals: Totals::default(),
            modal: Some(&modal),
            alert: None,
        });

        assert_valid_html(&html);
        assert_eq!(text_of(&html, "#modal-title"), "New Transaction");
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "amount", "number");
        assert_form_submit_button_with_text(&form, "Add");
    }

    #[test]
    fn backdrop_click_closes_modal() {
        let modal = Modal::New {
            form: TransactionForm::default(),
            error: None,
        };
        let html = render(&LedgerProps {
            transactions: &[],
            totals: Totals::default(),
            modal: Some(&modal),
            alert: None,
        });

        let backdrop = html
            .select(&Selector::parse("#modal-backdrop").unwrap())
            .next()
            .expect("no modal backdrop");
        assert_eq!(backdrop.value().attr("hx-post"), Some(endpoints::CLOSE_MODAL));
        assert_eq!(
            backdrop.value().attr("hx-trigger"),
            Some("click target:#modal-backdrop")
        );
    }

    #[test]
    fn theme_button_errors_go_to_alert_container() {
        let ledger = ledger_view(&LedgerProps {
            transactions: &[],
            totals: Totals::default(),
            modal: None,
            alert: None,
        });
        let html = Html::parse_document(&ledger_page(Theme::Dark, &ledger).into_string());

        let button = html
            .select(&Selector::parse("#toggle-theme").unwrap())
            .next()
            .expect("no theme button");
        assert_eq!(button.value().attr("hx-post"), Some(endpoints::THEME));
        assert_eq!(button.value().attr("hx-target-error"), Some("#alert-container"));
        assert_eq!(button.text().collect::<String>().trim(), "Light mode");
        assert_eq!(html.select(&Selector::parse("#alert-container").unwrap()).count(), 1);
    }

    #[test]
    fn edit_modal_is_prefilled_and_puts_to_transaction() {
        let modal = Modal::Edit {
            id: TransactionId::new("ab12"),
            form: TransactionForm {
                description: "Coffee".to_owned(),
                amount: "4.5".to_owned(),
                transaction_type: TransactionType::Expense,
            },
            error: None,
        };
        let html = render(&LedgerProps {
            transactions: &[],
            totals: Totals::default(),
            modal: Some(&modal),
            alert: None,
        });

        assert_eq!(text_of(&html, "#modal-title"), "Edit Transaction");
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/transactions/ab12", "hx-put");
        assert_form_input_with_value(&form, "description", "text", "Coffee");
        assert_form_input_with_value(&form, "amount", "number", "4.5");
        assert_form_submit_button_with_text(&form, "Save Changes");
    }

    #[test]
    fn form_error_is_shown() {
        let modal = Modal::New {
            form: TransactionForm::default(),
            error: Some("Amount must be greater than zero".to_owned()),
        };
        let html = render(&LedgerProps {
            transactions: &[],
            totals: Totals::default(),
            modal: Some(&modal),
            alert: None,
        });

        let form = must_get_form(&html);
        assert_form_error_message(&form, "Amount must be greater than zero");
    }

    #[test]
    fn alert_is_rendered() {
        let alert = Alert::error("Could not find transaction", "");
        let html = render(&LedgerProps {
            transactions: &[],
            totals: Totals::default(),
            modal: None,
            alert: Some(&alert),
        });

        assert_eq!(text_of(&html, "[role=alert] p"), "Could not find transaction");
    }

    #[test]
    fn form_fields_check_selected_type() {
        let cases = [
            (TransactionType::Expense, "expense"),
            (TransactionType::Income, "income"),
        ];

        for (transaction_type, expected) in cases {
            let fields = transaction_form_fields(&TransactionForm {
                transaction_type,
                ..Default::default()
            });
            let html = Html::parse_document(&maud::html! { form { (fields) } }.into_string());

            let checked = html
                .select(&Selector::parse("input[type=radio][name=type]").unwrap())
                .find(|input| input.value().attr("checked").is_some())
                .and_then(|input| input.value().attr("value"));
            assert_eq!(checked, Some(expected));
        }
    }
}
