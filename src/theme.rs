//! The light/dark theme preference.

use std::fmt::Display;

use axum::http::HeaderMap;

use crate::{
    Error,
    storage::{Storage, THEME_KEY},
};

/// The colour scheme of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parse a stored preference. Anything other than "dark" or "light" is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == Theme::Dark
    }

    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The client hint carrying the browser's `prefers-color-scheme`.
pub const PREFERS_COLOR_SCHEME_HEADER: &str = "sec-ch-prefers-color-scheme";

/// The theme the browser asks for through [PREFERS_COLOR_SCHEME_HEADER].
///
/// Browsers only send the hint after the server lists it in `Accept-CH`, so
/// a missing or unreadable hint gives [Theme::Light].
pub fn preferred_theme(headers: &HeaderMap) -> Theme {
    headers
        .get(PREFERS_COLOR_SCHEME_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Theme::parse(value.trim().trim_matches('"')))
        .unwrap_or_default()
}

/// Read the saved theme preference from `storage`.
///
/// `None` means the user has not picked a theme, or the saved value could not
/// be read.
pub fn load_theme(storage: &dyn Storage) -> Option<Theme> {
    match storage.get_item(THEME_KEY) {
        Ok(Some(value)) => {
            let theme = Theme::parse(&value);

            if theme.is_none() {
                tracing::warn!("Ignoring unknown theme preference {value:?}");
            }

            theme
        }
        Ok(None) => None,
        Err(error) => {
            tracing::error!("Could not read theme preference: {error}");
            None
        }
    }
}

/// Write the theme preference to `storage`.
///
/// # Errors
/// Returns an error if the preference cannot be written.
pub fn save_theme(storage: &dyn Storage, theme: Theme) -> Result<(), Error> {
    storage.set_item(THEME_KEY, theme.as_str())
}
