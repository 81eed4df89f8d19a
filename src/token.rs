// src/token.rs
use scraper::Html;

use crate::config::consts::VIEW_STATE;
use crate::core::html::{Fragment, find_by_id};
use crate::error::{Error, Missing, Result};

/// The server's opaque view state. Echoed unmodified on every postback and
/// replaced by whatever the latest markup response carried.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewToken {
    current: Option<String>,
}

impl ViewToken {
    pub fn get(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Needed by every interaction after the landing page.
    pub fn require(&self, operation: &'static str) -> Result<&str> {
        self.get().ok_or(Error::precondition(operation, Missing::ViewToken))
    }

    pub(crate) fn update(&mut self, token: String) {
        if self.current.as_deref() != Some(token.as_str()) {
            logd!("view token refreshed ({} chars)", token.len());
        }
        self.current = Some(token);
    }
}

/// Full page: the hidden input's `value`.
pub fn token_from_page(doc: &Html) -> Result<String> {
    find_by_id(doc, VIEW_STATE)
        .filter(|el| el.value().name() == "input")
        .and_then(|el| el.value().attr("value"))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::extraction(VIEW_STATE))
}

/// Partial update: the text of `<update id="javax.faces.ViewState">`.
pub fn token_from_partial(fragments: &[Fragment]) -> Result<String> {
    fragments
        .iter()
        .find(|f| f.id == VIEW_STATE)
        .map(|f| f.markup.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::extraction(VIEW_STATE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_token_is_value_attribute() {
        let doc = Html::parse_document(
            r#"<form id="j_idt50"><input type="hidden" name="javax.faces.ViewState"
                id="javax.faces.ViewState" value="8812:-3301" /></form>"#,
        );
        assert_eq!(token_from_page(&doc).unwrap(), "8812:-3301");
    }

    #[test]
    fn page_without_token_fails() {
        let doc = Html::parse_document("<html><body>Sessão expirada</body></html>");
        assert!(matches!(token_from_page(&doc), Err(Error::Extraction { .. })));
    }

    #[test]
    fn partial_token_is_update_text() {
        let frags = vec![
            Fragment { id: s!("regioes"), markup: s!("<select/>") },
            Fragment { id: s!(VIEW_STATE), markup: s!("\n  77:11 \n") },
        ];
        assert_eq!(token_from_partial(&frags).unwrap(), "77:11");
        assert!(token_from_partial(&frags[..1]).is_err());
    }

    #[test]
    fn require_before_connect_is_a_precondition_error() {
        let t = ViewToken::default();
        assert!(matches!(
            t.require("export"),
            Err(Error::Precondition { missing: Missing::ViewToken, .. })
        ));
    }
}
