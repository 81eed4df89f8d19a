// src/engine/postback.rs
use std::io::Write;

use super::types::{FormParams, ReportResponse, RowPolicy};
use crate::config::consts::{FORM_ID, INDEX, PERIOD, VIEW, VIEW_STATE};
use crate::core::net::{Method, Transport};
use crate::error::Result;
use crate::session::Session;

impl<T: Transport> Session<T> {
    /// Parameters every postback carries: form marker, token, indicator, period, view.
    pub(crate) fn default_params(&self, token: &str) -> FormParams {
        params! {
            FORM_ID => FORM_ID,
            VIEW_STATE => token,
            INDEX => self.selection.index().unwrap_or_default(),
            PERIOD => self.selection.period().unwrap_or_default(),
            VIEW => self.selection.view().unwrap_or_default(),
        }
    }

    /// One postback.
    ///
    /// `extra` is merged over the defaults. Markup responses refresh the view token;
    /// CSV responses are unwrapped per `policy`; anything else passes through. When
    /// `destination` is given the rendered text plus a newline is appended to it.
    pub fn exchange(
        &mut self,
        extra: FormParams,
        destination: Option<&mut dyn Write>,
        policy: &RowPolicy,
    ) -> Result<ReportResponse> {
        let token = self.token.require("postback")?;
        let form = self.default_params(token).merged(extra);
        let headers = self.site.browser_headers(&self.cookies);

        let raw = self.transport.send(Method::Post, &self.site.url, &headers, form.as_slice())?;
        let body_len = raw.body.len();
        let response = ReportResponse::from_raw(raw)?;
        logd!("postback: {} response, {body_len} bytes", response.kind());

        if let Some(token) = response.token() {
            self.token.update(s!(token));
        }

        if let Some(out) = destination {
            let text = response.render(policy);
            out.write_all(text.as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(response)
    }
}
