// src/engine/types.rs
use scraper::Html;

use crate::config::consts::ENVELOPE_DELIM;
use crate::core::html::{Fragment, is_partial_response, read_partial};
use crate::core::net::RawResponse;
use crate::error::{Error, Result};
use crate::selection::Choice;
use crate::token::{token_from_page, token_from_partial};

/* ---------------- Outgoing parameters ---------------- */

/// Ordered form parameters. Keys may repeat (multi-valued selections).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormParams(Vec<(String, String)>);

impl FormParams {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// One entry per value; `Multiple` repeats the key.
    pub fn push_choice(&mut self, key: &str, choice: &Choice) {
        for v in choice.values() {
            self.push(key, v.as_str());
        }
    }

    /// `self` as defaults, `extra` wins on every key it mentions.
    pub fn merged(mut self, extra: FormParams) -> FormParams {
        self.0.retain(|(k, _)| !extra.0.iter().any(|(ek, _)| ek == k));
        self.0.extend(extra.0);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

/* ---------------- Row policy ---------------- */

/// Which lines of a CSV envelope reach the destination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// The data block without its header line.
    #[default]
    DataOnly,
    /// The data block, header line included.
    WithHeader,
    /// Keep-mask over (preamble, data, footer); kept parts are joined with `\n` untouched.
    Parts(Vec<bool>),
}

impl From<bool> for RowPolicy {
    fn from(strip: bool) -> Self {
        if strip { RowPolicy::DataOnly } else { RowPolicy::WithHeader }
    }
}

impl From<Vec<bool>> for RowPolicy {
    fn from(mask: Vec<bool>) -> Self {
        RowPolicy::Parts(mask)
    }
}

impl<const N: usize> From<[bool; N]> for RowPolicy {
    fn from(mask: [bool; N]) -> Self {
        RowPolicy::Parts(mask.to_vec())
    }
}

/* ---------------- CSV envelope ---------------- */

/// Export body: preamble, data block and footer separated by two blank lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvEnvelope {
    pub preamble: String,
    /// First line is the column header.
    pub data: String,
    pub footer: String,
}

impl CsvEnvelope {
    pub fn parse(body: &str) -> Result<Self> {
        let body = body.replace("\r\n", "\n");
        let parts: Vec<&str> = body.split(ENVELOPE_DELIM).collect();
        match parts.as_slice() {
            [preamble, data, footer] => Ok(Self {
                preamble: s!(*preamble),
                data: s!(*data),
                footer: s!(*footer),
            }),
            _ => Err(Error::EnvelopeFormat { found: parts.len() - 1 }),
        }
    }

    pub fn parts(&self) -> [&str; 3] {
        [&self.preamble, &self.data, &self.footer]
    }

    /// Data rows only.
    pub fn rows(&self) -> &str {
        self.data.split_once('\n').map_or("", |(_, rows)| rows)
    }

    pub fn render(&self, policy: &RowPolicy) -> String {
        match policy {
            RowPolicy::DataOnly => s!(self.rows()),
            RowPolicy::WithHeader => self.data.clone(),
            RowPolicy::Parts(mask) => self
                .parts()
                .iter()
                .zip(mask)
                .filter(|(_, keep)| **keep)
                .map(|(part, _)| *part)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/* ---------------- Responses ---------------- */

/// One exchange's result, classified once by declared content type.
#[derive(Clone, Debug)]
pub enum ReportResponse {
    /// Full page carrying the token in a hidden input.
    Page { token: String, body: String },
    /// Partial-update envelope carrying re-rendered fragments and the token.
    Partial { token: String, fragments: Vec<Fragment>, body: String },
    Csv(CsvEnvelope),
    /// Anything else, passed through.
    Other { content_type: String, body: String },
}

impl ReportResponse {
    pub fn from_raw(raw: RawResponse) -> Result<Self> {
        let essence = raw
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "text/xml" | "application/xml" | "text/html" | "application/xhtml+xml" => {
                if is_partial_response(&raw.body) {
                    let fragments = read_partial(&raw.body)?;
                    let token = token_from_partial(&fragments)?;
                    Ok(ReportResponse::Partial { token, fragments, body: raw.body })
                } else {
                    let token = token_from_page(&Html::parse_document(&raw.body))?;
                    Ok(ReportResponse::Page { token, body: raw.body })
                }
            }
            "text/csv" => Ok(ReportResponse::Csv(CsvEnvelope::parse(&raw.body)?)),
            _ => Ok(ReportResponse::Other { content_type: raw.content_type, body: raw.body }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReportResponse::Page { .. } => "page",
            ReportResponse::Partial { .. } => "partial",
            ReportResponse::Csv(_) => "csv",
            ReportResponse::Other { .. } => "other",
        }
    }

    /// Token carried by markup responses.
    pub fn token(&self) -> Option<&str> {
        match self {
            ReportResponse::Page { token, .. } | ReportResponse::Partial { token, .. } => Some(token),
            _ => None,
        }
    }

    /// Markup of a named fragment of a partial response.
    pub fn fragment(&self, id: &str) -> Option<&str> {
        match self {
            ReportResponse::Partial { fragments, .. } => {
                fragments.iter().find(|f| f.id == id).map(|f| f.markup.as_str())
            }
            _ => None,
        }
    }

    /// Text written to a destination.
    pub fn render(&self, policy: &RowPolicy) -> String {
        match self {
            ReportResponse::Csv(env) => env.render(policy),
            ReportResponse::Page { body, .. }
            | ReportResponse::Partial { body, .. }
            | ReportResponse::Other { body, .. } => body.clone(),
        }
    }
}
