// src/session.rs
use scraper::Html;

use crate::catalog::{Catalog, Field, OptionSet, discover_one_shot};
use crate::config::options::SiteConfig;
use crate::core::net::{HttpTransport, Method, Transport, cookie_pairs};
use crate::engine::RowPolicy;
use crate::error::{Error, Missing, Result};
use crate::selection::{Choice, Pick, Selection};
use crate::token::{ViewToken, token_from_page};

/// One logged-in conversation with the panel.
///
/// Owns everything that has to stay consistent between interactions: the cookies from
/// the landing page, the current view token, the option catalogs and the selection.
/// Interactions are strictly sequential; every one of them needs the token the
/// previous one produced.
pub struct Session<T: Transport> {
    pub(crate) transport: T,
    pub(crate) site: SiteConfig,
    pub(crate) cookies: Vec<String>,
    pub(crate) token: ViewToken,
    pub(crate) catalog: Catalog,
    pub(crate) selection: Selection,
}

impl Session<HttpTransport> {
    /// Connect over HTTPS with the given site settings.
    pub fn open(site: SiteConfig) -> Result<Self> {
        let transport = HttpTransport::new(&site)?;
        Self::connect(transport, site)
    }
}

impl<T: Transport> Session<T> {
    /// Landing `GET` (cookies, first token, one-shot catalogs), then the initial postback.
    pub fn connect(mut transport: T, site: SiteConfig) -> Result<Self> {
        let headers = site.browser_headers(&[]);
        let raw = transport.send(Method::Get, &site.url, &headers, &[])?;
        let cookies = cookie_pairs(&raw.set_cookies);

        let mut token = ViewToken::default();
        let mut catalog = Catalog::default();
        {
            let doc = Html::parse_document(&raw.body);
            token.update(token_from_page(&doc)?);
            for field in Field::ONE_SHOT {
                catalog.replace(field, discover_one_shot(&doc, field)?);
            }
        }
        logf!(
            "connected: {} cookie(s), {} areas, {} indicators, {} periods, {} views",
            cookies.len(),
            catalog.get(Field::Area).map_or(0, OptionSet::len),
            catalog.get(Field::Index).map_or(0, OptionSet::len),
            catalog.get(Field::Period).map_or(0, OptionSet::len),
            catalog.get(Field::View).map_or(0, OptionSet::len),
        );

        let mut session = Self {
            transport,
            site,
            cookies,
            token,
            catalog,
            selection: Selection::default(),
        };
        session.exchange(params!(), None, &RowPolicy::default())?;
        Ok(session)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn options(&self, field: Field) -> Option<&OptionSet> {
        self.catalog.get(field)
    }

    /// Label of `value` in `field`'s current catalog.
    pub fn label(&self, field: Field, value: &str) -> Option<&str> {
        self.catalog.get(field).and_then(|o| o.label(value))
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn token(&self) -> Option<&str> {
        self.token.get()
    }

    pub fn cookies(&self) -> &[String] {
        &self.cookies
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Assign `field`, checked against its current catalog. On error nothing changes.
    ///
    /// A new area makes region/state/municipality stale; a new state makes
    /// municipality stale. Stale catalogs have to be refreshed before use.
    pub fn select<P: Pick>(&mut self, field: Field, pick: P) -> Result<()> {
        let choice = pick.resolve(field, self.catalog.get(field))?;
        if self.selection.assign(field, choice)? {
            self.invalidate_below(field);
        }
        Ok(())
    }

    pub fn clear(&mut self, field: Field) {
        if self.selection.is_set(field) {
            self.selection.clear(field);
            self.invalidate_below(field);
        }
    }

    pub(crate) fn invalidate_below(&mut self, field: Field) {
        for &d in field.downstream() {
            self.catalog.invalidate(d);
            self.selection.clear(d);
        }
    }

    /// Current choice of `field`, or the precondition error naming `operation`.
    pub(crate) fn require(&self, operation: &'static str, field: Field) -> Result<Choice> {
        self.selection
            .get(field)
            .ok_or(Error::precondition(operation, Missing::Selection(field)))
    }

    pub(crate) fn require_fresh(&self, operation: &'static str, field: Field) -> Result<()> {
        if self.catalog.is_fresh(field) {
            Ok(())
        } else {
            Err(Error::precondition(operation, Missing::Options(field)))
        }
    }
}
