// src/cascade.rs
//! Cascade navigator: the field dependency graph of the panel.
//!
//! ```text
//! area ─┬─ regiao ──────────────▶ region options
//!       ├─ uf     ──────────────▶ state options ("estados")
//!       └─ ibge   ──▶ state options ("estadoMunicipio") ─▶ state ─▶ municipality options
//! ```
//!
//! Every refresh is an ajax "change" postback whose re-rendered fragment (`regioes`)
//! holds the dependent `<select>`. Every export is a full postback with the export
//! trigger set.

use std::io::Write;
use std::str::FromStr;

use crate::catalog::{Field, OptionSet, discover_cascading};
use crate::config::consts::*;
use crate::core::net::Transport;
use crate::engine::{FormParams, ReportResponse, RowPolicy};
use crate::error::{Error, Result};
use crate::session::Session;

/// Which `<select>` of the re-rendered fragment holds the states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateLookup {
    /// State-level reports (`estados`).
    ByState,
    /// First step of municipality-level reports (`estadoMunicipio`).
    ByMunicipality,
}

impl StateLookup {
    pub fn select_id(self) -> &'static str {
        match self {
            StateLookup::ByState => STATES,
            StateLookup::ByMunicipality => STATE_FOR_MUNICIPALITY,
        }
    }
}

impl FromStr for StateLookup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            STATES => Ok(StateLookup::ByState),
            STATE_FOR_MUNICIPALITY => Ok(StateLookup::ByMunicipality),
            other => Err(Error::InvalidSelection { field: Field::State, value: s!(other) }),
        }
    }
}

/// Ajax metadata announcing that `source` changed and `regioes` should re-render.
fn change_event(source: &str) -> FormParams {
    params! {
        AJAX_SOURCE => source,
        AJAX_EVENT => "change",
        AJAX_EXECUTE => join!(source, " ", source),
        AJAX_RENDER => RENDER_LIST,
        AJAX_BEHAVIOR => "valueChange",
        AJAX_FLAG => "true",
    }
}

fn with_area(area: &str, rest: FormParams) -> FormParams {
    params! { AREA => area }.merged(rest)
}

impl<T: Transport> Session<T> {
    fn area_value(&self, operation: &'static str) -> Result<String> {
        let area = self.require(operation, Field::Area)?;
        Ok(area.values().first().cloned().unwrap_or_default())
    }

    /// Replace `field`'s catalog. A selection that is no longer offered is dropped.
    fn install(&mut self, field: Field, options: OptionSet) -> &OptionSet {
        let still_valid = self
            .selection
            .get(field)
            .is_none_or(|c| c.values().iter().all(|v| options.contains(v)));
        if !still_valid {
            logd!("{field}: selection no longer offered, cleared");
            self.selection.clear(field);
            self.invalidate_below(field);
        }
        logf!("{field}: {} option(s)", options.len());
        self.catalog.replace(field, options)
    }

    /// Reveal the regions of the selected area. Requires: area.
    pub fn refresh_regions(&mut self) -> Result<&OptionSet> {
        let area = self.area_value("refresh_regions")?;
        let res = self.exchange(with_area(&area, change_event(AREA)), None, &RowPolicy::default())?;
        let options = discover_cascading(&res, RENDER_TARGET, None)?;
        Ok(self.install(Field::Region, options))
    }

    /// Reveal the states of the selected area, read from the `lookup` select.
    /// Requires: area. Municipality options become stale.
    pub fn refresh_states(&mut self, lookup: StateLookup) -> Result<&OptionSet> {
        let area = self.area_value("refresh_states")?;
        let res = self.exchange(with_area(&area, change_event(AREA)), None, &RowPolicy::default())?;
        let options = discover_cascading(&res, RENDER_TARGET, Some(lookup.select_id()))?;

        self.catalog.invalidate(Field::Municipality);
        self.selection.clear(Field::Municipality);
        Ok(self.install(Field::State, options))
    }

    /// Reveal the municipalities of the selected state(s). Requires: area, state.
    pub fn refresh_municipalities(&mut self) -> Result<&OptionSet> {
        let area = self.area_value("refresh_municipalities")?;
        let state = self.require("refresh_municipalities", Field::State)?;

        let mut extra = FormParams::new();
        extra.push_choice(STATE_FOR_MUNICIPALITY, &state);
        let extra = with_area(&area, extra.merged(change_event(STATE_FOR_MUNICIPALITY)));

        let res = self.exchange(extra, None, &RowPolicy::default())?;
        let options = discover_cascading(&res, RENDER_TARGET, Some(MUNICIPALITIES))?;
        Ok(self.install(Field::Municipality, options))
    }

    fn export(
        &mut self,
        mut extra: FormParams,
        destination: Option<&mut dyn Write>,
        policy: &RowPolicy,
    ) -> Result<ReportResponse> {
        extra.push(EXPORT_TRIGGER, EXPORT_TRIGGER);
        let res = self.exchange(extra, destination, policy)?;
        logf!("export: {} response", res.kind());
        Ok(res)
    }

    /// Report for the whole area (national level). Requires: area.
    pub fn export_for_area(
        &mut self,
        destination: Option<&mut dyn Write>,
        policy: &RowPolicy,
    ) -> Result<ReportResponse> {
        let area = self.area_value("export_for_area")?;
        self.export(params! { AREA => area }, destination, policy)
    }

    /// Requires: area, region.
    pub fn export_for_region(
        &mut self,
        destination: Option<&mut dyn Write>,
        policy: &RowPolicy,
    ) -> Result<ReportResponse> {
        let area = self.area_value("export_for_region")?;
        let region = self.require("export_for_region", Field::Region)?;
        let mut extra = params! { AREA => area };
        extra.push_choice(REGION, &region);
        self.export(extra, destination, policy)
    }

    /// Requires: area. Without a selected state the server reports every state.
    pub fn export_for_state(
        &mut self,
        destination: Option<&mut dyn Write>,
        policy: &RowPolicy,
    ) -> Result<ReportResponse> {
        let area = self.area_value("export_for_state")?;
        let mut extra = params! { AREA => area };
        if let Some(state) = self.selection.state() {
            extra.push_choice(STATES, state);
        }
        self.export(extra, destination, policy)
    }

    /// Requires: area, state, and municipality options refreshed for that state.
    /// Without selected municipalities the server reports all of the state's.
    pub fn export_for_municipality(
        &mut self,
        destination: Option<&mut dyn Write>,
        policy: &RowPolicy,
    ) -> Result<ReportResponse> {
        let area = self.area_value("export_for_municipality")?;
        let state = self.require("export_for_municipality", Field::State)?;
        self.require_fresh("export_for_municipality", Field::Municipality)?;

        let mut extra = params! { AREA => area };
        extra.push_choice(STATE_FOR_MUNICIPALITY, &state);
        if let Some(m) = self.selection.municipality() {
            extra.push_choice(MUNICIPALITIES, m);
        }
        self.export(extra, destination, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_event_names_source_twice() {
        let p = change_event(AREA);
        assert_eq!(p.get(AJAX_SOURCE), Some("selectLinha"));
        assert_eq!(p.get(AJAX_EXECUTE), Some("selectLinha selectLinha"));
        assert_eq!(p.get(AJAX_RENDER), Some("regioes script"));
        assert_eq!(p.get(AJAX_FLAG), Some("true"));
    }

    #[test]
    fn lookup_from_select_id() {
        assert_eq!("estados".parse::<StateLookup>().unwrap(), StateLookup::ByState);
        assert_eq!("estadoMunicipio".parse::<StateLookup>().unwrap(), StateLookup::ByMunicipality);
        assert!("municipios".parse::<StateLookup>().is_err());
    }
}
