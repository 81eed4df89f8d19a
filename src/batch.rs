// src/batch.rs
//! Batch traversal: every (unit × period × indicator × view) combination of one area
//! level, exported in sequence over a single session.

use std::fmt;
use std::str::FromStr;

use crate::cascade::StateLookup;
use crate::catalog::{Field, OptionSet};
use crate::config::consts::{AREA_MUNICIPALITY, AREA_NATIONAL, AREA_REGION, AREA_STATE};
use crate::core::net::Transport;
use crate::engine::RowPolicy;
use crate::error::{Error, Missing, Result};
use crate::file::BatchSink;
use crate::progress::Progress;
use crate::session::Session;

/// Administrative level a batch is run at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AreaLevel {
    National,
    Region,
    State,
    Municipality,
}

impl AreaLevel {
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            AREA_NATIONAL => Ok(AreaLevel::National),
            AREA_REGION => Ok(AreaLevel::Region),
            AREA_STATE => Ok(AreaLevel::State),
            AREA_MUNICIPALITY => Ok(AreaLevel::Municipality),
            other => Err(Error::UnsupportedArea(s!(other))),
        }
    }

    /// Value of the area `<select>` for this level.
    pub fn code(self) -> &'static str {
        match self {
            AreaLevel::National => AREA_NATIONAL,
            AreaLevel::Region => AREA_REGION,
            AreaLevel::State => AREA_STATE,
            AreaLevel::Municipality => AREA_MUNICIPALITY,
        }
    }

    /// Field whose options are the batch units, if any.
    pub fn unit_field(self) -> Option<Field> {
        match self {
            AreaLevel::National => None,
            AreaLevel::Region => Some(Field::Region),
            AreaLevel::State | AreaLevel::Municipality => Some(Field::State),
        }
    }
}

impl FromStr for AreaLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AreaLevel::from_code(s)
    }
}

impl fmt::Display for AreaLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What happens when one combination fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the batch and return the error.
    #[default]
    Abort,
    /// Log it, record it in the summary, go on with the next combination.
    Continue,
}

/// Which combinations to export. Empty filters mean "every option".
#[derive(Clone, Debug)]
pub struct BatchPlan {
    pub area: AreaLevel,
    /// Region or state values, depending on `area`.
    pub units: Vec<String>,
    /// Municipality level only; intersected with each state's municipalities.
    pub municipalities: Vec<String>,
    pub periods: Vec<String>,
    pub indices: Vec<String>,
    pub views: Vec<String>,
    pub on_error: FailurePolicy,
}

impl BatchPlan {
    pub fn new(area: AreaLevel) -> Self {
        Self {
            area,
            units: Vec::new(),
            municipalities: Vec::new(),
            periods: Vec::new(),
            indices: Vec::new(),
            views: Vec::new(),
            on_error: FailurePolicy::default(),
        }
    }
}

/// An option value with its human-readable label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labelled {
    pub value: String,
    pub label: String,
}

impl Labelled {
    fn new(value: &str, label: &str) -> Self {
        Self { value: s!(value), label: s!(label) }
    }
}

/// One export of a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combination {
    pub unit: Labelled,
    pub period: Labelled,
    pub index: Labelled,
    pub view: Labelled,
}

impl Combination {
    /// Unit, period, indicator and view labels, in that order.
    pub fn labels(&self) -> [&str; 4] {
        [&self.unit.label, &self.period.label, &self.index.label, &self.view.label]
    }

    pub fn describe(&self) -> String {
        self.labels().join(" | ")
    }
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub exported: usize,
    /// Municipality-level states left without any requested municipality.
    pub skipped: usize,
    /// `(combination, error)` for every failure under `FailurePolicy::Continue`.
    pub failed: Vec<(String, String)>,
}

/// Options of `field` restricted to `wanted` (all of them when `wanted` is empty).
fn filter_options(field: Field, options: &OptionSet, wanted: &[String]) -> Result<Vec<Labelled>> {
    if wanted.is_empty() {
        return Ok(options.iter().map(|(v, l)| Labelled::new(v, l)).collect());
    }
    wanted
        .iter()
        .map(|v| match options.label(v) {
            Some(l) => Ok(Labelled::new(v, l)),
            None => Err(Error::InvalidSelection { field, value: v.clone() }),
        })
        .collect()
}

fn one_shot<T: Transport>(session: &Session<T>, field: Field, wanted: &[String]) -> Result<Vec<Labelled>> {
    let options = session
        .options(field)
        .ok_or(Error::precondition("batch", Missing::Options(field)))?;
    filter_options(field, options, wanted)
}

/// Run the refresh sequence of `area`, leaving its unit catalog fresh.
fn refresh_units<T: Transport>(session: &mut Session<T>, area: AreaLevel) -> Result<Option<&OptionSet>> {
    Ok(match area {
        AreaLevel::National => None,
        AreaLevel::Region => Some(session.refresh_regions()?),
        AreaLevel::State => Some(session.refresh_states(StateLookup::ByState)?),
        AreaLevel::Municipality => Some(session.refresh_states(StateLookup::ByMunicipality)?),
    })
}

/// Batch units of `plan.area`; the national level has the area itself as its only unit.
fn discover_units<T: Transport>(session: &mut Session<T>, plan: &BatchPlan) -> Result<Vec<Labelled>> {
    let Some(field) = plan.area.unit_field() else {
        let code = plan.area.code();
        let label = session.label(Field::Area, code).unwrap_or(code);
        return Ok(vec![Labelled::new(code, label)]);
    };
    match refresh_units(session, plan.area)? {
        Some(options) => filter_options(field, options, &plan.units),
        None => Ok(Vec::new()),
    }
}

enum Outcome {
    Exported(String),
    Skipped,
}

/// Select, refresh and export one combination; the CSV text is returned, not written.
fn export_one<T: Transport>(
    session: &mut Session<T>,
    plan: &BatchPlan,
    combo: &Combination,
    policy: &RowPolicy,
) -> Result<Outcome> {
    session.select(Field::Period, combo.period.value.as_str())?;
    session.select(Field::Index, combo.index.value.as_str())?;
    session.select(Field::View, combo.view.value.as_str())?;

    refresh_units(session, plan.area)?;
    if let Some(field) = plan.area.unit_field() {
        session.select(field, combo.unit.value.as_str())?;
    }

    let mut buf: Vec<u8> = Vec::new();
    match plan.area {
        AreaLevel::National => session.export_for_area(Some(&mut buf), policy)?,
        AreaLevel::Region => session.export_for_region(Some(&mut buf), policy)?,
        AreaLevel::State => session.export_for_state(Some(&mut buf), policy)?,
        AreaLevel::Municipality => {
            let municipalities = session.refresh_municipalities()?;
            if plan.municipalities.is_empty() {
                session.clear(Field::Municipality);
            } else {
                let wanted: Vec<String> = plan
                    .municipalities
                    .iter()
                    .filter(|m| municipalities.contains(m))
                    .cloned()
                    .collect();
                if wanted.is_empty() {
                    return Ok(Outcome::Skipped);
                }
                session.select(Field::Municipality, wanted.as_slice())?;
            }
            session.export_for_municipality(Some(&mut buf), policy)?
        }
    };
    Ok(Outcome::Exported(String::from_utf8_lossy(&buf).into_owned()))
}

/// Export every combination of `plan` into `sink`.
///
/// Combinations are grouped by (period, indicator, view); within a group units are
/// visited in catalog order. A shared sink gets the data header only from the first
/// export of each group.
pub fn run<T: Transport>(
    session: &mut Session<T>,
    plan: &BatchPlan,
    sink: &mut dyn BatchSink,
    mut progress: Option<&mut dyn Progress>,
) -> Result<BatchSummary> {
    let result = run_inner(session, plan, sink, progress.as_mut().map(|p| &mut **p as &mut dyn Progress));
    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    result
}

fn run_inner<T: Transport>(
    session: &mut Session<T>,
    plan: &BatchPlan,
    sink: &mut dyn BatchSink,
    mut progress: Option<&mut dyn Progress>,
) -> Result<BatchSummary> {
    session.select(Field::Area, plan.area.code())?;

    let units = discover_units(session, plan)?;
    let periods = one_shot(session, Field::Period, &plan.periods)?;
    let indices = one_shot(session, Field::Index, &plan.indices)?;
    let views = one_shot(session, Field::View, &plan.views)?;

    let total = units.len() * periods.len() * indices.len() * views.len();
    logf!("batch: {} level, {total} combination(s)", plan.area);
    if let Some(p) = progress.as_deref_mut() {
        p.begin(total);
    }

    let mut summary = BatchSummary::default();
    for period in &periods {
        for index in &indices {
            for view in &views {
                sink.begin_group()?;
                let mut header_pending = true;

                for unit in &units {
                    let combo = Combination {
                        unit: unit.clone(),
                        period: period.clone(),
                        index: index.clone(),
                        view: view.clone(),
                    };
                    let policy = if !sink.shared() {
                        RowPolicy::WithHeader
                    } else if header_pending {
                        RowPolicy::from([true, true, false])
                    } else {
                        RowPolicy::DataOnly
                    };

                    let outcome = export_one(session, plan, &combo, &policy).and_then(|o| {
                        if let Outcome::Exported(text) = &o {
                            sink.write(&combo, text)?;
                        }
                        Ok(o)
                    });

                    match outcome {
                        Ok(Outcome::Exported(_)) => {
                            header_pending = false;
                            summary.exported += 1;
                            logd!("batch: exported {}", combo.describe());
                            if let Some(p) = progress.as_deref_mut() {
                                p.item_done(&combo);
                            }
                        }
                        Ok(Outcome::Skipped) => {
                            summary.skipped += 1;
                            logd!("batch: no requested municipality in {}", combo.unit.label);
                            if let Some(p) = progress.as_deref_mut() {
                                p.log(&format!("skipped {}", combo.describe()));
                            }
                        }
                        Err(e) if plan.on_error == FailurePolicy::Continue => {
                            logw!("batch: {} failed: {e}", combo.describe());
                            if let Some(p) = progress.as_deref_mut() {
                                p.item_failed(&combo, &e.to_string());
                            }
                            summary.failed.push((combo.describe(), e.to_string()));
                        }
                        Err(e) => {
                            loge!("batch: {} failed: {e}", combo.describe());
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    sink.finish()?;
    logf!(
        "batch: {} exported, {} skipped, {} failed",
        summary.exported,
        summary.skipped,
        summary.failed.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> OptionSet {
        OptionSet::from_pairs([("1", "One"), ("2", "Two")].map(|(v, l)| (s!(v), s!(l))))
    }

    #[test]
    fn area_codes() {
        for level in [AreaLevel::National, AreaLevel::Region, AreaLevel::State, AreaLevel::Municipality] {
            assert_eq!(AreaLevel::from_code(level.code()).unwrap(), level);
        }
        assert!(matches!(AreaLevel::from_code("mundo"), Err(Error::UnsupportedArea(_))));
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let all = filter_options(Field::Period, &opts(), &[]).unwrap();
        assert_eq!(all, vec![Labelled::new("1", "One"), Labelled::new("2", "Two")]);
    }

    #[test]
    fn unknown_filter_value_is_rejected() {
        let err = filter_options(Field::Period, &opts(), &[s!("9")]).unwrap_err();
        assert!(matches!(err, Error::InvalidSelection { field: Field::Period, .. }));
    }

    #[test]
    fn combination_labels_in_order() {
        let c = Combination {
            unit: Labelled::new("SP", "São Paulo"),
            period: Labelled::new("20231", "2023 Q1"),
            index: Labelled::new("1", "Pré-Natal"),
            view: Labelled::new("00", "Todas"),
        };
        assert_eq!(c.labels(), ["São Paulo", "2023 Q1", "Pré-Natal", "Todas"]);
        assert_eq!(c.describe(), "São Paulo | 2023 Q1 | Pré-Natal | Todas");
    }
}
