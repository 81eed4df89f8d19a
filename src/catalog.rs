// src/catalog.rs
//! Option catalogs: the `(value → label)` choices of every selection field.
//!
//! Area, indicator, period and team view come from the landing page once. Region,
//! state and municipality only exist after a cascading update and are replaced
//! wholesale by each refresh.

use std::fmt;

use scraper::Html;

use crate::config::consts::{AREA, INDEX, MUNICIPALITIES, PERIOD, REGION, STATES, VIEW};
use crate::core::html::{find_by_id, list_options};
use crate::engine::ReportResponse;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Area,
    Region,
    State,
    Municipality,
    Index,
    Period,
    View,
}

impl Field {
    /// Fields read from the landing page.
    pub const ONE_SHOT: [Field; 4] = [Field::Area, Field::Index, Field::Period, Field::View];

    /// Id of the `<select>` holding this field's options.
    pub fn select_id(self) -> &'static str {
        match self {
            Field::Area => AREA,
            Field::Region => REGION,
            Field::State => STATES,
            Field::Municipality => MUNICIPALITIES,
            Field::Index => INDEX,
            Field::Period => PERIOD,
            Field::View => VIEW,
        }
    }

    /// Region, state and municipality may carry several units at once.
    pub fn allows_multiple(self) -> bool {
        matches!(self, Field::Region | Field::State | Field::Municipality)
    }

    /// Catalogs that go stale when this field's selection changes.
    pub fn downstream(self) -> &'static [Field] {
        match self {
            Field::Area => &[Field::Region, Field::State, Field::Municipality],
            Field::State => &[Field::Municipality],
            _ => &[],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Area => "area",
            Field::Region => "region",
            Field::State => "state",
            Field::Municipality => "municipality",
            Field::Index => "indicator",
            Field::Period => "period",
            Field::View => "team view",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered `(value, label)` pairs with unique values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionSet {
    entries: Vec<(String, String)>,
}

impl OptionSet {
    /// Empty values are dropped; on a repeated value the first entry wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (value, label) in pairs {
            if value.is_empty() || entries.iter().any(|(v, _)| *v == value) {
                continue;
            }
            entries.push((value, label));
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.iter().any(|(v, _)| v == value)
    }

    pub fn label(&self, value: &str) -> Option<&str> {
        self.entries.iter().find(|(v, _)| v == value).map(|(_, l)| l.as_str())
    }

    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(v, _)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(v, _)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(v, l)| (v.as_str(), l.as_str()))
    }
}

/// Current option set per field. `None` means never discovered or stale.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    area: Option<OptionSet>,
    region: Option<OptionSet>,
    state: Option<OptionSet>,
    municipality: Option<OptionSet>,
    index: Option<OptionSet>,
    period: Option<OptionSet>,
    view: Option<OptionSet>,
}

impl Catalog {
    fn slot(&self, field: Field) -> &Option<OptionSet> {
        match field {
            Field::Area => &self.area,
            Field::Region => &self.region,
            Field::State => &self.state,
            Field::Municipality => &self.municipality,
            Field::Index => &self.index,
            Field::Period => &self.period,
            Field::View => &self.view,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<OptionSet> {
        match field {
            Field::Area => &mut self.area,
            Field::Region => &mut self.region,
            Field::State => &mut self.state,
            Field::Municipality => &mut self.municipality,
            Field::Index => &mut self.index,
            Field::Period => &mut self.period,
            Field::View => &mut self.view,
        }
    }

    pub fn get(&self, field: Field) -> Option<&OptionSet> {
        self.slot(field).as_ref()
    }

    pub fn is_fresh(&self, field: Field) -> bool {
        self.slot(field).is_some()
    }

    /// Full replacement; nothing is merged with the previous contents.
    pub fn replace(&mut self, field: Field, options: OptionSet) -> &OptionSet {
        logd!("catalog: {field} replaced ({} options)", options.len());
        self.slot_mut(field).insert(options)
    }

    pub fn invalidate(&mut self, field: Field) {
        if self.slot_mut(field).take().is_some() {
            logd!("catalog: {field} is stale");
        }
    }
}

/// Options of a `<select>` on a full page (landing page catalogs).
pub fn discover_one_shot(doc: &Html, field: Field) -> Result<OptionSet> {
    let id = field.select_id();
    let node = find_by_id(doc, id).ok_or_else(|| Error::extraction(id))?;
    Ok(OptionSet::from_pairs(list_options(node)))
}

/// Options revealed by a cascading update.
///
/// `target` names the `<update>` fragment the server re-rendered; `nested`, when given, is
/// the `<select>` inside it to read. Without `nested` every option of the fragment counts.
pub fn discover_cascading(
    response: &ReportResponse,
    target: &str,
    nested: Option<&str>,
) -> Result<OptionSet> {
    let fragment = response.fragment(target).ok_or_else(|| Error::extraction(target))?;
    let doc = Html::parse_fragment(fragment);
    let pairs = match nested {
        Some(id) => list_options(find_by_id(&doc, id).ok_or_else(|| Error::extraction(id))?),
        None => list_options(doc.root_element()),
    };
    Ok(OptionSet::from_pairs(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, &str)]) -> OptionSet {
        OptionSet::from_pairs(pairs.iter().map(|(v, l)| (s!(*v), s!(*l))))
    }

    #[test]
    fn option_set_drops_placeholders_and_duplicates() {
        let opts = set(&[("", "Selecione"), ("a", "A"), ("b", "B"), ("a", "A again")]);
        assert_eq!(opts.len(), 2);
        assert_eq!(opts.label("a"), Some("A"));
        assert_eq!(opts.key_at(1), Some("b"));
        assert_eq!(opts.key_at(2), None);
    }

    #[test]
    fn catalog_replace_and_invalidate() {
        let mut cat = Catalog::default();
        assert!(!cat.is_fresh(Field::State));
        cat.replace(Field::State, set(&[("35", "SP")]));
        assert!(cat.is_fresh(Field::State));
        cat.replace(Field::State, set(&[("33", "RJ")]));
        assert!(!cat.get(Field::State).unwrap().contains("35"));
        cat.invalidate(Field::State);
        assert!(cat.get(Field::State).is_none());
    }

    #[test]
    fn one_shot_discovery_is_idempotent() {
        let doc = Html::parse_document(
            r#"<select id="quadrimestre"><option value="">--</option>
               <option value="20221">2022 Q1</option><option value="20222">2022 Q2</option></select>"#,
        );
        let a = discover_one_shot(&doc, Field::Period).unwrap();
        let b = discover_one_shot(&doc, Field::Period).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.keys().collect::<Vec<_>>(), ["20221", "20222"]);
    }

    #[test]
    fn one_shot_missing_select_is_an_extraction_error() {
        let doc = Html::parse_document("<p>manutenção</p>");
        let err = discover_one_shot(&doc, Field::View).unwrap_err();
        assert!(matches!(err, Error::Extraction { ref element } if element == "visaoEquipe"));
    }

    #[test]
    fn downstream_fields() {
        assert_eq!(Field::Area.downstream(), &[Field::Region, Field::State, Field::Municipality]);
        assert_eq!(Field::State.downstream(), &[Field::Municipality]);
        assert!(Field::Period.downstream().is_empty());
    }
}
