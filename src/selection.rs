// src/selection.rs
//! The user's current choices, validated against the catalog when assigned.

use crate::catalog::{Field, OptionSet};
use crate::error::{Error, Result};

/// One unit, or several units requested together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Choice {
    Single(String),
    /// Non-empty, ordered, no repeats.
    Multiple(Vec<String>),
}

impl Choice {
    pub fn values(&self) -> &[String] {
        match self {
            Choice::Single(v) => std::slice::from_ref(v),
            Choice::Multiple(vs) => vs,
        }
    }

    fn multiple(values: Vec<String>) -> Self {
        let mut out: Vec<String> = Vec::with_capacity(values.len());
        for v in values {
            if !out.contains(&v) {
                out.push(v);
            }
        }
        Choice::Multiple(out)
    }
}

/// Ways of naming options: by value, by position, or a list of either.
pub trait Pick {
    fn resolve(self, field: Field, options: Option<&OptionSet>) -> Result<Choice>;
}

fn by_key(field: Field, options: Option<&OptionSet>, key: &str) -> Result<String> {
    match options {
        Some(o) if o.contains(key) => Ok(s!(key)),
        _ => Err(Error::InvalidSelection { field, value: s!(key) }),
    }
}

fn by_index(field: Field, options: Option<&OptionSet>, index: usize) -> Result<String> {
    let len = options.map_or(0, OptionSet::len);
    options
        .and_then(|o| o.key_at(index))
        .map(str::to_string)
        .ok_or(Error::IndexOutOfRange { field, index, len })
}

fn non_empty(field: Field, values: Vec<String>) -> Result<Choice> {
    if values.is_empty() {
        return Err(Error::InvalidSelection { field, value: s!() });
    }
    Ok(Choice::multiple(values))
}

impl Pick for &str {
    fn resolve(self, field: Field, options: Option<&OptionSet>) -> Result<Choice> {
        by_key(field, options, self).map(Choice::Single)
    }
}

impl Pick for &String {
    fn resolve(self, field: Field, options: Option<&OptionSet>) -> Result<Choice> {
        self.as_str().resolve(field, options)
    }
}

impl Pick for String {
    fn resolve(self, field: Field, options: Option<&OptionSet>) -> Result<Choice> {
        self.as_str().resolve(field, options)
    }
}

impl Pick for usize {
    fn resolve(self, field: Field, options: Option<&OptionSet>) -> Result<Choice> {
        by_index(field, options, self).map(Choice::Single)
    }
}

impl Pick for &[&str] {
    fn resolve(self, field: Field, options: Option<&OptionSet>) -> Result<Choice> {
        let values = self.iter().map(|k| by_key(field, options, k)).collect::<Result<Vec<_>>>()?;
        non_empty(field, values)
    }
}

impl Pick for &[String] {
    fn resolve(self, field: Field, options: Option<&OptionSet>) -> Result<Choice> {
        let values = self.iter().map(|k| by_key(field, options, k)).collect::<Result<Vec<_>>>()?;
        non_empty(field, values)
    }
}

impl Pick for &[usize] {
    fn resolve(self, field: Field, options: Option<&OptionSet>) -> Result<Choice> {
        let values = self.iter().map(|&i| by_index(field, options, i)).collect::<Result<Vec<_>>>()?;
        non_empty(field, values)
    }
}

impl<const N: usize> Pick for [&str; N] {
    fn resolve(self, field: Field, options: Option<&OptionSet>) -> Result<Choice> {
        self.as_slice().resolve(field, options)
    }
}

impl<const N: usize> Pick for [usize; N] {
    fn resolve(self, field: Field, options: Option<&OptionSet>) -> Result<Choice> {
        self.as_slice().resolve(field, options)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    area: Option<String>,
    region: Option<Choice>,
    state: Option<Choice>,
    municipality: Option<Choice>,
    index: Option<String>,
    period: Option<String>,
    view: Option<String>,
}

impl Selection {
    pub fn get(&self, field: Field) -> Option<Choice> {
        match field {
            Field::Area => self.area.clone().map(Choice::Single),
            Field::Region => self.region.clone(),
            Field::State => self.state.clone(),
            Field::Municipality => self.municipality.clone(),
            Field::Index => self.index.clone().map(Choice::Single),
            Field::Period => self.period.clone().map(Choice::Single),
            Field::View => self.view.clone().map(Choice::Single),
        }
    }

    pub fn is_set(&self, field: Field) -> bool {
        match field {
            Field::Area => self.area.is_some(),
            Field::Region => self.region.is_some(),
            Field::State => self.state.is_some(),
            Field::Municipality => self.municipality.is_some(),
            Field::Index => self.index.is_some(),
            Field::Period => self.period.is_some(),
            Field::View => self.view.is_some(),
        }
    }

    pub fn area(&self) -> Option<&str> { self.area.as_deref() }
    pub fn region(&self) -> Option<&Choice> { self.region.as_ref() }
    pub fn state(&self) -> Option<&Choice> { self.state.as_ref() }
    pub fn municipality(&self) -> Option<&Choice> { self.municipality.as_ref() }
    pub fn index(&self) -> Option<&str> { self.index.as_deref() }
    pub fn period(&self) -> Option<&str> { self.period.as_deref() }
    pub fn view(&self) -> Option<&str> { self.view.as_deref() }

    /// Store an already validated choice. Returns whether the value changed.
    pub(crate) fn assign(&mut self, field: Field, choice: Choice) -> Result<bool> {
        let single = |c: Choice| match c {
            Choice::Single(v) => Ok(v),
            Choice::Multiple(mut vs) if vs.len() == 1 => Ok(vs.remove(0)),
            Choice::Multiple(_) => Err(Error::MultipleNotAllowed { field }),
        };
        let changed = match field {
            Field::Area => replace(&mut self.area, single(choice)?),
            Field::Index => replace(&mut self.index, single(choice)?),
            Field::Period => replace(&mut self.period, single(choice)?),
            Field::View => replace(&mut self.view, single(choice)?),
            Field::Region => replace(&mut self.region, choice),
            Field::State => replace(&mut self.state, choice),
            Field::Municipality => replace(&mut self.municipality, choice),
        };
        Ok(changed)
    }

    pub fn clear(&mut self, field: Field) {
        match field {
            Field::Area => self.area = None,
            Field::Region => self.region = None,
            Field::State => self.state = None,
            Field::Municipality => self.municipality = None,
            Field::Index => self.index = None,
            Field::Period => self.period = None,
            Field::View => self.view = None,
        }
    }
}

fn replace<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    let changed = slot.as_ref() != Some(&value);
    *slot = Some(value);
    changed
}
