//! Read-only queries over the dataset.

use crate::dataset::{CountryRecord, Dataset, EnergyField};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
  pub lowest_year: i32,
  pub highest_year: i32,
}

impl YearRange {
  pub fn years(&self) -> impl Iterator<Item = i32> {
    self.lowest_year..=self.highest_year
  }
}

/// One country's value of a single field in a given year.
///
/// Serializes with the field's own name as key:
/// `{"name": "Sweden", "year": 2000, "gdp": 2.5e11}`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
  pub name: String,
  pub year: i32,
  pub field: EnergyField,
  pub value: Option<f64>,
}

impl Serialize for FieldRow {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(3))?;
    map.serialize_entry("name", &self.name)?;
    map.serialize_entry("year", &self.year)?;
    map.serialize_entry(self.field.as_str(), &self.value)?;
    map.end()
  }
}

/// Average, minimum and maximum over the non-missing values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FieldSummary {
  pub average: Option<f64>,
  pub min: Option<f64>,
  pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySeries {
  pub name: String,
  /// One entry per label of the enclosing [`Series`].
  pub data: Vec<Option<f64>>,
}

/// A field's values over a range of years, for several countries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
  pub labels: Vec<i32>,
  pub data: Vec<CountrySeries>,
}

pub trait EnergyRepository: Send + Sync {
  /// Distinct country names, sorted.
  fn countries(&self) -> Vec<String>;

  fn year_range(&self) -> Option<YearRange>;

  fn by_year(&self, year: i32) -> Vec<CountryRecord>;

  fn field_by_year(&self, year: i32, field: EnergyField) -> Vec<FieldRow>;

  /// The `limit` largest values of `field` in `year`, descending. Missing
  /// values sort last.
  fn top_by_field(&self, year: i32, field: EnergyField, limit: usize) -> Vec<FieldRow>;

  fn summary(&self, year: i32, field: EnergyField) -> FieldSummary;

  fn series(&self, field: EnergyField, range: YearRange, countries: &[String]) -> Series;
}

pub struct InMemoryRepository {
  dataset: Arc<Dataset>,
  // (country, year) -> position in the dataset
  index: HashMap<(String, i32), usize>,
}

impl InMemoryRepository {
  pub fn new(dataset: Arc<Dataset>) -> Self {
    let index = dataset
      .records()
      .iter()
      .enumerate()
      .map(|(position, record)| ((record.name.clone(), record.year), position))
      .collect();
    Self { dataset, index }
  }

  fn in_year(&self, year: i32) -> impl Iterator<Item = &CountryRecord> {
    self
      .dataset
      .records()
      .iter()
      .filter(move |record| record.year == year)
  }

  fn lookup(&self, name: &str, year: i32) -> Option<&CountryRecord> {
    self
      .index
      .get(&(name.to_string(), year))
      .map(|&position| &self.dataset.records()[position])
  }
}

fn row(record: &CountryRecord, field: EnergyField) -> FieldRow {
  FieldRow {
    name: record.name.clone(),
    year: record.year,
    field,
    value: record.value(field),
  }
}

// Descending, with missing values after every present one.
fn descending_missing_last(a: &Option<f64>, b: &Option<f64>) -> Ordering {
  match (a, b) {
    (Some(a), Some(b)) => b.total_cmp(a),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

impl EnergyRepository for InMemoryRepository {
  fn countries(&self) -> Vec<String> {
    self
      .dataset
      .records()
      .iter()
      .map(|record| record.name.clone())
      .collect::<BTreeSet<_>>()
      .into_iter()
      .collect()
  }

  fn year_range(&self) -> Option<YearRange> {
    let years = self.dataset.records().iter().map(|record| record.year);
    let lowest_year = years.clone().min()?;
    let highest_year = years.max()?;
    Some(YearRange {
      lowest_year,
      highest_year,
    })
  }

  fn by_year(&self, year: i32) -> Vec<CountryRecord> {
    self.in_year(year).cloned().collect()
  }

  fn field_by_year(&self, year: i32, field: EnergyField) -> Vec<FieldRow> {
    self.in_year(year).map(|record| row(record, field)).collect()
  }

  fn top_by_field(&self, year: i32, field: EnergyField, limit: usize) -> Vec<FieldRow> {
    let mut rows = self.field_by_year(year, field);
    rows.sort_by(|a, b| descending_missing_last(&a.value, &b.value));
    rows.truncate(limit);
    rows
  }

  fn summary(&self, year: i32, field: EnergyField) -> FieldSummary {
    let values: Vec<f64> = self
      .in_year(year)
      .filter_map(|record| record.value(field))
      .collect();

    if values.is_empty() {
      return FieldSummary::default();
    }

    let sum: f64 = values.iter().sum();
    FieldSummary {
      average: Some(sum / values.len() as f64),
      min: values.iter().copied().reduce(f64::min),
      max: values.iter().copied().reduce(f64::max),
    }
  }

  fn series(&self, field: EnergyField, range: YearRange, countries: &[String]) -> Series {
    let labels: Vec<i32> = range.years().collect();
    let data = countries
      .iter()
      .map(|name| CountrySeries {
        name: name.clone(),
        data: labels
          .iter()
          .map(|&year| self.lookup(name, year).and_then(|record| record.value(field)))
          .collect(),
      })
      .collect();

    Series { labels, data }
  }
}
