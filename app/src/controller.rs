//! Validates raw query parameters and answers them from the repository.

use crate::dataset::{parse_year, CountryRecord, EnergyField};
use crate::error::{Error, Result};
use crate::repository::{EnergyRepository, FieldRow, FieldSummary, Series, YearRange};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Number of rows returned by [`QueryController::top_by_field`].
pub const TOP_LIMIT: usize = 10;

/// Widest year range [`QueryController::series`] accepts, in years.
pub const MAX_SERIES_YEARS: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
  pub lowest_year: Option<i32>,
  pub highest_year: Option<i32>,
}

pub struct QueryController {
  repository: Arc<dyn EnergyRepository>,
}

impl std::fmt::Debug for QueryController {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("QueryController").finish_non_exhaustive()
  }
}

impl QueryController {
  pub fn new(repository: Arc<dyn EnergyRepository>) -> Self {
    Self { repository }
  }

  pub fn all_countries(&self) -> Vec<String> {
    self.repository.countries()
  }

  /// The lowest and highest year present in the data.
  pub fn stats(&self) -> Stats {
    let range = self.repository.year_range();
    Stats {
      lowest_year: range.map(|r| r.lowest_year),
      highest_year: range.map(|r| r.highest_year),
    }
  }

  pub fn by_year(&self, year: &str) -> Result<Vec<CountryRecord>> {
    let year = parse_year(year)?;
    Ok(self.repository.by_year(year))
  }

  pub fn by_field(&self, year: &str, field: &str) -> Result<Vec<FieldRow>> {
    let (year, field) = parse_year_and_field(year, field)?;
    Ok(self.repository.field_by_year(year, field))
  }

  pub fn top_by_field(&self, year: &str, field: &str) -> Result<Vec<FieldRow>> {
    let (year, field) = parse_year_and_field(year, field)?;
    Ok(self.repository.top_by_field(year, field, TOP_LIMIT))
  }

  pub fn summary(&self, year: &str, field: &str) -> Result<FieldSummary> {
    let (year, field) = parse_year_and_field(year, field)?;
    Ok(self.repository.summary(year, field))
  }

  /// `countries` is a JSON array of names, e.g. `["Sweden","Norway"]`.
  /// The range may cover at most [`MAX_SERIES_YEARS`] years.
  pub fn series(
    &self,
    field: &str,
    lowest_year: &str,
    highest_year: &str,
    countries: &str,
  ) -> Result<Series> {
    let field: EnergyField = field.parse()?;
    let range = YearRange {
      lowest_year: parse_year(lowest_year)?,
      highest_year: parse_year(highest_year)?,
    };
    if range.lowest_year > range.highest_year {
      return Err(Error::InvalidRange(format!(
        "{} is after {}",
        range.lowest_year, range.highest_year
      )));
    }
    // Both bounds are non-negative, so the difference cannot overflow.
    if range.highest_year - range.lowest_year >= MAX_SERIES_YEARS {
      return Err(Error::InvalidRange(format!(
        "{} to {} spans more than {} years",
        range.lowest_year, range.highest_year, MAX_SERIES_YEARS
      )));
    }

    let countries: Vec<String> =
      serde_json::from_str(countries).map_err(|e| Error::InvalidCountries(e.to_string()))?;
    if countries.is_empty() {
      return Err(Error::InvalidCountries("no countries given".to_string()));
    }

    debug!(%field, ?range, countries = countries.len(), "building series");
    Ok(self.repository.series(field, range, &countries))
  }
}

fn parse_year_and_field(year: &str, field: &str) -> Result<(i32, EnergyField)> {
  Ok((parse_year(year)?, field.parse()?))
}
