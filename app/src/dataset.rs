//! The country energy records and the parameters used to query them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

/// One country's figures for one year. Missing figures are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
  pub name: String,
  pub year: i32,
  #[serde(default)]
  pub population: Option<f64>,
  #[serde(default)]
  pub gdp: Option<f64>,
  #[serde(default)]
  pub biofuel_cons_per_capita: Option<f64>,
  #[serde(default)]
  pub coal_cons_per_capita: Option<f64>,
  #[serde(default)]
  pub energy_per_capita: Option<f64>,
  #[serde(default)]
  pub fossil_energy_per_capita: Option<f64>,
  #[serde(default)]
  pub gas_energy_per_capita: Option<f64>,
  #[serde(default)]
  pub hydro_energy_per_capita: Option<f64>,
  #[serde(default)]
  pub low_carbon_energy_per_capita: Option<f64>,
  #[serde(default)]
  pub nuclear_energy_per_capita: Option<f64>,
  #[serde(default)]
  pub oil_energy_per_capita: Option<f64>,
  #[serde(default)]
  pub other_renewables_energy_per_capita: Option<f64>,
  #[serde(default)]
  pub renewables_energy_per_capita: Option<f64>,
  #[serde(default)]
  pub solar_energy_per_capita: Option<f64>,
  #[serde(default)]
  pub wind_energy_per_capita: Option<f64>,
}

impl CountryRecord {
  /// A record with every figure missing.
  pub fn empty(name: impl Into<String>, year: i32) -> Self {
    Self {
      name: name.into(),
      year,
      population: None,
      gdp: None,
      biofuel_cons_per_capita: None,
      coal_cons_per_capita: None,
      energy_per_capita: None,
      fossil_energy_per_capita: None,
      gas_energy_per_capita: None,
      hydro_energy_per_capita: None,
      low_carbon_energy_per_capita: None,
      nuclear_energy_per_capita: None,
      oil_energy_per_capita: None,
      other_renewables_energy_per_capita: None,
      renewables_energy_per_capita: None,
      solar_energy_per_capita: None,
      wind_energy_per_capita: None,
    }
  }

  pub fn value(&self, field: EnergyField) -> Option<f64> {
    match field {
      EnergyField::Population => self.population,
      EnergyField::Gdp => self.gdp,
      EnergyField::BiofuelConsPerCapita => self.biofuel_cons_per_capita,
      EnergyField::CoalConsPerCapita => self.coal_cons_per_capita,
      EnergyField::EnergyPerCapita => self.energy_per_capita,
      EnergyField::FossilEnergyPerCapita => self.fossil_energy_per_capita,
      EnergyField::GasEnergyPerCapita => self.gas_energy_per_capita,
      EnergyField::HydroEnergyPerCapita => self.hydro_energy_per_capita,
      EnergyField::LowCarbonEnergyPerCapita => self.low_carbon_energy_per_capita,
      EnergyField::NuclearEnergyPerCapita => self.nuclear_energy_per_capita,
      EnergyField::OilEnergyPerCapita => self.oil_energy_per_capita,
      EnergyField::OtherRenewablesEnergyPerCapita => self.other_renewables_energy_per_capita,
      EnergyField::RenewablesEnergyPerCapita => self.renewables_energy_per_capita,
      EnergyField::SolarEnergyPerCapita => self.solar_energy_per_capita,
      EnergyField::WindEnergyPerCapita => self.wind_energy_per_capita,
    }
  }
}

/// The columns that may be queried by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyField {
  Population,
  Gdp,
  BiofuelConsPerCapita,
  CoalConsPerCapita,
  EnergyPerCapita,
  FossilEnergyPerCapita,
  GasEnergyPerCapita,
  HydroEnergyPerCapita,
  LowCarbonEnergyPerCapita,
  NuclearEnergyPerCapita,
  OilEnergyPerCapita,
  OtherRenewablesEnergyPerCapita,
  RenewablesEnergyPerCapita,
  SolarEnergyPerCapita,
  WindEnergyPerCapita,
}

impl EnergyField {
  pub const ALL: [EnergyField; 15] = [
    EnergyField::Population,
    EnergyField::Gdp,
    EnergyField::BiofuelConsPerCapita,
    EnergyField::CoalConsPerCapita,
    EnergyField::EnergyPerCapita,
    EnergyField::FossilEnergyPerCapita,
    EnergyField::GasEnergyPerCapita,
    EnergyField::HydroEnergyPerCapita,
    EnergyField::LowCarbonEnergyPerCapita,
    EnergyField::NuclearEnergyPerCapita,
    EnergyField::OilEnergyPerCapita,
    EnergyField::OtherRenewablesEnergyPerCapita,
    EnergyField::RenewablesEnergyPerCapita,
    EnergyField::SolarEnergyPerCapita,
    EnergyField::WindEnergyPerCapita,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      EnergyField::Population => "population",
      EnergyField::Gdp => "gdp",
      EnergyField::BiofuelConsPerCapita => "biofuel_cons_per_capita",
      EnergyField::CoalConsPerCapita => "coal_cons_per_capita",
      EnergyField::EnergyPerCapita => "energy_per_capita",
      EnergyField::FossilEnergyPerCapita => "fossil_energy_per_capita",
      EnergyField::GasEnergyPerCapita => "gas_energy_per_capita",
      EnergyField::HydroEnergyPerCapita => "hydro_energy_per_capita",
      EnergyField::LowCarbonEnergyPerCapita => "low_carbon_energy_per_capita",
      EnergyField::NuclearEnergyPerCapita => "nuclear_energy_per_capita",
      EnergyField::OilEnergyPerCapita => "oil_energy_per_capita",
      EnergyField::OtherRenewablesEnergyPerCapita => "other_renewables_energy_per_capita",
      EnergyField::RenewablesEnergyPerCapita => "renewables_energy_per_capita",
      EnergyField::SolarEnergyPerCapita => "solar_energy_per_capita",
      EnergyField::WindEnergyPerCapita => "wind_energy_per_capita",
    }
  }
}

impl fmt::Display for EnergyField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for EnergyField {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    EnergyField::ALL
      .iter()
      .copied()
      .find(|field| field.as_str() == s)
      .ok_or_else(|| Error::InvalidField(s.to_string()))
  }
}

/// Parses a year parameter: an integer that is not negative.
pub fn parse_year(raw: &str) -> Result<i32> {
  match raw.trim().parse::<i32>() {
    Ok(year) if year >= 0 => Ok(year),
    _ => Err(Error::InvalidYear(raw.to_string())),
  }
}

/// The full set of records, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
  records: Vec<CountryRecord>,
}

impl Dataset {
  pub fn new(records: Vec<CountryRecord>) -> Self {
    Self { records }
  }

  /// Reads a JSON array of records.
  pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
    serde_json::from_reader(reader)
      .map(Self::new)
      .map_err(Error::DatasetParse)
  }

  pub fn from_path(path: &Path) -> Result<Self> {
    let file = File::open(path).map_err(|source| Error::DatasetRead {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_reader(BufReader::new(file))
  }

  pub fn records(&self) -> &[CountryRecord] {
    &self.records
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}
