use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{builtin, DeliveryMethod, LaneError, ShippingError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u8);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reserved zone for shipments that never leave the warehouse city.
pub const SAME_CITY_ZONE: ZoneId = ZoneId(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TariffClassId(pub u8);

impl fmt::Display for TariffClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffRate {
    pub base: Decimal,
    pub per_kg: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatrixEntry {
    Flat(TariffClassId),
    /// `special` applies when either lane endpoint belongs to the named city set.
    Conditional { special: TariffClassId, otherwise: TariffClassId, cities: String },
}

impl MatrixEntry {
    fn classes(&self) -> [TariffClassId; 2] {
        match self {
            Self::Flat(class) => [*class, *class],
            Self::Conditional { special, otherwise, .. } => [*special, *otherwise],
        }
    }
}

#[derive(Debug, Error)]
pub enum TariffBookError {
    #[error("could not read tariff book `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse tariff book: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("city `{city}` is assigned to both zone {first} and zone {second}")]
    ConflictingCityZone { city: String, first: ZoneId, second: ZoneId },
    #[error("matrix row {origin}->{destination} must set either `class` or `special`+`otherwise`+`cities`")]
    InvalidMatrixRow { origin: ZoneId, destination: ZoneId },
    #[error("matrix row {origin}->{destination} is declared twice")]
    DuplicateMatrixRow { origin: ZoneId, destination: ZoneId },
    #[error("matrix row {origin}->{destination} references undeclared city set `{set}`")]
    UnknownSpecialCitySet { origin: ZoneId, destination: ZoneId, set: String },
    #[error("tariff class {class} is referenced by the matrix but has no rates")]
    UnknownTariffClass { class: TariffClassId },
    #[error("tariff class {class} is referenced by the matrix but has no {method} rate")]
    MissingMethodRate { class: TariffClassId, method: DeliveryMethod },
    #[error("tariff class {class} declares the {method} rate twice")]
    DuplicateRate { class: TariffClassId, method: DeliveryMethod },
    #[error("tariff class {class} has a negative {method} rate")]
    NegativeRate { class: TariffClassId, method: DeliveryMethod },
}

/// Zone table, special-city sets, zone-pair matrix and per-class rates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TariffBook {
    zones: HashMap<String, ZoneId>,
    special_cities: HashMap<String, HashSet<String>>,
    matrix: HashMap<(ZoneId, ZoneId), MatrixEntry>,
    rates: HashMap<(TariffClassId, DeliveryMethod), TariffRate>,
}

pub fn normalize_city(name: &str) -> String {
    name.trim().to_lowercase()
}

impl TariffBook {
    pub fn builtin() -> Self {
        builtin::book()
    }

    pub fn load(path: &Path) -> Result<Self, TariffBookError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| TariffBookError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, TariffBookError> {
        let document: TariffBookDocument = toml::from_str(raw)?;
        let mut book = Self::default();

        for (city, zone) in document.zones {
            book.insert_zone(&city, ZoneId(zone))?;
        }
        for (set, cities) in document.special_cities {
            book.insert_special_cities(&set, cities.iter().map(String::as_str));
        }
        for row in document.matrix {
            let (origin, destination) = (ZoneId(row.from), ZoneId(row.to));
            let entry = row.into_entry()?;
            if book.matrix.insert((origin, destination), entry).is_some() {
                return Err(TariffBookError::DuplicateMatrixRow { origin, destination });
            }
        }
        for row in document.rates {
            let class = TariffClassId(row.class);
            let rate = TariffRate { base: row.base, per_kg: row.per_kg };
            if book.rates.insert((class, row.method), rate).is_some() {
                return Err(TariffBookError::DuplicateRate { class, method: row.method });
            }
        }

        book.validate()?;
        Ok(book)
    }

    pub fn validate(&self) -> Result<(), TariffBookError> {
        for (&(origin, destination), entry) in &self.matrix {
            if let MatrixEntry::Conditional { cities, .. } = entry {
                if !self.special_cities.contains_key(cities) {
                    return Err(TariffBookError::UnknownSpecialCitySet {
                        origin,
                        destination,
                        set: cities.clone(),
                    });
                }
            }

            for class in entry.classes() {
                let missing: Vec<DeliveryMethod> = DeliveryMethod::ALL
                    .iter()
                    .copied()
                    .filter(|method| !self.rates.contains_key(&(class, *method)))
                    .collect();
                match missing.as_slice() {
                    [] => {}
                    [method] => {
                        return Err(TariffBookError::MissingMethodRate { class, method: *method });
                    }
                    _ => return Err(TariffBookError::UnknownTariffClass { class }),
                }
            }
        }

        for (&(class, method), rate) in &self.rates {
            if rate.base.is_sign_negative() || rate.per_kg.is_sign_negative() {
                return Err(TariffBookError::NegativeRate { class, method });
            }
        }

        Ok(())
    }

    /// Exact lookup after trimming and lowercasing; no fuzzy matching.
    pub fn resolve_zone(&self, city: &str) -> Option<ZoneId> {
        self.zones.get(&normalize_city(city)).copied()
    }

    pub fn is_special_city(&self, set: &str, city: &str) -> bool {
        self.special_cities
            .get(set)
            .map(|cities| cities.contains(&normalize_city(city)))
            .unwrap_or(false)
    }

    pub fn matrix_entry(&self, origin: ZoneId, destination: ZoneId) -> Option<&MatrixEntry> {
        self.matrix.get(&(origin, destination))
    }

    pub fn resolve_tariff_class(
        &self,
        origin_zone: ZoneId,
        destination_zone: ZoneId,
        origin_city: &str,
        destination_city: &str,
    ) -> Result<TariffClassId, LaneError> {
        let entry = self.matrix_entry(origin_zone, destination_zone).ok_or(
            LaneError::NoZonePair { origin: origin_zone, destination: destination_zone },
        )?;

        match entry {
            MatrixEntry::Flat(class) => Ok(*class),
            MatrixEntry::Conditional { special, otherwise, cities } => {
                let is_special = self.is_special_city(cities, origin_city)
                    || self.is_special_city(cities, destination_city);
                Ok(if is_special { *special } else { *otherwise })
            }
        }
    }

    pub fn rate(&self, class: TariffClassId, method: DeliveryMethod) -> Option<TariffRate> {
        self.rates.get(&(class, method)).copied()
    }

    /// All declared rates ordered by class, then method.
    pub fn rates(&self) -> Vec<(TariffClassId, DeliveryMethod, TariffRate)> {
        let ordered: BTreeMap<_, _> = self.rates.iter().map(|(key, rate)| (*key, *rate)).collect();
        ordered.into_iter().map(|((class, method), rate)| (class, method, rate)).collect()
    }

    /// `base` up to the first kilogram, then `per_kg` for every kilogram above it,
    /// rounded half-up to whole cents.
    pub fn calculate_shipping_cost(
        &self,
        class: TariffClassId,
        method: DeliveryMethod,
        billable_kg: Decimal,
    ) -> Result<Decimal, ShippingError> {
        let rate = self.rate(class, method).ok_or(LaneError::NoTariff { class, method })?;

        let cost = if billable_kg <= Decimal::ONE {
            rate.base
        } else {
            (billable_kg - Decimal::ONE)
                .checked_mul(rate.per_kg)
                .and_then(|surcharge| rate.base.checked_add(surcharge))
                .ok_or(ShippingError::Arithmetic { class, billable_kg })?
        };

        Ok(cost.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub(crate) fn insert_zone(&mut self, city: &str, zone: ZoneId) -> Result<(), TariffBookError> {
        let city = normalize_city(city);
        match self.zones.get(&city) {
            Some(existing) if *existing != zone => Err(TariffBookError::ConflictingCityZone {
                city,
                first: *existing,
                second: zone,
            }),
            _ => {
                self.zones.insert(city, zone);
                Ok(())
            }
        }
    }

    pub(crate) fn insert_special_cities<'a>(
        &mut self,
        set: &str,
        cities: impl IntoIterator<Item = &'a str>,
    ) {
        self.special_cities
            .entry(set.to_string())
            .or_default()
            .extend(cities.into_iter().map(normalize_city));
    }

    pub(crate) fn insert_entry(&mut self, origin: ZoneId, destination: ZoneId, entry: MatrixEntry) {
        self.matrix.insert((origin, destination), entry);
    }

    pub(crate) fn insert_rate(
        &mut self,
        class: TariffClassId,
        method: DeliveryMethod,
        rate: TariffRate,
    ) {
        self.rates.insert((class, method), rate);
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TariffBookDocument {
    zones: BTreeMap<String, u8>,
    #[serde(default)]
    special_cities: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    matrix: Vec<MatrixRow>,
    #[serde(default)]
    rates: Vec<RateRow>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MatrixRow {
    from: u8,
    to: u8,
    class: Option<u8>,
    special: Option<u8>,
    otherwise: Option<u8>,
    cities: Option<String>,
}

impl MatrixRow {
    fn into_entry(self) -> Result<MatrixEntry, TariffBookError> {
        match (self.class, self.special, self.otherwise, self.cities) {
            (Some(class), None, None, None) => Ok(MatrixEntry::Flat(TariffClassId(class))),
            (None, Some(special), Some(otherwise), Some(cities)) => Ok(MatrixEntry::Conditional {
                special: TariffClassId(special),
                otherwise: TariffClassId(otherwise),
                cities,
            }),
            _ => Err(TariffBookError::InvalidMatrixRow {
                origin: ZoneId(self.from),
                destination: ZoneId(self.to),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RateRow {
    class: u8,
    method: DeliveryMethod,
    base: Decimal,
    per_kg: Decimal,
}
