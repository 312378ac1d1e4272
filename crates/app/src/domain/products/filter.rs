//! Product lookup filters.
//!
//! A [`ProductFilter`] is a conjunction of [`FilterClause`]s that is always
//! scoped to active products. Repositories translate the clauses into their
//! own query language; [`ProductFilter::matches`] is the reference semantics
//! used by the in-memory store.

use jiff::{Timestamp, civil::Date, tz::TimeZone};

use crate::domain::products::{
    errors::ProductsServiceError,
    records::{ProductRecord, ProductUuid},
};

/// Inclusive `created_at` bounds. A missing side is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedRange {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

impl CreatedRange {
    /// Expand date-only strings to the first and last millisecond of their
    /// days in `tz`.
    ///
    /// Returns `Ok(None)` when neither bound is given.
    ///
    /// # Errors
    ///
    /// Returns an error when a date cannot be parsed or when `from` is later
    /// than `to`.
    pub fn from_dates(
        from_date: Option<&str>,
        to_date: Option<&str>,
        tz: &TimeZone,
    ) -> Result<Option<Self>, ProductsServiceError> {
        let from = from_date.map(|input| start_of_day(input, tz)).transpose()?;
        let to = to_date.map(|input| end_of_day(input, tz)).transpose()?;

        if from.is_none() && to.is_none() {
            return Ok(None);
        }

        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(ProductsServiceError::InvalidDateRange);
        }

        Ok(Some(Self { from, to }))
    }

    /// Whether `timestamp` falls inside the range.
    #[must_use]
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        self.from.is_none_or(|from| timestamp >= from) && self.to.is_none_or(|to| timestamp <= to)
    }
}

/// One predicate of a [`ProductFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause {
    /// `sku` equals the value.
    Sku(String),

    /// `sku` is one of the values.
    SkuIn(Vec<String>),

    /// `product_name` equals the value exactly.
    NameEquals(String),

    /// `product_name` contains the value, ignoring case.
    NameContains(String),

    /// `created_at` lies within the range.
    CreatedBetween(CreatedRange),

    /// The record is not the given product.
    NotUuid(ProductUuid),
}

impl FilterClause {
    fn matches(&self, record: &ProductRecord) -> bool {
        match self {
            Self::Sku(sku) => record.sku == *sku,
            Self::SkuIn(skus) => skus.contains(&record.sku),
            Self::NameEquals(name) => record.product_name == *name,
            Self::NameContains(needle) => record
                .product_name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Self::CreatedBetween(range) => range.contains(record.created_at),
            Self::NotUuid(uuid) => record.uuid != *uuid,
        }
    }
}

/// Conjunctive filter over active products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    clauses: Vec<FilterClause>,
}

impl ProductFilter {
    /// Filter matching every active product.
    #[must_use]
    pub fn active() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.clauses.push(FilterClause::Sku(sku.into()));
        self
    }

    /// Restrict to a set of skus. An empty set adds no restriction.
    #[must_use]
    pub fn with_skus(mut self, skus: Vec<String>) -> Self {
        if !skus.is_empty() {
            self.clauses.push(FilterClause::SkuIn(skus));
        }
        self
    }

    /// Exact name match when `exact`, case-insensitive substring otherwise.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>, exact: bool) -> Self {
        let name = name.into();

        self.clauses.push(if exact {
            FilterClause::NameEquals(name)
        } else {
            FilterClause::NameContains(name)
        });
        self
    }

    #[must_use]
    pub fn with_created_between(mut self, range: CreatedRange) -> Self {
        self.clauses.push(FilterClause::CreatedBetween(range));
        self
    }

    #[must_use]
    pub fn excluding(mut self, uuid: ProductUuid) -> Self {
        self.clauses.push(FilterClause::NotUuid(uuid));
        self
    }

    #[must_use]
    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    /// Whether `record` is active and satisfies every clause.
    #[must_use]
    pub fn matches(&self, record: &ProductRecord) -> bool {
        record.state.is_active() && self.clauses.iter().all(|clause| clause.matches(record))
    }
}

/// Decode a single-quoted sku array literal such as `['A1','A2']`.
///
/// # Errors
///
/// Returns [`ProductsServiceError::InvalidSkusFilter`] when the input is not
/// a JSON array of strings once quotes are swapped.
pub fn parse_skus(input: &str) -> Result<Vec<String>, ProductsServiceError> {
    serde_json::from_str(&input.replace('\'', "\"")).map_err(|source| {
        ProductsServiceError::InvalidSkusFilter {
            input: input.to_string(),
            source,
        }
    })
}

fn parse_date(input: &str) -> Result<Date, ProductsServiceError> {
    input
        .trim()
        .parse::<Date>()
        .map_err(|source| ProductsServiceError::InvalidDate {
            input: input.to_string(),
            source,
        })
}

fn start_of_day(input: &str, tz: &TimeZone) -> Result<Timestamp, ProductsServiceError> {
    parse_date(input)?
        .to_zoned(tz.clone())
        .map(|zoned| zoned.timestamp())
        .map_err(|source| ProductsServiceError::InvalidDate {
            input: input.to_string(),
            source,
        })
}

fn end_of_day(input: &str, tz: &TimeZone) -> Result<Timestamp, ProductsServiceError> {
    parse_date(input)?
        .at(23, 59, 59, 999_000_000)
        .to_zoned(tz.clone())
        .map(|zoned| zoned.timestamp())
        .map_err(|source| ProductsServiceError::InvalidDate {
            input: input.to_string(),
            source,
        })
}
