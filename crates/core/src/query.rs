//! Filter, include, and pagination parameters and their JSON:API encoding.
//!
//! The supported filter keys form a closed set: every key the remote API
//! recognizes has a [`Filter`] variant, and anything else is rejected with a
//! [`ValidationError`] before a request is built. Age ranges are translated
//! into birthdate bounds at build time; the reference date is supplied by
//! the caller so the arithmetic is deterministic under test.

use chrono::{Days, Months, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Largest page size the remote API accepts.
pub const MAX_PER_PAGE: u64 = 100;

/// Upper bound on ages accepted by age-range filters.
pub const MAX_AGE: u32 = 130;

/// Input rejected before any HTTP call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unrecognized filter key: {0}")]
    UnknownKey(String),

    #[error("filter value for {key} must not be empty")]
    EmptyValue { key: &'static str },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("age bounds must satisfy min <= max (got {min}..={max})")]
    AgeBoundsInverted { min: u32, max: u32 },

    #[error("age {0} is out of range (limit {MAX_AGE})")]
    AgeOutOfRange(u32),
}

/// One recognized filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Free-text search over names and email addresses.
    Search(String),
    Gender(String),
    Status(String),
    Membership(String),
    LastName(String),
    /// People attached to (or missing) a household.
    HasHousehold(bool),
    /// Age window, translated to inclusive birthdate bounds at build time.
    AgeRange { min: Option<u32>, max: Option<u32> },
    PassedBackgroundCheck(bool),
    /// Background-check status on the checks collection.
    CheckStatus(String),
    CompletedAfter(NaiveDate),
    CompletedBefore(NaiveDate),
    CheckType(String),
}

impl Filter {
    /// Construct a validated age-range filter. At least one bound is
    /// required; both are inclusive.
    pub fn age_range(min: Option<u32>, max: Option<u32>) -> Result<Self, ValidationError> {
        for bound in [min, max].into_iter().flatten() {
            if bound > MAX_AGE {
                return Err(ValidationError::AgeOutOfRange(bound));
            }
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(ValidationError::AgeBoundsInverted { min, max });
            }
        }
        if min.is_none() && max.is_none() {
            return Err(ValidationError::EmptyValue { key: "age" });
        }
        Ok(Self::AgeRange { min, max })
    }

    /// Map a raw `key=value` pair through the fixed table of recognized
    /// keys. Unknown keys are rejected here, before any query is built.
    pub fn parse(key: &str, value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "search" => Ok(Self::Search(value.to_string())),
            "gender" => Ok(Self::Gender(value.to_string())),
            "status" => Ok(Self::Status(value.to_string())),
            "membership" => Ok(Self::Membership(value.to_string())),
            "last_name" => Ok(Self::LastName(value.to_string())),
            "household" => value
                .parse()
                .map(Self::HasHousehold)
                .map_err(|_| invalid()),
            "min_age" => {
                let min = value.parse().map_err(|_| invalid())?;
                Self::age_range(Some(min), None)
            }
            "max_age" => {
                let max = value.parse().map_err(|_| invalid())?;
                Self::age_range(None, Some(max))
            }
            "passed_background_check" => value
                .parse()
                .map(Self::PassedBackgroundCheck)
                .map_err(|_| invalid()),
            "check_status" => Ok(Self::CheckStatus(value.to_string())),
            "completed_after" => parse_date(value).map(Self::CompletedAfter).ok_or_else(invalid),
            "completed_before" => parse_date(value).map(Self::CompletedBefore).ok_or_else(invalid),
            "check_type" => Ok(Self::CheckType(value.to_string())),
            other => Err(ValidationError::UnknownKey(other.to_string())),
        }
    }

    /// Append this filter's `filter[...]` pairs. Values are raw here;
    /// percent-encoding happens when pairs are assembled into the string.
    fn encode(
        &self,
        reference: NaiveDate,
        out: &mut Vec<(String, String)>,
    ) -> Result<(), ValidationError> {
        match self {
            Self::Search(v) => out.push(pair("search_name_or_email", nonempty("search", v)?)),
            Self::Gender(v) => out.push(pair("gender", nonempty("gender", v)?)),
            Self::Status(v) => out.push(pair("status", nonempty("status", v)?)),
            Self::Membership(v) => out.push(pair("membership", nonempty("membership", v)?)),
            Self::LastName(v) => out.push(pair("last_name", nonempty("last_name", v)?)),
            Self::HasHousehold(v) => out.push(pair("household", v.to_string())),
            Self::AgeRange { min, max } => {
                if let Some(min) = min {
                    out.push((
                        "filter[birthdate][lte]".to_string(),
                        born_on_or_before(reference, *min).to_string(),
                    ));
                }
                if let Some(max) = max {
                    out.push((
                        "filter[birthdate][gte]".to_string(),
                        born_on_or_after(reference, *max).to_string(),
                    ));
                }
            }
            Self::PassedBackgroundCheck(v) => {
                out.push(pair("passed_background_check", v.to_string()))
            }
            Self::CheckStatus(v) => out.push(pair("status", nonempty("check_status", v)?)),
            Self::CompletedAfter(d) => {
                out.push(("filter[completed_at][gte]".to_string(), d.to_string()))
            }
            Self::CompletedBefore(d) => {
                out.push(("filter[completed_at][lte]".to_string(), d.to_string()))
            }
            Self::CheckType(v) => out.push(pair("check_type", nonempty("check_type", v)?)),
        }
        Ok(())
    }
}

fn pair(key: &str, value: String) -> (String, String) {
    (format!("filter[{key}]"), value)
}

fn nonempty(key: &'static str, value: &str) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyValue { key })
    } else {
        Ok(value.to_string())
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Latest birthdate a person at least `min_age` years old can have.
/// A person turns `min_age` on their birthday, so the bound is inclusive.
fn born_on_or_before(reference: NaiveDate, min_age: u32) -> NaiveDate {
    reference - Months::new(12 * min_age)
}

/// Earliest birthdate a person at most `max_age` years old can have:
/// the day after the (max_age + 1)th birthday boundary.
fn born_on_or_after(reference: NaiveDate, max_age: u32) -> NaiveDate {
    reference - Months::new(12 * (max_age + 1)) + Days::new(1)
}

/// An ordered collection of filters. Insertion order is preserved in the
/// query string; duplicate keys are comma-joined per JSON:API convention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    filters: Vec<Filter>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn with(mut self, filter: Filter) -> Self {
        self.push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Encoded `key=value` pairs, grouped by key in first-occurrence order.
    /// Each value is percent-encoded on its own before comma-joining, so an
    /// embedded comma (`%2C`) never reads as a multi-value delimiter.
    fn encode(&self, reference: NaiveDate) -> Result<Vec<(String, String)>, ValidationError> {
        let mut raw = Vec::new();
        for filter in &self.filters {
            filter.encode(reference, &mut raw)?;
        }

        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for (key, value) in raw {
            let encoded = encode_component(&value);
            match grouped.iter_mut().find(|(k, _)| *k == key) {
                Some((_, values)) => values.push(encoded),
                None => grouped.push((key, vec![encoded])),
            }
        }
        Ok(grouped
            .into_iter()
            .map(|(key, values)| (key, values.join(",")))
            .collect())
    }
}

impl FromIterator<Filter> for FilterSpec {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

/// A relationship that can be expanded via `include=`.
///
/// Variants are declared in the alphabetical order of their wire names so
/// the derived `Ord` yields the deterministic sorted encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Include {
    Addresses,
    Emails,
    Household,
    Person,
    PhoneNumbers,
}

impl Include {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Addresses => "addresses",
            Self::Emails => "emails",
            Self::Household => "household",
            Self::Person => "person",
            Self::PhoneNumbers => "phone_numbers",
        }
    }
}

/// Deduplicated, deterministically ordered set of relationships to expand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeSpec {
    set: BTreeSet<Include>,
}

impl IncludeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, include: Include) -> Self {
        self.set.insert(include);
        self
    }

    pub fn insert(&mut self, include: Include) {
        self.set.insert(include);
    }

    pub fn contains(&self, include: Include) -> bool {
        self.set.contains(&include)
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Include> + '_ {
        self.set.iter().copied()
    }

    fn encode(&self) -> Option<String> {
        if self.set.is_empty() {
            return None;
        }
        let names: Vec<&str> = self.set.iter().map(Include::as_str).collect();
        Some(names.join(","))
    }
}

impl FromIterator<Include> for IncludeSpec {
    fn from_iter<I: IntoIterator<Item = Include>>(iter: I) -> Self {
        Self {
            set: iter.into_iter().collect(),
        }
    }
}

/// Sparse fieldsets: restrict which attributes come back per resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldsSpec {
    map: BTreeMap<String, BTreeSet<String>>,
}

impl FieldsSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restrict<I, S>(mut self, kind: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map
            .entry(kind.into())
            .or_default()
            .extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn encode(&self) -> Vec<(String, String)> {
        self.map
            .iter()
            .map(|(kind, fields)| {
                let names: Vec<&str> = fields.iter().map(String::as_str).collect();
                (format!("fields[{kind}]"), names.join(","))
            })
            .collect()
    }
}

/// Page size and offset. Size is clamped to the API maximum on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    per_page: u64,
    offset: u64,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            per_page: 25,
            offset: 0,
        }
    }
}

impl PageSpec {
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

/// Sort order for a collection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    field: String,
    descending: bool,
}

impl Order {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    fn encode(&self) -> String {
        if self.descending {
            format!("-{}", self.field)
        } else {
            self.field.clone()
        }
    }
}

/// A complete request specification, built into a query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: FilterSpec,
    pub include: IncludeSpec,
    pub fields: FieldsSpec,
    pub page: PageSpec,
    pub order: Option<Order>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn include(mut self, include: Include) -> Self {
        self.include.insert(include);
        self
    }

    pub fn page(mut self, page: PageSpec) -> Self {
        self.page = page;
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Build the encoded query string. `reference` is the date used for
    /// age-to-birthdate translation (callers pass today; tests pin a date).
    pub fn build(&self, reference: NaiveDate) -> Result<String, ValidationError> {
        let mut segments: Vec<String> = Vec::new();

        for (key, value) in self.filters.encode(reference)? {
            segments.push(format!("{key}={value}"));
        }
        for (key, value) in self.fields.encode() {
            segments.push(format!("{key}={value}"));
        }
        if let Some(include) = self.include.encode() {
            segments.push(format!("include={include}"));
        }
        if let Some(order) = &self.order {
            segments.push(format!("order={}", encode_component(&order.encode())));
        }
        segments.push(format!("per_page={}", self.page.per_page));
        if self.page.offset > 0 {
            segments.push(format!("offset={}", self.page.offset));
        }

        Ok(segments.join("&"))
    }
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    #[test]
    fn one_pair_per_recognized_key() {
        let query = Query::new()
            .filter(Filter::Gender("Female".into()))
            .filter(Filter::Membership("Member".into()))
            .filter(Filter::LastName("Werhle".into()));

        let built = query.build(reference()).unwrap();
        assert_eq!(
            built,
            "filter[gender]=Female&filter[membership]=Member&filter[last_name]=Werhle&per_page=25"
        );
    }

    #[test]
    fn unknown_key_is_rejected_before_building() {
        let err = Filter::parse("shoe_size", "42").unwrap_err();
        assert_eq!(err, ValidationError::UnknownKey("shoe_size".into()));
    }

    #[test]
    fn parse_covers_the_fixed_table() {
        assert_eq!(
            Filter::parse("gender", "Male").unwrap(),
            Filter::Gender("Male".into())
        );
        assert_eq!(
            Filter::parse("household", "true").unwrap(),
            Filter::HasHousehold(true)
        );
        assert_eq!(
            Filter::parse("min_age", "18").unwrap(),
            Filter::AgeRange {
                min: Some(18),
                max: None
            }
        );
        assert_eq!(
            Filter::parse("completed_after", "2024-01-01").unwrap(),
            Filter::CompletedAfter(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert!(matches!(
            Filter::parse("completed_after", "yesterday"),
            Err(ValidationError::InvalidValue { .. })
        ));
        assert!(matches!(
            Filter::parse("household", "maybe"),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn duplicate_keys_comma_join_and_embedded_commas_escape() {
        let query = Query::new()
            .filter(Filter::Status("active".into()))
            .filter(Filter::Status("pending, review".into()));

        let built = query.build(reference()).unwrap();
        // Two values under one key; the comma inside the second value is
        // percent-encoded, the delimiter is not.
        assert_eq!(
            built,
            "filter[status]=active,pending%2C+review&per_page=25"
        );
    }

    #[test]
    fn values_are_percent_encoded() {
        let query = Query::new().filter(Filter::Search("Nick Werhle".into()));
        let built = query.build(reference()).unwrap();
        assert_eq!(
            built,
            "filter[search_name_or_email]=Nick+Werhle&per_page=25"
        );
    }

    #[test]
    fn includes_are_deduplicated_and_sorted() {
        let query = Query::new()
            .include(Include::PhoneNumbers)
            .include(Include::Addresses)
            .include(Include::PhoneNumbers)
            .include(Include::Emails);

        let built = query.build(reference()).unwrap();
        assert_eq!(built, "include=addresses,emails,phone_numbers&per_page=25");
    }

    #[test]
    fn sparse_fieldsets_encode_per_type() {
        let mut query = Query::new();
        query.fields = FieldsSpec::new().restrict("Person", ["first_name", "last_name"]);
        let built = query.build(reference()).unwrap();
        assert_eq!(built, "fields[Person]=first_name,last_name&per_page=25");
    }

    #[test]
    fn page_size_is_clamped_to_api_maximum() {
        assert_eq!(PageSpec::new(500).per_page(), MAX_PER_PAGE);
        assert_eq!(PageSpec::new(0).per_page(), 1);

        let query = Query::new().page(PageSpec::new(100).with_offset(200));
        let built = query.build(reference()).unwrap();
        assert_eq!(built, "per_page=100&offset=200");
    }

    #[test]
    fn order_encodes_direction() {
        let asc = Query::new().order(Order::asc("last_name"));
        assert_eq!(
            asc.build(reference()).unwrap(),
            "order=last_name&per_page=25"
        );

        let desc = Query::new().order(Order::desc("created_at"));
        assert_eq!(
            desc.build(reference()).unwrap(),
            "order=-created_at&per_page=25"
        );
    }

    #[test]
    fn age_range_translates_to_inclusive_birthdate_bounds() {
        let query = Query::new().filter(Filter::age_range(Some(18), Some(65)).unwrap());
        let built = query.build(reference()).unwrap();

        // Born exactly 18 years before the reference date: included.
        // Born one day later (a day short of 18): excluded by the lte bound.
        // Born 1960-08-07 is exactly the earliest date still aged 65.
        assert_eq!(
            built,
            "filter[birthdate][lte]=2008-08-06&filter[birthdate][gte]=1960-08-07&per_page=25"
        );
    }

    #[test]
    fn age_boundary_membership() {
        let lte = born_on_or_before(reference(), 18);
        let included = NaiveDate::from_ymd_opt(2008, 8, 6).unwrap();
        let excluded = NaiveDate::from_ymd_opt(2008, 8, 7).unwrap();
        assert!(included <= lte);
        assert!(excluded > lte);

        let gte = born_on_or_after(reference(), 65);
        // Someone born on the bound turns 66 the day after the reference.
        assert_eq!(gte, NaiveDate::from_ymd_opt(1960, 8, 7).unwrap());
        assert!(NaiveDate::from_ymd_opt(1960, 8, 6).unwrap() < gte);
    }

    #[test]
    fn leap_day_reference_clamps() {
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            born_on_or_before(leap, 1),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
    }

    #[test]
    fn age_bounds_validate() {
        assert_eq!(
            Filter::age_range(Some(30), Some(20)).unwrap_err(),
            ValidationError::AgeBoundsInverted { min: 30, max: 20 }
        );
        assert_eq!(
            Filter::age_range(Some(200), None).unwrap_err(),
            ValidationError::AgeOutOfRange(200)
        );
        assert!(matches!(
            Filter::age_range(None, None).unwrap_err(),
            ValidationError::EmptyValue { .. }
        ));
    }

    #[test]
    fn empty_values_are_rejected() {
        let query = Query::new().filter(Filter::Gender("  ".into()));
        assert!(matches!(
            query.build(reference()),
            Err(ValidationError::EmptyValue { key: "gender" })
        ));
    }
}
