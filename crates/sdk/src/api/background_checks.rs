//! Background checks API endpoints.

use crate::client::FlockClient;
use crate::error::FlockResult;
use chrono::NaiveDate;
use flock_core::flatten::{flatten, FlatRecord};
use flock_core::query::{Filter, FilterSpec, Include, IncludeSpec, PageSpec, Query, MAX_PER_PAGE};

/// Filters for listing background checks.
#[derive(Debug, Clone, Default)]
pub struct CheckQuery {
    /// e.g. "approved", "pending", "denied", "expired".
    pub status: Option<String>,
    pub completed_after: Option<NaiveDate>,
    pub completed_before: Option<NaiveDate>,
    pub check_type: Option<String>,
    /// Expand the checked person into each record.
    pub include_person: bool,
}

/// Background checks API.
pub struct BackgroundChecksApi<'a> {
    client: &'a FlockClient,
}

impl<'a> BackgroundChecksApi<'a> {
    pub(crate) fn new(client: &'a FlockClient) -> Self {
        Self { client }
    }

    /// List checks matching `params`, optionally joined to their person.
    pub async fn list(&self, params: CheckQuery, max_pages: u32) -> FlockResult<Vec<FlatRecord>> {
        let mut filters = FilterSpec::new();
        if let Some(status) = params.status {
            filters.push(Filter::CheckStatus(status));
        }
        if let Some(date) = params.completed_after {
            filters.push(Filter::CompletedAfter(date));
        }
        if let Some(date) = params.completed_before {
            filters.push(Filter::CompletedBefore(date));
        }
        if let Some(check_type) = params.check_type {
            filters.push(Filter::CheckType(check_type));
        }

        let mut include = IncludeSpec::new();
        if params.include_person {
            include.insert(Include::Person);
        }

        let mut query = Query::new().page(PageSpec::new(MAX_PER_PAGE));
        query.filters = filters;
        query.include = include.clone();

        let document = self
            .client
            .fetch_all("background_checks", &query, max_pages)
            .await?;
        Ok(flatten(&document, &include))
    }
}
