//! People API endpoints.

use crate::api::validate_id;
use crate::client::{FlockClient, DEFAULT_MAX_PAGES};
use crate::error::{Error, FlockResult};
use flock_core::flatten::{flatten, FlatRecord};
use flock_core::query::{
    Filter, FilterSpec, Include, IncludeSpec, Order, PageSpec, Query, MAX_PER_PAGE,
};

/// People API: search, filtered listing, and per-person contact data.
pub struct PeopleApi<'a> {
    client: &'a FlockClient,
}

impl<'a> PeopleApi<'a> {
    pub(crate) fn new(client: &'a FlockClient) -> Self {
        Self { client }
    }

    /// Free-text search over names and email addresses, expanding the
    /// requested contact relationships in the same round-trips.
    pub async fn search(
        &self,
        text: &str,
        include: IncludeSpec,
    ) -> FlockResult<Vec<FlatRecord>> {
        let mut query = Query::new()
            .filter(Filter::Search(text.to_string()))
            .page(PageSpec::new(MAX_PER_PAGE));
        query.include = include.clone();
        let document = self
            .client
            .fetch_all("people", &query, DEFAULT_MAX_PAGES)
            .await?;
        Ok(flatten(&document, &include))
    }

    /// List people matching `filters`.
    pub async fn list(
        &self,
        filters: FilterSpec,
        include: IncludeSpec,
        order: Option<Order>,
        max_pages: u32,
    ) -> FlockResult<Vec<FlatRecord>> {
        let mut query = Query::new().page(PageSpec::new(MAX_PER_PAGE));
        query.filters = filters;
        query.include = include.clone();
        query.order = order;
        let document = self.client.fetch_all("people", &query, max_pages).await?;
        Ok(flatten(&document, &include))
    }

    /// Fetch one person by id; `None` when the id does not exist.
    pub async fn get(
        &self,
        person_id: &str,
        include: IncludeSpec,
    ) -> FlockResult<Option<FlatRecord>> {
        validate_id("person_id", person_id)?;
        let mut query = Query::new();
        query.include = include.clone();
        match self.client.fetch(&format!("people/{person_id}"), &query).await {
            Ok(document) => Ok(flatten(&document, &include).into_iter().next()),
            Err(Error::Client { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn phone_numbers(&self, person_id: &str) -> FlockResult<Vec<FlatRecord>> {
        self.contact_collection(person_id, "phone_numbers").await
    }

    pub async fn emails(&self, person_id: &str) -> FlockResult<Vec<FlatRecord>> {
        self.contact_collection(person_id, "emails").await
    }

    pub async fn addresses(&self, person_id: &str) -> FlockResult<Vec<FlatRecord>> {
        self.contact_collection(person_id, "addresses").await
    }

    /// One request carrying the person plus all three contact
    /// relationships, joined into a single record.
    pub async fn contact_info(&self, person_id: &str) -> FlockResult<Option<FlatRecord>> {
        let include = IncludeSpec::new()
            .with(Include::Addresses)
            .with(Include::Emails)
            .with(Include::PhoneNumbers);
        self.get(person_id, include).await
    }

    async fn contact_collection(
        &self,
        person_id: &str,
        name: &str,
    ) -> FlockResult<Vec<FlatRecord>> {
        validate_id("person_id", person_id)?;
        let query = Query::new().page(PageSpec::new(MAX_PER_PAGE));
        let document = self
            .client
            .fetch_all(
                &format!("people/{person_id}/{name}"),
                &query,
                DEFAULT_MAX_PAGES,
            )
            .await?;
        Ok(flatten(&document, &IncludeSpec::new()))
    }
}
