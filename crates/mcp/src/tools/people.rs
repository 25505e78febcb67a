// People search and filter tools

use crate::protocol::{CallToolResult, ToolErrorPayload, ToolSchema};
use crate::tools::{
    error_result, json_result, json_schema_boolean, json_schema_integer, json_schema_object,
    json_schema_string, Tool, ToolContext,
};
use anyhow::{Context, Result};
use flock_sdk::{Filter, FilterSpec, Include, IncludeSpec, Order};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

fn default_true() -> bool {
    true
}

async fn list_people(
    ctx: &ToolContext,
    filters: FilterSpec,
    include: IncludeSpec,
    order: Option<Order>,
) -> Result<CallToolResult> {
    match ctx
        .client
        .people()
        .list(filters, include, order, ctx.max_pages)
        .await
    {
        Ok(people) => json_result(&json!({"count": people.len(), "people": people})),
        Err(error) => Ok(error_result(&error)),
    }
}

/// Search people by name or email, optionally expanding contact info.
pub struct SearchPeopleTool {
    ctx: Arc<ToolContext>,
}

impl SearchPeopleTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct SearchPeopleArgs {
    query: String,
    #[serde(default = "default_true")]
    include_phone: bool,
    #[serde(default)]
    include_email: bool,
    #[serde(default)]
    include_address: bool,
}

#[async_trait::async_trait]
impl Tool for SearchPeopleTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_people".to_string(),
            description: "Search for people by name or email, optionally including their contact information".to_string(),
            input_schema: json_schema_object(
                json!({
                    "query": json_schema_string("Search query (name or email)"),
                    "include_phone": json_schema_boolean("Include phone numbers (default: true)"),
                    "include_email": json_schema_boolean("Include email addresses (default: false)"),
                    "include_address": json_schema_boolean("Include street addresses (default: false)")
                }),
                vec!["query"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: SearchPeopleArgs =
            serde_json::from_value(arguments).context("Invalid arguments for search_people")?;

        let mut include = IncludeSpec::new();
        if args.include_phone {
            include.insert(Include::PhoneNumbers);
        }
        if args.include_email {
            include.insert(Include::Emails);
        }
        if args.include_address {
            include.insert(Include::Addresses);
        }

        match self.ctx.client.people().search(&args.query, include).await {
            Ok(people) => json_result(&json!({"count": people.len(), "people": people})),
            Err(error) => Ok(error_result(&error)),
        }
    }
}

/// Fetch one person with household and contact info joined in.
pub struct GetPersonDetailsTool {
    ctx: Arc<ToolContext>,
}

impl GetPersonDetailsTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct PersonIdArgs {
    person_id: String,
}

#[async_trait::async_trait]
impl Tool for GetPersonDetailsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_person_details".to_string(),
            description: "Get detailed information about a person, including household and contact information".to_string(),
            input_schema: json_schema_object(
                json!({"person_id": json_schema_string("The person's id")}),
                vec!["person_id"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: PersonIdArgs =
            serde_json::from_value(arguments).context("Invalid arguments for get_person_details")?;

        let include = IncludeSpec::new()
            .with(Include::Household)
            .with(Include::Addresses)
            .with(Include::Emails)
            .with(Include::PhoneNumbers);

        match self.ctx.client.people().get(&args.person_id, include).await {
            Ok(Some(person)) => json_result(&person),
            Ok(None) => not_found(&args.person_id),
            Err(error) => Ok(error_result(&error)),
        }
    }
}

pub(crate) fn not_found(person_id: &str) -> Result<CallToolResult> {
    let payload = ToolErrorPayload {
        kind: "not_found".to_string(),
        message: format!("Person {person_id} not found"),
        retry_after_secs: None,
    };
    Ok(CallToolResult::failure(serde_json::to_string(&payload)?))
}

/// List people inside an age window.
pub struct ListPeopleByAgeRangeTool {
    ctx: Arc<ToolContext>,
}

impl ListPeopleByAgeRangeTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct AgeRangeArgs {
    #[serde(default)]
    min_age: Option<u32>,
    #[serde(default)]
    max_age: Option<u32>,
}

#[async_trait::async_trait]
impl Tool for ListPeopleByAgeRangeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_people_by_age_range".to_string(),
            description: "List people within an age range. Both bounds are inclusive; at least one is required".to_string(),
            input_schema: json_schema_object(
                json!({
                    "min_age": json_schema_integer("Minimum age in whole years"),
                    "max_age": json_schema_integer("Maximum age in whole years")
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: AgeRangeArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for list_people_by_age_range")?;

        let filter = match Filter::age_range(args.min_age, args.max_age) {
            Ok(filter) => filter,
            Err(invalid) => return Ok(error_result(&invalid.into())),
        };
        list_people(
            &self.ctx,
            FilterSpec::new().with(filter),
            IncludeSpec::new(),
            None,
        )
        .await
    }
}

/// List people by gender.
pub struct ListPeopleByGenderTool {
    ctx: Arc<ToolContext>,
}

impl ListPeopleByGenderTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct GenderArgs {
    gender: String,
}

#[async_trait::async_trait]
impl Tool for ListPeopleByGenderTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_people_by_gender".to_string(),
            description: "List people with a specific gender (e.g. \"Male\", \"Female\")"
                .to_string(),
            input_schema: json_schema_object(
                json!({"gender": json_schema_string("The gender to filter by")}),
                vec!["gender"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: GenderArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for list_people_by_gender")?;
        list_people(
            &self.ctx,
            FilterSpec::new().with(Filter::Gender(args.gender)),
            IncludeSpec::new(),
            None,
        )
        .await
    }
}

/// List people by membership type.
pub struct ListPeopleByMembershipTool {
    ctx: Arc<ToolContext>,
}

impl ListPeopleByMembershipTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct MembershipArgs {
    membership: String,
}

#[async_trait::async_trait]
impl Tool for ListPeopleByMembershipTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_people_by_membership".to_string(),
            description: "List people with a specific membership type".to_string(),
            input_schema: json_schema_object(
                json!({"membership": json_schema_string("The membership type to filter by")}),
                vec!["membership"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: MembershipArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for list_people_by_membership")?;
        list_people(
            &self.ctx,
            FilterSpec::new().with(Filter::Membership(args.membership)),
            IncludeSpec::new(),
            None,
        )
        .await
    }
}

/// List people sharing a family (last) name.
pub struct ListPeopleInFamilyTool {
    ctx: Arc<ToolContext>,
}

impl ListPeopleInFamilyTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct FamilyArgs {
    last_name: String,
}

#[async_trait::async_trait]
impl Tool for ListPeopleInFamilyTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_people_in_family".to_string(),
            description: "List people with a specific family (last) name".to_string(),
            input_schema: json_schema_object(
                json!({"last_name": json_schema_string("The family name to search for")}),
                vec!["last_name"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: FamilyArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for list_people_in_family")?;
        list_people(
            &self.ctx,
            FilterSpec::new().with(Filter::LastName(args.last_name)),
            IncludeSpec::new(),
            Some(Order::asc("first_name")),
        )
        .await
    }
}

/// List people attached to a household.
pub struct ListPeopleWithHouseholdTool {
    ctx: Arc<ToolContext>,
}

impl ListPeopleWithHouseholdTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for ListPeopleWithHouseholdTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_people_with_household".to_string(),
            description: "List people who belong to a household, with the household joined in"
                .to_string(),
            input_schema: json_schema_object(json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<CallToolResult> {
        list_people(
            &self.ctx,
            FilterSpec::new().with(Filter::HasHousehold(true)),
            IncludeSpec::new().with(Include::Household),
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ToolContent;
    use flock_sdk::{FlockClient, RetryConfig};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(server_uri: &str) -> Arc<ToolContext> {
        let client = FlockClient::builder()
            .base_url(server_uri)
            .basic_auth("app-id", "app-secret")
            .retry(RetryConfig::no_retry())
            .build()
            .unwrap();
        ToolContext::new(Arc::new(client), 2)
    }

    fn payload(result: &CallToolResult) -> serde_json::Value {
        let ToolContent::Text { text } = &result.content[0];
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn search_people_flattens_phone_numbers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people"))
            .and(query_param("filter[search_name_or_email]", "Nick Werhle"))
            .and(query_param("include", "phone_numbers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "type": "Person", "id": "42",
                    "attributes": {"first_name": "Nick", "last_name": "Werhle"},
                    "relationships": {"phone_numbers": {"data": [{"type": "PhoneNumber", "id": "p1"}]}}
                }],
                "included": [{"type": "PhoneNumber", "id": "p1", "attributes": {"number": "555-0100"}}]
            })))
            .mount(&server)
            .await;

        let tool = SearchPeopleTool::new(context(&server.uri()));
        let result = tool
            .execute(json!({"query": "Nick Werhle", "include_phone": true}))
            .await
            .unwrap();

        assert!(result.is_error.is_none());
        let body = payload(&result);
        assert_eq!(body["count"], 1);
        assert_eq!(
            body["people"][0]["phone_numbers"],
            json!([{"id": "p1", "number": "555-0100"}])
        );
    }

    #[tokio::test]
    async fn age_range_validation_fails_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(0)
            .mount(&server)
            .await;

        let tool = ListPeopleByAgeRangeTool::new(context(&server.uri()));
        let result = tool
            .execute(json!({"min_age": 65, "max_age": 18}))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert_eq!(payload(&result)["kind"], "validation");
    }

    #[tokio::test]
    async fn age_range_builds_birthdate_bounds() {
        let server = MockServer::start().await;
        // Only the shape of the query matters here; the window bounds
        // themselves are pinned in flock-core's query tests.
        Mock::given(method("GET"))
            .and(path("/people"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let tool = ListPeopleByAgeRangeTool::new(context(&server.uri()));
        let result = tool
            .execute(json!({"min_age": 18, "max_age": 65}))
            .await
            .unwrap();
        assert!(result.is_error.is_none());

        let received = &server.received_requests().await.unwrap()[0];
        let query = received.url.query().unwrap();
        assert!(query.contains("filter[birthdate][lte]="));
        assert!(query.contains("filter[birthdate][gte]="));
    }

    #[tokio::test]
    async fn get_person_details_reports_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people/999"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tool = GetPersonDetailsTool::new(context(&server.uri()));
        let result = tool.execute(json!({"person_id": "999"})).await.unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(payload(&result)["kind"], "not_found");
    }

    #[tokio::test]
    async fn missing_required_argument_is_an_invalid_call() {
        let server = MockServer::start().await;
        let tool = ListPeopleByGenderTool::new(context(&server.uri()));
        assert!(tool.execute(json!({})).await.is_err());
    }
}
