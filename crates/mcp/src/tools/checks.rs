// Background check tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    error_result, json_result, json_schema_boolean, json_schema_object, json_schema_string, Tool,
    ToolContext,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use flock_sdk::api::CheckQuery;
use flock_sdk::{Filter, FilterSpec, IncludeSpec, ValidationError};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

fn default_true() -> bool {
    true
}

fn parse_iso_date(key: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// List background checks with flexible filtering.
pub struct ListBackgroundChecksTool {
    ctx: Arc<ToolContext>,
}

impl ListBackgroundChecksTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize)]
struct ListChecksArgs {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    completed_after: Option<String>,
    #[serde(default)]
    completed_before: Option<String>,
    #[serde(default)]
    check_type: Option<String>,
    #[serde(default = "default_true")]
    include_person: bool,
}

#[async_trait::async_trait]
impl Tool for ListBackgroundChecksTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_background_checks".to_string(),
            description: "List background checks filtered by status, completion date window, and check type".to_string(),
            input_schema: json_schema_object(
                json!({
                    "status": json_schema_string("Filter by status (e.g. \"approved\", \"pending\", \"denied\", \"expired\")"),
                    "completed_after": json_schema_string("Only checks completed on or after this date (YYYY-MM-DD)"),
                    "completed_before": json_schema_string("Only checks completed on or before this date (YYYY-MM-DD)"),
                    "check_type": json_schema_string("Filter by check type"),
                    "include_person": json_schema_boolean("Join the checked person into each record (default: true)")
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: ListChecksArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for list_background_checks")?;

        let mut params = CheckQuery {
            status: args.status,
            check_type: args.check_type,
            include_person: args.include_person,
            ..Default::default()
        };
        if let Some(value) = &args.completed_after {
            params.completed_after = match parse_iso_date("completed_after", value) {
                Ok(date) => Some(date),
                Err(invalid) => return Ok(error_result(&invalid.into())),
            };
        }
        if let Some(value) = &args.completed_before {
            params.completed_before = match parse_iso_date("completed_before", value) {
                Ok(date) => Some(date),
                Err(invalid) => return Ok(error_result(&invalid.into())),
            };
        }

        match self
            .ctx
            .client
            .background_checks()
            .list(params, self.ctx.max_pages)
            .await
        {
            Ok(checks) => json_result(&json!({"count": checks.len(), "background_checks": checks})),
            Err(error) => Ok(error_result(&error)),
        }
    }
}

/// List people whose background check passed.
pub struct ListPeopleWithApprovedChecksTool {
    ctx: Arc<ToolContext>,
}

impl ListPeopleWithApprovedChecksTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for ListPeopleWithApprovedChecksTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_people_with_approved_background_checks".to_string(),
            description: "List all people with an approved background check".to_string(),
            input_schema: json_schema_object(json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<CallToolResult> {
        let filters = FilterSpec::new().with(Filter::PassedBackgroundCheck(true));
        match self
            .ctx
            .client
            .people()
            .list(filters, IncludeSpec::new(), None, self.ctx.max_pages)
            .await
        {
            Ok(people) => json_result(&json!({"count": people.len(), "people": people})),
            Err(error) => Ok(error_result(&error)),
        }
    }
}
