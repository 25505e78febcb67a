// Per-person contact information tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::people::not_found;
use crate::tools::{
    error_result, json_result, json_schema_object, json_schema_string, Tool, ToolContext,
};
use anyhow::{Context, Result};
use flock_sdk::FlatRecord;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct PersonIdArgs {
    person_id: String,
}

/// Which contact collection a [`ContactCollectionTool`] serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactCollection {
    PhoneNumbers,
    Emails,
    Addresses,
}

impl ContactCollection {
    fn tool_name(&self) -> &'static str {
        match self {
            Self::PhoneNumbers => "get_person_phone_numbers",
            Self::Emails => "get_person_emails",
            Self::Addresses => "get_person_addresses",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::PhoneNumbers => "Get the phone numbers on file for a person",
            Self::Emails => "Get the email addresses on file for a person",
            Self::Addresses => "Get the street addresses on file for a person",
        }
    }

    fn payload_key(&self) -> &'static str {
        match self {
            Self::PhoneNumbers => "phone_numbers",
            Self::Emails => "emails",
            Self::Addresses => "addresses",
        }
    }
}

/// One tool per contact collection, all sharing a shape: look up the
/// person's subresource and return the flattened records.
pub struct ContactCollectionTool {
    ctx: Arc<ToolContext>,
    collection: ContactCollection,
}

impl ContactCollectionTool {
    pub fn phone_numbers(ctx: Arc<ToolContext>) -> Self {
        Self {
            ctx,
            collection: ContactCollection::PhoneNumbers,
        }
    }

    pub fn emails(ctx: Arc<ToolContext>) -> Self {
        Self {
            ctx,
            collection: ContactCollection::Emails,
        }
    }

    pub fn addresses(ctx: Arc<ToolContext>) -> Self {
        Self {
            ctx,
            collection: ContactCollection::Addresses,
        }
    }

    async fn fetch(&self, person_id: &str) -> Result<Vec<FlatRecord>, flock_sdk::Error> {
        let people = self.ctx.client.people();
        match self.collection {
            ContactCollection::PhoneNumbers => people.phone_numbers(person_id).await,
            ContactCollection::Emails => people.emails(person_id).await,
            ContactCollection::Addresses => people.addresses(person_id).await,
        }
    }
}

#[async_trait::async_trait]
impl Tool for ContactCollectionTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.collection.tool_name().to_string(),
            description: self.collection.description().to_string(),
            input_schema: json_schema_object(
                json!({"person_id": json_schema_string("The person's id")}),
                vec!["person_id"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: PersonIdArgs = serde_json::from_value(arguments)
            .with_context(|| format!("Invalid arguments for {}", self.collection.tool_name()))?;

        match self.fetch(&args.person_id).await {
            Ok(records) => {
                let mut body = serde_json::Map::new();
                body.insert("person_id".to_string(), json!(args.person_id));
                body.insert(self.collection.payload_key().to_string(), json!(records));
                json_result(&serde_json::Value::Object(body))
            }
            Err(error) => Ok(error_result(&error)),
        }
    }
}

/// All three contact collections in one round-trip, joined onto the person.
pub struct GetPersonContactInfoTool {
    ctx: Arc<ToolContext>,
}

impl GetPersonContactInfoTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for GetPersonContactInfoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_person_contact_info".to_string(),
            description: "Get a person's complete contact information (phone numbers, emails, addresses) in a single lookup".to_string(),
            input_schema: json_schema_object(
                json!({"person_id": json_schema_string("The person's id")}),
                vec!["person_id"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: PersonIdArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for get_person_contact_info")?;

        match self.ctx.client.people().contact_info(&args.person_id).await {
            Ok(Some(person)) => json_result(&person),
            Ok(None) => not_found(&args.person_id),
            Err(error) => Ok(error_result(&error)),
        }
    }
}
