pub mod checks;
pub mod contacts;
pub mod people;
mod registry;

pub use checks::{ListBackgroundChecksTool, ListPeopleWithApprovedChecksTool};
pub use contacts::{ContactCollectionTool, GetPersonContactInfoTool};
pub use people::{
    GetPersonDetailsTool, ListPeopleByAgeRangeTool, ListPeopleByGenderTool,
    ListPeopleByMembershipTool, ListPeopleInFamilyTool, ListPeopleWithHouseholdTool,
    SearchPeopleTool,
};
pub use registry::{
    error_result, json_result, json_schema_boolean, json_schema_integer, json_schema_object,
    json_schema_string, Tool, ToolRegistry,
};

use flock_sdk::FlockClient;
use std::sync::Arc;

/// Shared dependencies injected into every tool: the one client (and with
/// it the one rate limiter) plus the page cap for collection walks.
pub struct ToolContext {
    pub client: Arc<FlockClient>,
    pub max_pages: u32,
}

impl ToolContext {
    pub fn new(client: Arc<FlockClient>, max_pages: u32) -> Arc<Self> {
        Arc::new(Self { client, max_pages })
    }
}
