// Core types and functionality for Flock people-directory clients

pub mod document;
pub mod flatten;
pub mod limiter;
pub mod query;

pub use document::{
    Document, Links, Meta, NextOffset, NextPage, PrimaryData, Relationship, RelationshipData,
    Resource, ResourceIdentifier,
};
pub use flatten::{flatten, FlatRecord};
pub use limiter::{RateLimitExceeded, RateLimiter, DEFAULT_LIMIT, DEFAULT_WINDOW};
pub use query::{
    FieldsSpec, Filter, FilterSpec, Include, IncludeSpec, Order, PageSpec, Query, ValidationError,
    MAX_AGE, MAX_PER_PAGE,
};
