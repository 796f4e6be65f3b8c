//! Data models for Intune assignments and the report built from them

mod assignment;
mod category;
mod configuration;
mod group;
mod odata;
mod report;

pub use assignment::{
    AssignmentTarget, RawAssignment, RawGroupAssignment, ALL_DEVICES_TARGET,
    ALL_LICENSED_USERS_TARGET, EXCLUSION_GROUP_TARGET, GROUP_TARGET,
};
pub use category::{Category, CategoryTable, SchemaVariant};
pub use configuration::{ConfigurationObject, RawConfigurationObject};
pub use group::{Group, GroupIdentity, Sign, Trail, ALL_DEVICES_ID, ALL_USERS_ID};
pub use odata::{ODataError, ODataResponse};
pub use report::Report;
