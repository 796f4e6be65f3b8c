//! Raw assignment record -> canonical `AssignmentTarget`

use crate::error::NormalizationError;
use crate::models::{
    AssignmentTarget, RawAssignment, RawGroupAssignment, SchemaVariant,
    ALL_DEVICES_TARGET, ALL_LICENSED_USERS_TARGET, EXCLUSION_GROUP_TARGET, GROUP_TARGET,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Normalize one raw record according to its category's schema
pub fn normalize(
    record: &JsonValue,
    schema: SchemaVariant,
) -> Result<AssignmentTarget, NormalizationError> {
    if !record.is_object() {
        return Err(NormalizationError::NotAnObject);
    }

    match schema {
        SchemaVariant::GroupAssignments => normalize_group_assignment(record),
        SchemaVariant::Assignments => normalize_assignment(record),
    }
}

fn normalize_group_assignment(record: &JsonValue) -> Result<AssignmentTarget, NormalizationError> {
    let raw = RawGroupAssignment::deserialize(record).map_err(|e| invalid("groupId", e))?;
    let exclude = raw.exclude_group.unwrap_or(false);
    let group_id = required_group_id(raw.into_group_id(), "groupId")?;

    Ok(if exclude {
        AssignmentTarget::Exclude { group_id }
    } else {
        AssignmentTarget::Include { group_id }
    })
}

fn normalize_assignment(record: &JsonValue) -> Result<AssignmentTarget, NormalizationError> {
    let raw = RawAssignment::deserialize(record).map_err(|e| invalid("target", e))?;
    let target = raw.target.ok_or(NormalizationError::MissingField("target"))?;
    let odata_type = target
        .odata_type
        .ok_or(NormalizationError::MissingField("target.@odata.type"))?;

    let normalized = match odata_type.as_str() {
        GROUP_TARGET => AssignmentTarget::Include {
            group_id: required_group_id(target.group_id, "target.groupId")?,
        },
        EXCLUSION_GROUP_TARGET => AssignmentTarget::Exclude {
            group_id: required_group_id(target.group_id, "target.groupId")?,
        },
        ALL_LICENSED_USERS_TARGET => AssignmentTarget::AllUsers,
        ALL_DEVICES_TARGET => AssignmentTarget::AllDevices,
        _ => AssignmentTarget::Other { odata_type },
    };

    Ok(normalized)
}

fn required_group_id(
    group_id: Option<String>,
    field: &'static str,
) -> Result<String, NormalizationError> {
    match group_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(NormalizationError::MissingField(field)),
    }
}

fn invalid(field: &'static str, err: serde_json::Error) -> NormalizationError {
    NormalizationError::InvalidField {
        field,
        reason: err.to_string(),
    }
}
