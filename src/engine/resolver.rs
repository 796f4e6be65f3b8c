//! Decide how one configuration object affects one group

use crate::models::{AssignmentTarget, Sign, Trail, ALL_DEVICES_ID, ALL_USERS_ID};

/// Append an entry to `trail` for every target of `object_name` that matches
/// `group_id`, in target order.
///
/// Include checks (named group, then the all-users / all-devices pseudo
/// groups) and the exclude check run independently for each target, so one
/// object can leave several entries. Returns the number of entries added.
pub fn resolve_membership(
    group_id: &str,
    object_name: &str,
    targets: &[AssignmentTarget],
    trail: &mut Trail,
) -> usize {
    let before = trail.len();

    for target in targets {
        let included = match target {
            AssignmentTarget::Include { group_id: id } => id == group_id,
            AssignmentTarget::AllUsers => group_id == ALL_USERS_ID,
            AssignmentTarget::AllDevices => group_id == ALL_DEVICES_ID,
            _ => false,
        };
        if included {
            trail.push(Sign::Include, object_name);
        }

        if let AssignmentTarget::Exclude { group_id: id } = target {
            if id == group_id {
                trail.push(Sign::Exclude, object_name);
            }
        }
    }

    trail.len() - before
}
