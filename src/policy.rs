//! Role-based action policy
//!
//! Single decision point for what a role may do to a resource, so screens
//! stop re-encoding (and drifting on) the permission matrix.

use crate::session::Role;

/// Resource families the policy rules over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Camera,
    Incident,
    Personne,
    Report,
}

/// Actions a screen may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Update,
    Validate,
    SoftDelete,
    Restore,
    PermanentDelete,
}

const ALL_ACTIONS: [Action; 7] = [
    Action::View,
    Action::Create,
    Action::Update,
    Action::Validate,
    Action::SoftDelete,
    Action::Restore,
    Action::PermanentDelete,
];

/// Whether `role` may perform `action` on `resource`
///
/// `is_owner` is true when the entity was created by the acting user
/// (e.g. an incident they reported).
pub fn is_permitted(role: Role, resource: Resource, action: Action, is_owner: bool) -> bool {
    match role {
        Role::Administrator => true,
        Role::Supervisor => action != Action::PermanentDelete,
        Role::Technician => match resource {
            Resource::Camera => matches!(action, Action::View | Action::Create | Action::Update),
            Resource::Incident => {
                matches!(action, Action::View | Action::Create)
                    || (action == Action::Update && is_owner)
            }
            Resource::Personne | Resource::Report => action == Action::View,
        },
        Role::FieldAgent => match resource {
            Resource::Incident => {
                matches!(action, Action::View | Action::Create)
                    || (action == Action::Update && is_owner)
            }
            Resource::Personne => matches!(action, Action::View | Action::Create),
            Resource::Camera | Resource::Report => action == Action::View,
        },
    }
}

/// Every action `role` may perform on `resource`
pub fn permitted_actions(role: Role, resource: Resource, is_owner: bool) -> Vec<Action> {
    ALL_ACTIONS
        .into_iter()
        .filter(|action| is_permitted(role, resource, *action, is_owner))
        .collect()
}
