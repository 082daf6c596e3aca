use super::Role;
use crate::error::ApiError;

/// Role check performed by handlers with the identity bound by the
/// authorization gate.
///
/// # Returns
///
/// * `Ok(())` if `actual` satisfies `required`. `Admin` satisfies every role.
/// * `Err(ApiError::Forbidden)` otherwise.
pub fn require_role(actual: Role, required: Role) -> Result<(), ApiError> {
    match (actual, required) {
        (Role::Admin, _) | (Role::User, Role::User) => Ok(()),
        (Role::User, Role::Admin) => Err(ApiError::Forbidden),
    }
}
