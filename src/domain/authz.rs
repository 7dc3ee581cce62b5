use crate::models::Role;

/// Pure role-gate predicate: does `role` belong to the allowed set?
///
/// The allowed set is fixed per route at startup; this function has no side
/// effects and must run strictly after authentication has established `role`.
pub fn is_authorized(role: Role, allowed: &[Role]) -> bool {
  allowed.contains(&role)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn membership_decides_authorization() {
    assert!(is_authorized(Role::Admin, &[Role::Admin]));
    assert!(is_authorized(Role::User, &[Role::Admin, Role::User]));
    assert!(!is_authorized(Role::User, &[Role::Admin]));
    assert!(!is_authorized(Role::Admin, &[]));
  }
}
