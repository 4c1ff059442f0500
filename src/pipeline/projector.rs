//! Role-scoped views of the location store.

use crate::models::{AccessDenied, Location, Role};

/// Restrict the store to what `role` may see.
///
/// Admins and super-users get everything; users get the first
/// [`crate::models::role::USER_LOCATION_LIMIT`] entries. Any other role
/// string is denied.
pub fn project<'a>(locations: &'a [Location], role: &str) -> Result<&'a [Location], AccessDenied> {
    let role: Role = role.parse()?;
    Ok(project_role(locations, role))
}

pub fn project_role(locations: &[Location], role: Role) -> &[Location] {
    match role.location_limit() {
        Some(limit) => &locations[..limit.min(locations.len())],
        None => locations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(n: usize) -> Vec<Location> {
        (1..=n)
            .map(|i| Location {
                id: format!("r{}", i),
                name: format!("Tienda {}", i),
                latitude: 19.0,
                longitude: -99.0,
                metric: "N/A".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_admin_and_super_user_see_everything() {
        let locations = store(8);
        assert_eq!(project(&locations, "admin").unwrap(), &locations[..]);
        assert_eq!(project(&locations, "super-user").unwrap(), &locations[..]);
    }

    #[test]
    fn test_user_sees_prefix() {
        for n in [0, 3, 5, 8] {
            let locations = store(n);
            let view = project(&locations, "user").unwrap();
            assert_eq!(view.len(), n.min(5));
            assert_eq!(view, &locations[..n.min(5)]);
        }
    }

    #[test]
    fn test_user_view_is_subset_of_admin_view() {
        let locations = store(12);
        let admin = project(&locations, "admin").unwrap();
        let user = project(&locations, "user").unwrap();
        assert!(user.iter().all(|l| admin.contains(l)));
    }

    #[test]
    fn test_unknown_role_denied() {
        let locations = store(2);
        let err = project(&locations, "guest").unwrap_err();
        assert_eq!(err.role, "guest");
    }
}
