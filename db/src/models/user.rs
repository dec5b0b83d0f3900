pub const ROLE_MEMBER: &str = "member";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

pub fn is_admin_role(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_SUPER_ADMIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_roles_pass() {
        assert!(is_admin_role(ROLE_ADMIN));
        assert!(is_admin_role(ROLE_SUPER_ADMIN));
        assert!(!is_admin_role(ROLE_MEMBER));
        assert!(!is_admin_role("root"));
    }
}
