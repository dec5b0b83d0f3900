use common::error::{AppError, Res};
use db::models::user::is_admin_role;
use sqlx::PgPool;
use uuid::Uuid;

/// Admin endpoints re-check the caller's role from `user_roles`; a JWT
/// alone is never sufficient for an override.
pub async fn require_admin(pool: &PgPool, user_id: Uuid) -> Res<()> {
    match db::user::get_user_role(pool, user_id).await? {
        Some(role) if is_admin_role(&role) => Ok(()),
        _ => Err(AppError::Forbidden(
            "Administrator privileges required".to_string(),
        )),
    }
}
