use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

pub async fn get_user_role<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<String>> {
    sqlx::query_scalar::<_, String>("SELECT role FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}
