use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};

use crate::{dtos::audit::AuditCreateRequest, models::audit::AdminAuditLog};

pub async fn insert_audit<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: AuditCreateRequest,
) -> Res<AdminAuditLog> {
    sqlx::query_as::<_, AdminAuditLog>(
        r#"
        INSERT INTO admin_audit_logs
            (admin_id, action, target_type, target_id, old_value, new_value, note)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(data.admin_id)
    .bind(&data.action)
    .bind(&data.target_type)
    .bind(data.target_id)
    .bind(&data.old_value)
    .bind(&data.new_value)
    .bind(&data.note)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
