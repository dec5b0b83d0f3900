use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::message::MessageCreateRequest, models::message::Message};

pub async fn insert_system_message<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: MessageCreateRequest,
) -> Res<Message> {
    sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (receiver_id, sender_type, subject, content, message_type)
        VALUES ($1, 'system', $2, $3, 'system')
        RETURNING *
        "#,
    )
    .bind(data.receiver_id)
    .bind(&data.subject)
    .bind(&data.content)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn list_by_receiver<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    receiver_id: Uuid,
    unread_only: bool,
) -> Res<Vec<Message>> {
    let sql = if unread_only {
        "SELECT * FROM messages WHERE receiver_id = $1 AND is_read = FALSE ORDER BY created_at DESC"
    } else {
        "SELECT * FROM messages WHERE receiver_id = $1 ORDER BY created_at DESC"
    };

    sqlx::query_as::<_, Message>(sql)
        .bind(receiver_id)
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

/// Marks one of the receiver's messages read. Returns false when the
/// message does not exist or belongs to someone else.
pub async fn mark_read<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    message_id: Uuid,
    receiver_id: Uuid,
) -> Res<bool> {
    let result = sqlx::query(
        "UPDATE messages SET is_read = TRUE WHERE id = $1 AND receiver_id = $2",
    )
    .bind(message_id)
    .bind(receiver_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
