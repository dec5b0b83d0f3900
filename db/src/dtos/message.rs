use uuid::Uuid;

pub struct MessageCreateRequest {
    pub receiver_id: Uuid,
    pub subject: String,
    pub content: String,
}
