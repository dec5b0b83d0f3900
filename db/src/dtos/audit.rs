use uuid::Uuid;

pub struct AuditCreateRequest {
    pub admin_id: Uuid,
    pub action: String,
    pub target_type: String,
    pub target_id: Uuid,
    pub old_value: String,
    pub new_value: String,
    pub note: Option<String>,
}
