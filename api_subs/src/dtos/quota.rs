use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct QuotaRequest {
    pub action_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaCheckResponse {
    pub allowed: bool,
    pub used: i32,
    pub limit: i32,
    pub remaining: i32,
}

#[derive(Debug, Serialize)]
pub struct QuotaDeductResponse {
    pub success: bool,
    pub remaining: i32,
    pub message: String,
}
