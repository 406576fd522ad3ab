use serde::Serialize;

use crate::utils::CallerTier;

#[derive(Debug, Serialize)]
pub struct AnonymousTokenResponse {
    pub caller_id: String,
    pub token: String,
    pub tier: CallerTier,
    pub expires_at: i64,
}
