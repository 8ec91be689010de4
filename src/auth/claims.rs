use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::Role;

/// JWT payload; once validated it is the request-scoped identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,      // user ID
    pub email: String,
    pub role: Role,
    pub iat: usize,     // issued at (unix timestamp)
    pub exp: usize,     // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
    pub jti: Uuid,      // per-token nonce
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }
}
