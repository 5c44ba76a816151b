use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A walk-in patient as captured once at registration.
///
/// `is_priority` is derived from age at creation (see `config::PRIORITY_AGE`)
/// and immutable thereafter; queue records reference patients, never copy them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub age: u32,
    pub phone: String,
    pub is_priority: bool,
}
