use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Consumer {
    pub consumer_id: String,
    pub short_name: Option<String>,
}
