use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// One row of the server listing query: server columns joined with the
// category name, plus the member-count annotation when it was selected.
#[derive(Debug, Clone, FromRow)]
pub struct ServerRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub category: String,
    #[sqlx(default)]
    pub num_members: Option<i64>,
}

// Wire shape of a directory entry. num_members is only present when the
// caller asked for the annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner: i64,
    pub category: String,
    pub members: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_members: Option<i64>,
}

impl ServerRow {
    pub fn into_record(self, members: Vec<i64>) -> ServerRecord {
        ServerRecord {
            id: self.id,
            name: self.name,
            description: self.description,
            owner: self.owner_id,
            category: self.category,
            members,
            num_members: self.num_members,
        }
    }
}
