use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A directory entry. The badge QR code encodes `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "EMP-001",
        "name": "Alice",
        "department": "Engineering"
    })
)]
pub struct Employee {
    #[schema(example = "EMP-001")]
    pub id: String,

    #[schema(example = "Alice")]
    pub name: String,

    #[schema(example = "Engineering")]
    pub department: String,
}

impl Employee {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: department.into(),
        }
    }
}
