use serde::Serialize;

use crate::entity::category;

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Computer Science")]
    pub name: String,
}

impl From<category::Model> for CategoryResponse {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}
