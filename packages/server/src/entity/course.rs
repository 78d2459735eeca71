use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Opaque identity of the teacher who owns the course.
    #[sea_orm(indexed)]
    pub owner_id: String,

    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<f64>,

    pub category_id: Option<i32>,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: HasOne<super::category::Entity>,

    #[sea_orm(has_many)]
    pub chapters: HasMany<super::chapter::Entity>,

    #[sea_orm(has_many)]
    pub attachments: HasMany<super::attachment::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
