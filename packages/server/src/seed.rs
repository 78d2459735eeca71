use sea_orm::sea_query::{Index, IndexCreateStatement, OnConflict};
use sea_orm::*;
use tracing::info;

use crate::entity::{attachment, category, chapter};

/// Category options offered to teachers on first start.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Accounting",
    "Computer Science",
    "Engineering",
    "Filming",
    "Fitness",
    "Music",
    "Photography",
];

/// Seed the `category` table with defaults. Existing names are left alone.
pub async fn seed_categories(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut inserted = 0u32;
    for &name in DEFAULT_CATEGORIES {
        let model = category::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        let result = category::Entity::insert(model)
            .on_conflict(
                OnConflict::column(category::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} new categories", inserted);
    }

    Ok(())
}

/// Ensure the lookup indexes used by course pages exist.
///
/// Positions are not unique: a reorder transaction passes
/// through duplicate positions before it commits.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // SELECT ... FROM chapter WHERE course_id = ? ORDER BY position
    let chapter_idx = Index::create()
        .if_not_exists()
        .name("idx_chapter_course_position")
        .table(chapter::Entity)
        .col(chapter::Column::CourseId)
        .col(chapter::Column::Position)
        .to_owned();
    create_index(db, "idx_chapter_course_position", &chapter_idx).await;

    // SELECT ... FROM attachment WHERE course_id = ? ORDER BY created_at DESC
    let attachment_idx = Index::create()
        .if_not_exists()
        .name("idx_attachment_course_created")
        .table(attachment::Entity)
        .col(attachment::Column::CourseId)
        .col(attachment::Column::CreatedAt)
        .to_owned();
    create_index(db, "idx_attachment_course_created", &attachment_idx).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &IndexCreateStatement) {
    let stmt = db.get_database_backend().build(stmt);
    match db.execute_raw(stmt).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
    }
}
