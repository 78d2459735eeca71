use sea_orm::sea_query::LockType;
use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect, Select};
use tracing::warn;
use uuid::Uuid;

use crate::entity::course;
use crate::error::AppError;
use crate::extractors::auth::AuthUser;

/// Load `course_id` if `caller` owns it.
///
/// A missing course and a course owned by someone else both yield
/// `Unauthorized`, so callers cannot probe which ids exist.
pub async fn authorize_course<C: ConnectionTrait>(
    db: &C,
    caller: &AuthUser,
    course_id: Uuid,
) -> Result<course::Model, AppError> {
    check_owner(course::Entity::find_by_id(course_id), db, caller, course_id).await
}

/// Same as [`authorize_course`], but also takes a row lock on the course
/// for the rest of the enclosing transaction `txn`. Serializes chapter
/// appends and reorders.
pub async fn authorize_course_for_update<C: ConnectionTrait>(
    txn: &C,
    caller: &AuthUser,
    course_id: Uuid,
) -> Result<course::Model, AppError> {
    let select = course::Entity::find_by_id(course_id).lock(LockType::Update);
    check_owner(select, txn, caller, course_id).await
}

async fn check_owner<C: ConnectionTrait>(
    select: Select<course::Entity>,
    db: &C,
    caller: &AuthUser,
    course_id: Uuid,
) -> Result<course::Model, AppError> {
    match select.one(db).await? {
        Some(course) if course.owner_id == caller.user_id => Ok(course),
        found => {
            warn!(
                caller = %caller.user_id,
                %course_id,
                exists = found.is_some(),
                "Rejected access to course"
            );
            Err(AppError::Unauthorized)
        }
    }
}
