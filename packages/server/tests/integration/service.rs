use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, QueryFilter,
    QueryOrder, Statement,
};
use tokio::task::JoinSet;
use uuid::Uuid;

use coursedesk_server::cache::{ViewCache, ViewStore, course_view_path};
use coursedesk_server::entity::chapter;
use coursedesk_server::error::AppError;
use coursedesk_server::extractors::auth::AuthUser;
use coursedesk_server::models::chapter::ChapterPosition;
use coursedesk_server::models::course::{CourseDetailResponse, CourseField};
use coursedesk_server::services::{AttachmentService, ChapterService, CourseService};

use crate::common::{RecordingViews, test_db};

fn caller(id: &str) -> AuthUser {
    AuthUser::from_identity(id).unwrap()
}

#[test]
fn blank_identity_is_unauthenticated() {
    assert!(matches!(
        AuthUser::from_identity("  "),
        Err(AppError::TokenMissing)
    ));
}

#[tokio::test]
async fn successful_mutations_invalidate_course_view() {
    let db = test_db().await;
    let views = RecordingViews::default();
    let alice = caller("user_alice");

    let course = CourseService::new(&db, &views)
        .create_course(&alice, "Intro")
        .await
        .unwrap();
    let path = course_view_path(course.id);
    assert!(views.invalidated().is_empty());

    CourseService::new(&db, &views)
        .update_field(&alice, course.id, CourseField::Price(10.0))
        .await
        .unwrap();
    let chapters = ChapterService::new(&db, &views);
    let first = chapters
        .create_chapter(&alice, course.id, "One")
        .await
        .unwrap();
    chapters
        .reorder_chapters(
            &alice,
            course.id,
            &[ChapterPosition {
                id: first.id,
                position: 0,
            }],
        )
        .await
        .unwrap();
    let attachments = AttachmentService::new(&db, &views);
    let attachment = attachments
        .create_attachment(&alice, course.id, "https://utfs.io/f/a.pdf")
        .await
        .unwrap();
    attachments
        .delete_attachment(&alice, course.id, attachment.id)
        .await
        .unwrap();

    assert_eq!(views.invalidated(), vec![path; 5]);
}

#[tokio::test]
async fn failed_mutations_do_not_invalidate() {
    let db = test_db().await;
    let views = RecordingViews::default();
    let alice = caller("user_alice");
    let mallory = caller("user_mallory");

    let course = CourseService::new(&db, &views)
        .create_course(&alice, "Intro")
        .await
        .unwrap();

    let err = CourseService::new(&db, &views)
        .update_field(&mallory, course.id, CourseField::Title("X".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let err = CourseService::new(&db, &views)
        .update_field(&alice, course.id, CourseField::Price(-5.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = ChapterService::new(&db, &views)
        .create_chapter(&mallory, course.id, "Injected")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let err = AttachmentService::new(&db, &views)
        .delete_attachment(&alice, course.id, Uuid::now_v7())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert!(views.invalidated().is_empty());
}

#[tokio::test]
async fn validation_runs_before_ownership() {
    let db = test_db().await;
    let views = RecordingViews::default();
    let mallory = caller("user_mallory");

    let err = CourseService::new(&db, &views)
        .update_field(&mallory, Uuid::now_v7(), CourseField::Title(String::new()))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn cached_view_is_served_until_invalidated() {
    let db = test_db().await;
    let views = ViewCache::new(8);
    let alice = caller("user_alice");
    let courses = CourseService::new(&db, &views);

    let course = courses.create_course(&alice, "Intro").await.unwrap();
    let first = courses.get_course(&alice, course.id).await.unwrap();
    assert_eq!(views.len(), 1);

    let cached = views.get(&course_view_path(course.id)).unwrap();
    assert_eq!(cached.course.title, first.course.title);

    // Cached views still go through the ownership check.
    let err = courses
        .get_course(&caller("user_mallory"), course.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    courses
        .update_field(&alice, course.id, CourseField::Title("Renamed".into()))
        .await
        .unwrap();
    assert!(views.is_empty());
    let fresh = courses.get_course(&alice, course.id).await.unwrap();
    assert_eq!(fresh.course.title, "Renamed");
}

// The test pool has a single connection and SQLite has no `FOR UPDATE`, so
// this checks that each append reads `max(position)` and inserts inside one
// transaction. The course row lock only takes effect on Postgres.
#[tokio::test]
async fn concurrent_appends_in_one_transaction_each_get_distinct_positions() {
    let db = test_db().await;
    let views = Arc::new(ViewCache::new(0));
    let alice = caller("user_alice");

    let course = CourseService::new(&db, views.as_ref())
        .create_course(&alice, "Intro")
        .await
        .unwrap();

    let course_id = course.id;
    let mut tasks = JoinSet::new();
    for i in 0..5 {
        let db = db.clone();
        let views = views.clone();
        let alice = alice.clone();
        tasks.spawn(async move {
            ChapterService::new(&db, views.as_ref())
                .create_chapter(&alice, course_id, &format!("Chapter {i}"))
                .await
                .map(|c| c.position)
        });
    }

    let mut positions = HashSet::new();
    while let Some(result) = tasks.join_next().await {
        positions.insert(result.unwrap().unwrap());
    }
    assert_eq!(positions, (1..=5).collect::<HashSet<i32>>());
}

async fn stored_positions(db: &DatabaseConnection, course_id: Uuid) -> Vec<(Uuid, i32)> {
    chapter::Entity::find()
        .filter(chapter::Column::CourseId.eq(course_id))
        .order_by_asc(chapter::Column::Position)
        .all(db)
        .await
        .unwrap()
        .into_iter()
        .map(|c| (c.id, c.position))
        .collect()
}

#[tokio::test]
async fn reorder_with_unknown_chapter_writes_nothing() {
    let db = test_db().await;
    let views = RecordingViews::default();
    let alice = caller("user_alice");

    let course = CourseService::new(&db, &views)
        .create_course(&alice, "Intro")
        .await
        .unwrap();
    let chapters = ChapterService::new(&db, &views);
    let a = chapters.create_chapter(&alice, course.id, "A").await.unwrap();
    let b = chapters.create_chapter(&alice, course.id, "B").await.unwrap();

    // Valid first entry, unknown second: nothing may be written.
    let err = chapters
        .reorder_chapters(
            &alice,
            course.id,
            &[
                ChapterPosition {
                    id: b.id,
                    position: 0,
                },
                ChapterPosition {
                    id: Uuid::now_v7(),
                    position: 1,
                },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(
        stored_positions(&db, course.id).await,
        vec![(a.id, 1), (b.id, 2)]
    );
}

#[tokio::test]
async fn reorder_failing_after_first_write_rolls_back() {
    let db = test_db().await;
    let views = RecordingViews::default();
    let alice = caller("user_alice");

    let course = CourseService::new(&db, &views)
        .create_course(&alice, "Intro")
        .await
        .unwrap();
    let chapters = ChapterService::new(&db, &views);
    let a = chapters.create_chapter(&alice, course.id, "A").await.unwrap();
    let frozen = chapters
        .create_chapter(&alice, course.id, "Frozen")
        .await
        .unwrap();

    // Any position write to "Frozen" fails in the store.
    db.execute_raw(Statement::from_string(
        DbBackend::Sqlite,
        "CREATE TRIGGER chapter_frozen_position BEFORE UPDATE OF position ON chapter \
         WHEN OLD.title = 'Frozen' BEGIN SELECT RAISE(ABORT, 'position is frozen'); END"
            .to_string(),
    ))
    .await
    .unwrap();
    let before = views.invalidated().len();

    // "A" is written first, then the write to "Frozen" fails.
    let err = chapters
        .reorder_chapters(
            &alice,
            course.id,
            &[
                ChapterPosition {
                    id: a.id,
                    position: 1,
                },
                ChapterPosition {
                    id: frozen.id,
                    position: 0,
                },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));

    assert_eq!(
        stored_positions(&db, course.id).await,
        vec![(a.id, 1), (frozen.id, 2)]
    );
    assert_eq!(views.invalidated().len(), before);
}

/// Wraps a `ViewCache` and renames the course just before the first view is
/// stored, the way an edit from another tab lands mid-read.
struct RenameBeforePut {
    inner: Arc<ViewCache>,
    db: DatabaseConnection,
    owner: AuthUser,
    course_id: Uuid,
    renamed: AtomicBool,
}

impl ViewStore for RenameBeforePut {
    fn get(&self, path: &str) -> Option<CourseDetailResponse> {
        self.inner.get(path)
    }

    fn generation(&self, path: &str) -> u64 {
        self.inner.generation(path)
    }

    fn put(&self, path: String, view: CourseDetailResponse, generation: u64) {
        if !self.renamed.swap(true, Ordering::SeqCst) {
            tokio::task::block_in_place(|| {
                tokio::runtime::Handle::current().block_on(
                    CourseService::new(&self.db, self.inner.as_ref()).update_field(
                        &self.owner,
                        self.course_id,
                        CourseField::Title("Renamed".into()),
                    ),
                )
            })
            .unwrap();
        }
        self.inner.put(path, view, generation);
    }

    fn invalidate_path(&self, path: &str) {
        self.inner.invalidate_path(path);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn view_read_before_concurrent_edit_is_not_cached() {
    let db = test_db().await;
    let cache = Arc::new(ViewCache::new(8));
    let alice = caller("user_alice");

    let course = CourseService::new(&db, cache.as_ref())
        .create_course(&alice, "Intro")
        .await
        .unwrap();

    let racing = RenameBeforePut {
        inner: cache.clone(),
        db: db.clone(),
        owner: alice.clone(),
        course_id: course.id,
        renamed: AtomicBool::new(false),
    };
    let first = CourseService::new(&db, &racing)
        .get_course(&alice, course.id)
        .await
        .unwrap();
    assert_eq!(first.course.title, "Intro");
    assert!(cache.is_empty());

    let served = CourseService::new(&db, cache.as_ref())
        .get_course(&alice, course.id)
        .await
        .unwrap();
    assert_eq!(served.course.title, "Renamed");
}
