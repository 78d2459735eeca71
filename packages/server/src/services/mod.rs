//! Course authoring operations.
//!
//! Every course-scoped operation starts with [`guard::authorize_course`];
//! successful mutations invalidate the course's cached view.

pub mod attachment;
pub mod chapter;
pub mod course;
pub mod guard;

pub use attachment::AttachmentService;
pub use chapter::ChapterService;
pub use course::{CourseService, list_categories};
