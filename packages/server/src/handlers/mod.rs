pub mod attachment;
pub mod category;
pub mod chapter;
pub mod course;
