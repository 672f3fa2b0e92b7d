pub mod course;
pub mod history;
pub mod ordered;
