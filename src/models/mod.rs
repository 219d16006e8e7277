pub mod course;

pub use course::{find_by_code, Course};
