pub mod questions;

pub use questions::{QuestionError, QuestionSet};
