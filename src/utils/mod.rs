pub mod names;
pub mod pick_history;

pub use names::{parse_names, remove_name};
pub use pick_history::{PickHistory, PickRecord};
