//! Script files that drive batch runs.

mod loader;

pub use loader::{WorkItem, load_work_items};
