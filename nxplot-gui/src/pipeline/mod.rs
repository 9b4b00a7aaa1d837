//! Background file access.

mod loader;

pub use loader::{list_groups_worker, load_group_worker};
