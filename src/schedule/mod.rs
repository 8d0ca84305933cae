pub mod store;
pub mod types;

pub use store::AssignmentStore;
pub use types::{Assignment, Role, Show, ShowKey, Venue, MAX_DOOR};
