//! Request extractors shared by the handlers.

mod actor;
mod path;

pub use actor::{Actor, USER_ID_HEADER};
pub use path::PathIds;
