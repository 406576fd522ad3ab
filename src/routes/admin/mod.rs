mod handler;
pub mod model;

pub use handler::{health, invalidate_cache};
