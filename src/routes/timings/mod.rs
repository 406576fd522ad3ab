mod handler;
pub mod model;

pub use handler::{by_city, by_coords, calendar};
