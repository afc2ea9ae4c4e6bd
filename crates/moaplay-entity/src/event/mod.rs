//! Festival event entities.

pub mod model;

pub use model::Event;
