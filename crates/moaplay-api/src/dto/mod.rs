//! Data transfer objects for the HTTP layer.

pub mod response;
