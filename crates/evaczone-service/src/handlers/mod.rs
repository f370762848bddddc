//! Request handlers, grouped by resource.

pub mod location;
pub mod zones;
