pub mod classify;
pub mod model;
