pub mod geometry;
pub mod host;
pub mod page_model;
pub mod simulated;
