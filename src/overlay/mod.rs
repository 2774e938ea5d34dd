pub mod collision;
pub mod renderer;
pub mod style;
