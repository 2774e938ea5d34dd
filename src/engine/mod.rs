pub mod debounce;
pub mod engine;
pub mod mapping;
