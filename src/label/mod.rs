pub mod allocator;
pub mod alphabet;
