pub mod keys;
pub mod router;
