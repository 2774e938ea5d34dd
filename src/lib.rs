pub mod cli;
pub mod engine;
pub mod error;
pub mod input;
pub mod label;
pub mod messaging;
pub mod navigation;
pub mod overlay;
pub mod page;
pub mod scan;
pub mod scenario;
pub mod settings;
pub mod trace;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use engine::engine::{KeyOutcome, LabelEngine, SessionState};
pub use error::SurfError;
pub use page::host::PageHost;
pub use settings::settings::Settings;
