mod bindings;
mod dom_host;

pub use bindings::NinjaSurfing;
pub use dom_host::DomHost;
