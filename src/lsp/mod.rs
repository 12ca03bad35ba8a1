pub mod backend;
pub mod features;

pub use backend::VbBackend;
