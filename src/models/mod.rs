//! Data models for Toon API payloads

mod agreement;
mod consumption;
mod fault;
mod status;

pub use agreement::*;
pub use consumption::*;
pub use fault::*;
pub use status::*;
