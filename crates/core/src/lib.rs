pub mod agent;
mod error;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod protocol;
pub mod session;
pub mod tool;

pub use error::SessionError;
