// Core types and session bookkeeping for the Notion bridge

pub mod session;
pub mod types;

pub use session::SessionRegistry;
pub use types::*;
