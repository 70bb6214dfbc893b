pub mod state;
pub mod instructions;

pub mod entrypoint;

pub use state::*;
pub use entrypoint::*;
