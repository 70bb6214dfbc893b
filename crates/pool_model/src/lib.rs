//! Pure accounting model for the tranche credit pool
//! No I/O, no unwrap/panic, all functions total

pub mod math;
pub mod conversion;
pub mod withdraw;
pub mod snapshot;
pub mod helpers;

// Re-export commonly used types
pub use conversion::*;
pub use withdraw::*;
pub use snapshot::*;
pub use helpers::*;
