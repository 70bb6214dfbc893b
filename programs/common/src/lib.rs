pub mod types;
pub mod error;
pub mod settings;
pub mod collaborators;
pub mod memory;


pub use types::*;
pub use error::*;
pub use settings::*;
pub use collaborators::*;

pub use pool_model::{LifecycleState, LoanState, LoanTerms};
