pub mod vault;
pub mod shares;
pub mod withdraw_controller;
pub mod loans;
pub mod first_loss;
pub mod fees;
pub mod pool;
pub mod model_bridge;

pub use vault::*;
pub use shares::*;
pub use withdraw_controller::*;
pub use loans::*;
pub use first_loss::*;
pub use fees::*;
pub use pool::*;
pub use model_bridge::*;
