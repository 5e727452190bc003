pub mod account;
pub mod delivery;
pub mod quote;
pub mod transaction;
pub mod validation;

pub use account::*;
pub use delivery::*;
pub use quote::*;
pub use transaction::*;
pub use validation::*;
