pub mod error;
pub mod models;
pub mod validation;
pub mod session;
pub mod ledger;

pub use error::{Error, ErrorCode, Result, VoteConflict};
pub use models::*;
pub use validation::*;
pub use session::*;
pub use ledger::Ledger;
