pub mod types;
pub mod filter;
pub mod filter_order;
pub mod error;

pub use types::*;
pub use filter_order::FilterOrder;
pub use error::FilterError;
