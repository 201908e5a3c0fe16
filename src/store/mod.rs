pub mod error;
pub mod state;
pub mod validation;

pub use error::StoreError;
pub use state::{Comparison, Direction};
pub use validation::validate_parts;
