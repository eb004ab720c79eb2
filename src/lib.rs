
pub mod bits;
pub mod branch;
pub mod error;
pub mod history;
pub mod predictor;
pub mod trace;

pub use bits::*;
pub use branch::*;
pub use error::*;
pub use history::*;
pub use predictor::*;
pub use trace::*;

