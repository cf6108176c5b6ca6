pub mod athlete;
pub mod grade;
pub mod stats;

pub use athlete::*;
pub use grade::*;
pub use stats::*;
