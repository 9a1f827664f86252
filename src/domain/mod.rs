pub mod features;
pub mod pricing;

pub use features::*;
pub use pricing::*;
