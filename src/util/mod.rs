pub mod datetime;
pub mod split;
pub mod telemetry;

pub use datetime::*;
pub use split::*;
pub use telemetry::*;
