pub mod exec;
pub mod period;
pub mod render;

pub use exec::{exec, fetch_period};
pub use period::{resolve, Period};
pub use render::{group, statistics};
