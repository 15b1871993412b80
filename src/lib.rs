pub mod cache;
pub mod calendar;
pub mod chart;
pub mod cli;
pub mod error;
pub mod github;
pub mod lifetime;
pub mod metrics;
pub mod model;
pub mod productivity;
pub mod summary;
pub mod util;
pub mod yearly;
