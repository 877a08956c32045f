#![forbid(unsafe_code)]

pub mod generate;
pub mod model;
pub mod time;

pub use time::Clock;
