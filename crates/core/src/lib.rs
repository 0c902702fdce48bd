#![forbid(unsafe_code)]

pub mod answer;
pub mod catalog;
pub mod model;
pub mod scheduler;
pub mod scramble;
pub mod time;

pub use time::Clock;
