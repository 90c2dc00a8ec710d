#![forbid(unsafe_code)]

pub mod capacity;
pub mod ids;
pub mod model;
pub mod order;
pub mod week;
