#![forbid(unsafe_code)]

//! Task partition and ordering engine: the logical operations behind the
//! shared todo board. Every operation runs as one store transaction, so the
//! capacity check, neighbor scan, key computation and final write are atomic
//! per owner. Presentation (HTTP, CLI) and identity live outside this crate;
//! callers hand in an authenticated owner id and unix-millisecond timestamps.

mod board;
mod config;
mod error;
mod requests;
mod service;

pub use board::{TaskBoard, TaskView};
pub use config::{AnyStore, BackendKind, EngineConfig};
pub use error::EngineError;
pub use requests::*;
pub use service::Tasks;
