// Library root: the two binaries (src/main.rs, src/bin/gaou-api.rs) and the
// integration tests build on it.

mod core;

pub mod bootstrap;
pub mod extract;
pub mod llm;
pub mod subsystems;

pub use crate::core::{config, error};
