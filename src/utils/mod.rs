//! Supporting utilities
//!
//! - [`process`] - running external tools (`gunzip`, `powershell`)
//! - [`progress`] - info lines and spinners

pub mod process;
pub mod progress;
