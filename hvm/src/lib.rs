pub mod vm;
pub mod constants;

// Re-export commonly used types
pub use vm::{VM, VMState, VmError};
