/// VM execution states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VMState {
    Setup,
    Running,
    /// Program counter left ROM or reached a `(X) @X 0;JMP` loop
    Halted,
}
