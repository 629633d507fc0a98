#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Function or procedure name
    pub name: String,

    /// Positional arguments
    pub args: Vec<super::Param>,
}
