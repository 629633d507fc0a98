use super::{Param, Statement};

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// Table to insert into
    pub table: String,

    /// Column names
    pub columns: Vec<String>,

    /// One parameter per column
    pub values: Vec<Param>,
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}
