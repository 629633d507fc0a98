use super::{Filter, Statement};

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// Returned columns, in order
    pub columns: Vec<String>,

    /// Source table
    pub table: String,

    /// Optional `WHERE` clause
    pub filter: Option<Filter>,
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Self::Select(value)
    }
}
