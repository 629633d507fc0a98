use super::Param;
use crate::Operator;

/// Conditions joined with `AND`. Empty matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

/// `<column> <op> <param>`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: Operator,
    pub param: Param,

    /// Both sides are cast to `NUMERIC` before comparing. Set for decimals
    /// stored as text.
    pub numeric: bool,

    /// Presence flag of an optional field. The condition also holds when
    /// the flag is zero.
    pub unless_absent: Option<Param>,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: Operator, param: Param) -> Condition {
        Condition {
            column: column.into(),
            op,
            param,
            numeric: false,
            unless_absent: None,
        }
    }
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
