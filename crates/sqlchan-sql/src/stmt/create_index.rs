use super::Statement;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    /// Name of the index
    pub name: String,

    /// Which table to index
    pub on: String,

    /// The columns to index
    pub columns: Vec<String>,

    /// When true, the index is unique
    pub unique: bool,
}

impl Statement {
    /// Single column index named `_tll_<table>_<column>`.
    pub fn create_index(table: &str, column: &str, unique: bool) -> Statement {
        CreateIndex {
            name: format!("_tll_{table}_{column}"),
            on: table.to_string(),
            columns: vec![column.to_string()],
            unique,
        }
        .into()
    }
}

impl From<CreateIndex> for Statement {
    fn from(value: CreateIndex) -> Self {
        Self::CreateIndex(value)
    }
}
