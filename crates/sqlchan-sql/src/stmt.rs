mod call;
pub use call::Call;

mod column_def;
pub use column_def::ColumnDef;

mod create_index;
pub use create_index::CreateIndex;

mod create_table;
pub use create_table::CreateTable;

mod filter;
pub use filter::{Condition, Filter};

mod insert;
pub use insert::Insert;

mod param;
pub use param::Param;

mod select;
pub use select::Select;

#[derive(Debug, Clone)]
pub enum Statement {
    CreateIndex(CreateIndex),
    CreateTable(CreateTable),
    Insert(Insert),
    Select(Select),

    /// `SELECT * FROM f(...)`, a table-valued function call
    CallFunction(Call),

    /// `CALL p(...)`
    CallProcedure(Call),
}

impl Statement {
    /// Returns `true` if executing the statement yields rows.
    pub fn returns_rows(&self) -> bool {
        matches!(self, Statement::Select(_) | Statement::CallFunction(_))
    }
}
