use super::{Comma, Delimited, Formatter, Ident, Params, ToSql};

use crate::stmt::{self, Statement};

impl ToSql for &Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Statement::CreateIndex(stmt) => stmt.to_sql(f),
            Statement::CreateTable(stmt) => stmt.to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
            Statement::Select(stmt) => stmt.to_sql(f),
            Statement::CallFunction(call) => {
                let name = Ident(&call.name);
                let args = Comma(&call.args);
                fmt!(f, "SELECT * FROM " name "(" args ")");
            }
            Statement::CallProcedure(call) => {
                let name = Ident(&call.name);
                let args = Comma(&call.args);
                fmt!(f, "CALL " name "(" args ")");
            }
        }
    }
}

struct ColumnsWithConstraints<'a>(&'a stmt::CreateTable);

impl ToSql for ColumnsWithConstraints<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        for (index, column) in self.0.columns.iter().enumerate() {
            fmt!(f, "\n    " column);
            if index < self.0.columns.len() - 1 {
                fmt!(f, ",");
            }
        }

        if self.0.primary_key.is_empty() {
            fmt!(f, "\n");
        } else {
            let pk = Comma(self.0.primary_key.iter().map(Ident));
            fmt!(f, ",\n    PRIMARY KEY (" pk ")\n");
        }
    }
}

impl ToSql for &stmt::CreateTable {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let name = Ident(&self.name);
        let if_not_exists = self.if_not_exists.then_some("IF NOT EXISTS ");
        let columns = ColumnsWithConstraints(self);

        fmt!(f, "CREATE TABLE " if_not_exists name " (" columns ")");
    }
}

impl ToSql for &stmt::ColumnDef {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let name = Ident(&self.name);
        let ty = &self.ty;
        let not_null = (!self.nullable).then_some(" NOT NULL");

        fmt!(f, name " " ty not_null);
    }
}

impl ToSql for &stmt::CreateIndex {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let index_name = Ident(&self.name);
        let table_name = Ident(&self.on);
        let columns = Comma(self.columns.iter().map(Ident));
        let unique = if self.unique { "UNIQUE " } else { "" };

        fmt!(
            f, "CREATE " unique "INDEX IF NOT EXISTS " index_name " ON " table_name " (" columns ")"
        );
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let table_name = Ident(&self.table);
        let columns = Comma(self.columns.iter().map(Ident));
        let values = Comma(&self.values);

        fmt!(f, "INSERT INTO " table_name " (" columns ") VALUES (" values ")");
    }
}

impl ToSql for &stmt::Select {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let columns = Comma(self.columns.iter().map(Ident));
        let table_name = Ident(&self.table);

        fmt!(f, "SELECT " columns " FROM " table_name);

        if let Some(filter) = self.filter.as_ref().filter(|filter| !filter.is_empty()) {
            fmt!(f, " WHERE " filter);
        }
    }
}

impl ToSql for &stmt::Filter {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Delimited(&self.conditions, " AND "));
    }
}

impl ToSql for &stmt::Condition {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match &self.unless_absent {
            Some(present) => fmt!(f, "(" Comparison(self) " OR " present " = 0)"),
            None => fmt!(f, Comparison(self)),
        }
    }
}

struct Comparison<'a>(&'a stmt::Condition);

impl ToSql for Comparison<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let column = Ident(&self.0.column);
        let op = self.0.op.as_sql();
        let param = &self.0.param;

        if self.0.numeric {
            fmt!(f, "CAST(" column " AS NUMERIC) " op " CAST(" param " AS NUMERIC)");
        } else {
            fmt!(f, column " " op " " param);
        }
    }
}
