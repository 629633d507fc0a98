use super::{Flavor, Formatter, Params, ToSql};

use sqlchan_core::schema::db;

impl ToSql for &db::Type {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        use std::fmt::Write;

        let flavor = f.serializer.flavor;
        let dst = &mut *f.dst;

        // Writing into a `String` cannot fail.
        let _ = match (self, flavor) {
            (db::Type::Integer(1), Flavor::Mysql) => write!(dst, "TINYINT"),
            (db::Type::Integer(1 | 2), _) => write!(dst, "SMALLINT"),
            (db::Type::Integer(3 | 4), _) => write!(dst, "INTEGER"),
            (db::Type::Integer(_), _) => write!(dst, "BIGINT"),
            (db::Type::UnsignedInteger(1), _) => write!(dst, "TINYINT UNSIGNED"),
            (db::Type::UnsignedInteger(2), _) => write!(dst, "SMALLINT UNSIGNED"),
            (db::Type::UnsignedInteger(3 | 4), _) => write!(dst, "INT UNSIGNED"),
            (db::Type::UnsignedInteger(_), _) => write!(dst, "BIGINT UNSIGNED"),
            (db::Type::Double, Flavor::Sqlite) => write!(dst, "REAL"),
            (db::Type::Double, Flavor::Postgresql) => write!(dst, "DOUBLE PRECISION"),
            (db::Type::Double, Flavor::Mysql) => write!(dst, "DOUBLE"),
            (db::Type::Text, _) => write!(dst, "TEXT"),
            (db::Type::VarChar(size), _) => write!(dst, "VARCHAR({size})"),
            (db::Type::Numeric(None), Flavor::Mysql) => write!(dst, "DECIMAL(65, 30)"),
            (db::Type::Numeric(None), _) => write!(dst, "NUMERIC"),
            (db::Type::Numeric(Some((p, s))), Flavor::Mysql) => write!(dst, "DECIMAL({p}, {s})"),
            (db::Type::Numeric(Some((p, s))), _) => write!(dst, "NUMERIC({p}, {s})"),
            (db::Type::Blob | db::Type::Binary(_), Flavor::Postgresql) => write!(dst, "BYTEA"),
            (db::Type::Binary(size), Flavor::Mysql) => write!(dst, "VARBINARY({size})"),
            (db::Type::Blob | db::Type::Binary(_), _) => write!(dst, "BLOB"),
            // SQLite has no datetime storage class; ISO-8601 text sorts
            // chronologically.
            (db::Type::Timestamp(_) | db::Type::Date, Flavor::Sqlite) => write!(dst, "TEXT"),
            (db::Type::Timestamp(p), Flavor::Postgresql) => write!(dst, "TIMESTAMP({p})"),
            (db::Type::Timestamp(p), Flavor::Mysql) => write!(dst, "DATETIME({p})"),
            (db::Type::Date, _) => write!(dst, "DATE"),
            (db::Type::Custom(ty), _) => write!(dst, "{ty}"),
        };
    }
}
