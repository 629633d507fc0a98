use super::{Flavor, Formatter, ToSql};

use crate::stmt::Param;

/// Collects statement parameters in placeholder order.
pub trait Params {
    fn push(&mut self, param: &Param) -> Placeholder;
}

/// Positional placeholder, 1-based.
pub struct Placeholder(pub usize);

impl Params for Vec<Param> {
    fn push(&mut self, param: &Param) -> Placeholder {
        Vec::push(self, param.clone());
        Placeholder(self.len())
    }
}

/// Used for statements that carry no parameters, e.g. DDL.
impl Params for () {
    fn push(&mut self, _: &Param) -> Placeholder {
        Placeholder(0)
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use std::fmt::Write;

        // Writing into a `String` cannot fail.
        let _ = match f.serializer.flavor {
            Flavor::Mysql => write!(f.dst, "?"),
            Flavor::Postgresql => write!(f.dst, "${}", self.0),
            Flavor::Sqlite => write!(f.dst, "?{}", self.0),
        };
    }
}

impl ToSql for &Param {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let placeholder = f.params.push(self);
        fmt!(f, placeholder);
    }
}
