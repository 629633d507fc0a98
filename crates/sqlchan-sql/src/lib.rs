pub mod options;
pub use options::{IndexKind, MessageOptions, Template};

pub mod query;
pub use query::{Operator, Predicate, PredicateValue};

pub mod serializer;
pub use serializer::{Params, Placeholder, Serializer};

pub mod stmt;
pub use stmt::Statement;

pub mod template;
pub use template::{CompiledStatement, Compiler, Output, Sql};
