pub mod data;

pub mod driver;
pub use driver::Driver;

mod error;
pub use error::{Error, IntoError};

pub mod schema;
pub use schema::Schema;

pub mod stmt;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Name of the sequence number column added to every table.
pub const SEQ_COLUMN: &str = "_tll_seq";
