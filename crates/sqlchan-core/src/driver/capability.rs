use crate::schema::db;

#[derive(Debug)]
pub struct Capability {
    /// SQL dialect used when rendering statements.
    pub dialect: Dialect,

    /// Column storage types supported by the database
    pub storage_types: StorageTypes,

    /// Supports table-valued functions in `SELECT * FROM f(...)`.
    pub functions: bool,

    /// Supports stored procedures through `CALL p(...)`.
    pub procedures: bool,
}

/// SQL dialect family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgresql,
    Mysql,
}

#[derive(Debug)]
pub struct StorageTypes {
    /// The default storage type for a string.
    pub default_string_type: db::Type,

    /// When `Some` the database supports varchar types with the specified upper
    /// limit.
    pub varchar: Option<u64>,

    /// Native unsigned integer columns.
    pub unsigned_integers: bool,

    /// Exact NUMERIC columns. Without them decimals are stored as text.
    pub decimal: bool,

    /// Maximum fractional seconds digits of a timestamp column.
    pub datetime_precision: u8,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        dialect: Dialect::Sqlite,
        storage_types: StorageTypes::SQLITE,
        functions: false,
        procedures: false,
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        dialect: Dialect::Postgresql,
        storage_types: StorageTypes::POSTGRESQL,
        functions: true,
        procedures: true,
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        dialect: Dialect::Mysql,
        storage_types: StorageTypes::MYSQL,
        functions: false,
        procedures: true,
    };
}

impl StorageTypes {
    /// SQLite storage types
    pub const SQLITE: StorageTypes = StorageTypes {
        default_string_type: db::Type::Text,

        // SQLite ignores the length in VARCHAR(N); the only limit is
        // SQLITE_MAX_LENGTH, 1 billion by default.
        varchar: Some(1_000_000_000),

        unsigned_integers: false,
        decimal: false,

        // Timestamps are stored as ISO-8601 text, any precision fits.
        datetime_precision: 9,
    };

    pub const POSTGRESQL: StorageTypes = StorageTypes {
        default_string_type: db::Type::Text,

        // The maximum n you can specify is 10 485 760 characters.
        varchar: Some(10_485_760),

        unsigned_integers: false,
        decimal: true,
        datetime_precision: 6,
    };

    pub const MYSQL: StorageTypes = StorageTypes {
        // Indexed TEXT needs a prefix length, keep strings indexable.
        default_string_type: db::Type::VarChar(191),

        varchar: Some(65_535),

        unsigned_integers: true,
        decimal: true,
        datetime_precision: 6,
    };
}
