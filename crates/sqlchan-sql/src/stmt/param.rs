use sqlchan_core::stmt::Value;

/// Where the value bound to a placeholder comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// The sequence number of the posted message
    Seq,

    /// A field of the posted message, by index in the message's field list
    Field(usize),

    /// `1` when the optional field at this index is present, `0` otherwise
    Present(usize),

    /// A value known at compile time, e.g. a query predicate operand
    Value(Value),
}
