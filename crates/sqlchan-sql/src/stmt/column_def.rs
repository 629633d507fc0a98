use sqlchan_core::{
    driver::Capability,
    schema::{db, Field},
    Result, SEQ_COLUMN,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: db::Type,
    pub nullable: bool,
}

impl ColumnDef {
    pub fn from_field(field: &Field, capability: &Capability) -> Result<ColumnDef> {
        let ty = db::Type::from_field(&field.ty, field.column_type(), capability)?;

        Ok(ColumnDef {
            name: field.column_name().to_string(),
            ty,
            nullable: field.optional,
        })
    }

    /// The sequence number column.
    pub fn seq() -> ColumnDef {
        ColumnDef {
            name: SEQ_COLUMN.to_string(),
            ty: db::Type::seq(),
            nullable: false,
        }
    }
}
