use crate::stmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// The name of the column in the database.
    pub name: String,

    /// Dotted name of the record field, through any embedded records.
    pub field: String,

    /// Field indices from the record root to the leaf field.
    pub path: Vec<usize>,

    /// The declared type of the leaf field.
    pub ty: stmt::Type,

    /// Whether or not the field accepts null
    pub nullable: bool,

    /// True if the column is part of the table's primary key
    pub primary_key: bool,

    /// True if the backend generates the column's value on insert
    pub auto_increment: bool,
}
