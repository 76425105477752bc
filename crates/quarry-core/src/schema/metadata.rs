use super::KeyInfo;

/// Table metadata reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableMetadata {
    /// The `CREATE TABLE` statement of a row-store table.
    CreateStatement(String),

    /// Partition key columns of a column-family table, in order.
    PartitionKey(Vec<String>),
}

impl TableMetadata {
    /// Extracts the primary key and auto-increment column.
    pub fn key_info(&self) -> KeyInfo {
        match self {
            TableMetadata::CreateStatement(sql) => KeyInfo::from_create_statement(sql),
            TableMetadata::PartitionKey(columns) => KeyInfo {
                primary_key: columns.clone(),
                auto_increment: None,
            },
        }
    }
}
