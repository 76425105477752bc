#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Mysql,
    Cql,
}

#[derive(Debug)]
pub struct Capability {
    pub dialect: Dialect,

    /// Character used to quote identifiers, if the dialect quotes them.
    pub identifier_quote: Option<char>,

    /// `LIMIT offset,count` is accepted.
    pub limit_offset_pair: bool,

    /// `LIMIT count OFFSET offset` is accepted.
    pub limit_offset_keyword: bool,

    /// `UPDATE ... LIMIT n` is accepted.
    pub update_limit: bool,

    /// `DELETE ... LIMIT n` is accepted.
    pub delete_limit: bool,

    /// Updates and deletes may be filtered on arbitrary columns. When false,
    /// writes must address rows by full primary key.
    pub filtered_writes: bool,

    /// Scans filtered on non-key columns need `ALLOW FILTERING`.
    pub allow_filtering: bool,

    /// Temporal values can be bound directly. When false they are sent as
    /// canonical text.
    pub native_temporal: bool,

    /// `REPLACE INTO` is available.
    pub native_replace: bool,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        dialect: Dialect::Sqlite,
        identifier_quote: Some('"'),
        limit_offset_pair: false,
        limit_offset_keyword: true,
        update_limit: false,
        delete_limit: false,
        filtered_writes: true,
        allow_filtering: false,
        native_temporal: false,
        native_replace: true,
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        dialect: Dialect::Mysql,
        identifier_quote: Some('`'),
        limit_offset_pair: true,
        limit_offset_keyword: false,
        update_limit: true,
        delete_limit: true,
        ..Self::SQLITE
    };

    /// Cassandra / ScyllaDB capabilities
    pub const CQL: Self = Self {
        dialect: Dialect::Cql,
        identifier_quote: None,
        limit_offset_pair: false,
        limit_offset_keyword: false,
        update_limit: false,
        delete_limit: false,
        filtered_writes: false,
        allow_filtering: true,
        native_temporal: true,
        native_replace: false,
    };

    pub fn is_cql(&self) -> bool {
        self.dialect == Dialect::Cql
    }
}
