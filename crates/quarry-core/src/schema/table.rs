use super::{Column, FieldShape, Shape, TableMetadata};
use crate::{stmt::Value, Error, Result};

use indexmap::IndexMap;

/// Joins primary key values into a cache key.
///
/// Components are not escaped, so `("a-b", "c")` and `("a", "b-c")` share a
/// key.
pub const KEY_SEPARATOR: &str = "-";

/// Column, primary key and auto-increment layout of one table as seen
/// through one record type.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// The table name
    pub table: String,

    /// Name of the record type the schema was built from
    pub record: &'static str,

    /// Mapped columns, in record declaration order
    pub columns: IndexMap<String, Column>,

    /// Primary key column names, in key order
    pub primary_key: Vec<String>,

    /// Column filled in by the backend on insert
    pub auto_increment: Option<String>,
}

impl Schema {
    /// Flattens `shape` into columns and resolves keys from `metadata`.
    ///
    /// Tagged scalar fields become columns. Untagged struct fields are
    /// flattened in place with an extended field path. Other untagged fields
    /// are ignored. The first field to claim a column name keeps it.
    pub fn build(
        table: impl Into<String>,
        record: &'static str,
        shape: &Shape,
        metadata: &TableMetadata,
    ) -> Result<Schema> {
        let table = table.into();

        let Some(root) = shape.as_struct() else {
            return Err(Error::invalid_schema(format!(
                "record type `{record}` is not a struct"
            )));
        };

        let mut columns = IndexMap::new();
        flatten(&root.fields, &mut vec![], "", &mut columns)?;

        let keys = metadata.key_info();

        let mut primary_key = Vec::with_capacity(keys.primary_key.len());
        for name in &keys.primary_key {
            let Some(column) = find_column(&mut columns, name) else {
                return Err(Error::invalid_schema(format!(
                    "primary key column `{name}` of table `{table}` is not mapped by `{record}`"
                )));
            };
            column.primary_key = true;
            primary_key.push(column.name.clone());
        }

        let auto_increment = match &keys.auto_increment {
            Some(name) => find_column(&mut columns, name).map(|column| {
                column.auto_increment = true;
                column.name.clone()
            }),
            None => None,
        };

        Ok(Schema {
            table,
            record,
            columns,
            primary_key,
            auto_increment,
        })
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.keys().map(String::as_str)
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.primary_key.iter().filter_map(|name| self.columns.get(name))
    }

    pub fn is_primary_key(&self, name: &str) -> bool {
        self.primary_key.iter().any(|pk| pk == name)
    }

    /// Fails unless the table has a primary key.
    pub fn require_primary_key(&self) -> Result<()> {
        if self.primary_key.is_empty() {
            return Err(Error::invalid_statement(format!(
                "table `{}` has no primary key",
                self.table
            )));
        }
        Ok(())
    }

    /// Columns written by an insert: every column except the auto-increment
    /// one.
    pub fn insert_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.values().filter(|column| !column.auto_increment)
    }

    /// Columns written by a full-row update: every non-key column.
    pub fn update_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.values().filter(|column| !column.primary_key)
    }

    /// Joins primary key values into a cache key.
    pub fn cache_key(&self, values: &[Value]) -> Result<String> {
        self.require_primary_key()?;

        if values.len() != self.primary_key.len() {
            return Err(Error::invalid_statement(format!(
                "table `{}` has {} primary key column(s), got {} value(s)",
                self.table,
                self.primary_key.len(),
                values.len()
            )));
        }

        join_key(values)
    }
}

/// Joins primary key values into a cache key without checking them against
/// a schema.
pub fn join_key(values: &[Value]) -> Result<String> {
    let mut parts = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        match value.to_text() {
            Some(text) => parts.push(text),
            None => {
                return Err(Error::invalid_statement(format!(
                    "primary key value #{index} is null"
                )))
            }
        }
    }
    Ok(parts.join(KEY_SEPARATOR))
}

fn flatten(
    fields: &[FieldShape],
    path: &mut Vec<usize>,
    prefix: &str,
    columns: &mut IndexMap<String, Column>,
) -> Result<()> {
    for (index, field) in fields.iter().enumerate() {
        path.push(index);
        let field_name = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{prefix}.{}", field.name)
        };

        match (field.column, &field.shape) {
            (Some(name), Shape::Scalar { ty, nullable }) => {
                if !columns.contains_key(name) {
                    columns.insert(
                        name.to_string(),
                        Column {
                            name: name.to_string(),
                            field: field_name,
                            path: path.clone(),
                            ty: *ty,
                            nullable: *nullable,
                            primary_key: false,
                            auto_increment: false,
                        },
                    );
                }
            }
            (Some(name), Shape::Struct(_)) => {
                return Err(Error::invalid_schema(format!(
                    "field `{field_name}` is a nested record and cannot map to column `{name}`"
                )));
            }
            (None, Shape::Struct(nested)) => {
                flatten(&nested.fields, path, &field_name, columns)?;
            }
            (None, Shape::Scalar { .. }) => {}
        }

        path.pop();
    }
    Ok(())
}

/// Finds a column by exact name, falling back to a case-insensitive match
/// since some backends fold unquoted identifiers.
fn find_column<'a>(columns: &'a mut IndexMap<String, Column>, name: &str) -> Option<&'a mut Column> {
    let index = columns
        .get_index_of(name)
        .or_else(|| columns.keys().position(|key| key.eq_ignore_ascii_case(name)))?;
    columns.get_index_mut(index).map(|(_, column)| column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{schema::StructShape, stmt::Type};
    use pretty_assertions::assert_eq;

    fn field(name: &'static str, column: Option<&'static str>, shape: Shape) -> FieldShape {
        FieldShape { name, column, shape }
    }

    fn user_shape() -> Shape {
        Shape::Struct(StructShape {
            name: "User",
            fields: vec![
                field("uid", Some("uid"), Shape::scalar(Type::I64)),
                field("gid", Some("gid"), Shape::scalar(Type::I64)),
                field("name", Some("name"), Shape::scalar(Type::String)),
                field("scratch", None, Shape::scalar(Type::String)),
                field(
                    "profile",
                    None,
                    Shape::Struct(StructShape {
                        name: "Profile",
                        fields: vec![
                            field("age", Some("age"), Shape::scalar(Type::I32).nullable()),
                            field("dup", Some("gid"), Shape::scalar(Type::I64)),
                        ],
                    }),
                ),
            ],
        })
    }

    fn create(sql: &str) -> TableMetadata {
        TableMetadata::CreateStatement(sql.to_string())
    }

    #[test]
    fn flattens_embedded_fields() {
        let schema = Schema::build(
            "user",
            "User",
            &user_shape(),
            &create("CREATE TABLE user (uid INTEGER PRIMARY KEY AUTOINCREMENT, gid INT, name TEXT, age INT)"),
        )
        .unwrap();

        assert_eq!(
            schema.column_names().collect::<Vec<_>>(),
            ["uid", "gid", "name", "age"]
        );

        let age = schema.column("age").unwrap();
        assert_eq!(age.path, [4, 0]);
        assert_eq!(age.field, "profile.age");
        assert!(age.nullable);

        // the first field claiming `gid` wins
        assert_eq!(schema.column("gid").unwrap().path, [1]);

        assert_eq!(schema.primary_key, ["uid"]);
        assert_eq!(schema.auto_increment.as_deref(), Some("uid"));
        assert_eq!(
            schema.insert_columns().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            ["gid", "name", "age"]
        );
        assert_eq!(
            schema.update_columns().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            ["gid", "name", "age"]
        );
    }

    #[test]
    fn partition_key_metadata() {
        let schema = Schema::build(
            "user",
            "User",
            &user_shape(),
            &TableMetadata::PartitionKey(vec!["uid".into(), "gid".into()]),
        )
        .unwrap();
        assert_eq!(schema.primary_key, ["uid", "gid"]);
        assert_eq!(schema.auto_increment, None);
        assert_eq!(
            schema.cache_key(&[Value::I64(1), Value::I64(22)]).unwrap(),
            "1-22"
        );
    }

    #[test]
    fn non_struct_record_is_rejected() {
        let err = Schema::build("user", "i64", &Shape::scalar(Type::I64), &create("CREATE TABLE user (uid INT)"))
            .unwrap_err();
        assert!(err.is_invalid_schema());
    }

    #[test]
    fn tagged_struct_field_is_rejected() {
        let shape = Shape::Struct(StructShape {
            name: "Bad",
            fields: vec![field(
                "inner",
                Some("inner"),
                Shape::Struct(StructShape {
                    name: "Inner",
                    fields: vec![],
                }),
            )],
        });
        let err = Schema::build("bad", "Bad", &shape, &create("CREATE TABLE bad (inner INT)")).unwrap_err();
        assert!(err.is_invalid_schema());
    }

    #[test]
    fn unmapped_primary_key_is_rejected() {
        let err = Schema::build(
            "user",
            "User",
            &user_shape(),
            &create("CREATE TABLE user (id INT PRIMARY KEY, uid INT)"),
        )
        .unwrap_err();
        assert!(err.is_invalid_schema());
    }

    #[test]
    fn cache_key_checks_arity() {
        let schema = Schema::build(
            "user",
            "User",
            &user_shape(),
            &create("CREATE TABLE user (uid INT PRIMARY KEY)"),
        )
        .unwrap();

        assert_eq!(schema.cache_key(&[Value::from("7")]).unwrap(), "7");
        assert!(schema
            .cache_key(&[Value::I64(1), Value::I64(2)])
            .unwrap_err()
            .is_invalid_statement());
        assert!(schema.cache_key(&[Value::Null]).unwrap_err().is_invalid_statement());
    }

    #[test]
    fn keyless_table() {
        let schema = Schema::build("user", "User", &user_shape(), &create("CREATE TABLE user (uid INT)")).unwrap();
        assert!(schema.primary_key.is_empty());
        assert!(schema.require_primary_key().is_err());
    }
}
