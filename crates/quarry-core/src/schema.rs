mod column;
pub use column::Column;

mod ddl;
pub use ddl::KeyInfo;

mod metadata;
pub use metadata::TableMetadata;

mod table;
pub use table::{join_key, Schema, KEY_SEPARATOR};

mod shape;
pub use shape::{FieldShape, Shape, StructShape};
