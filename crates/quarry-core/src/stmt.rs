mod action;
pub use action::Action;

mod aggregate;
pub use aggregate::Aggregate;

mod assignment;
pub use assignment::{Assignment, AssignmentOp};

mod direction;
pub use direction::Direction;

mod limit;
pub use limit::Limit;

mod order_by;
pub use order_by::OrderBy;

mod query;
pub use query::{PrimaryKeyLookup, Query};

mod statement;
pub use statement::Statement;

mod ty;
pub use ty::Type;

mod value;
pub use value::Value;

mod value_coerce;
