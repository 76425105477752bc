use crate::Field;

use std::fmt::Debug;

/// A record type that maps to a table. Implemented by `#[derive(Record)]`.
pub trait Record: Field + Default + Clone + Debug + Send + Sync + 'static {
    /// Name of the Rust type, used in schema errors.
    const NAME: &'static str;
}
