/// The statement kind being compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Point lookup, always capped to one row.
    SelectOne,

    /// Scan honoring the query's limit.
    SelectAll,

    /// `SELECT` of the primary key columns only, used to resolve the rows a
    /// filtered write will touch.
    SelectKeys,

    /// Full-row update from a record.
    Update,

    /// Update from the query's accumulated assignments.
    UpdatePartial,

    Delete,
    Insert,
    InsertIgnore,
    Replace,
    Truncate,
}

impl Action {
    /// Returns `true` for actions that only read.
    pub fn is_read(self) -> bool {
        matches!(
            self,
            Action::SelectOne | Action::SelectAll | Action::SelectKeys
        )
    }
}
