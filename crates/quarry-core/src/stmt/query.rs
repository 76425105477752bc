use super::{Assignment, Limit, OrderBy, Value};

/// Accumulated builder state, compiled into a statement per action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Projection. Empty means every column.
    pub fields: Vec<String>,

    /// Free-form predicate text. Joined with `AND`/`OR` as the builder
    /// accumulates clauses.
    pub predicate: String,

    /// Positional arguments for `predicate`, in order.
    pub predicate_args: Vec<Value>,

    /// Equality filters ANDed after the predicate.
    pub filter_eq: Vec<(String, Value)>,

    /// Exclusive primary-key lookup. When set, every other filter is
    /// ignored.
    pub primary_key: Option<PrimaryKeyLookup>,

    pub order_by: Vec<OrderBy>,

    pub limit: Option<Limit>,

    /// Partial-update assignments, in the order they were added.
    pub assignments: Vec<Assignment>,
}

/// Primary key values for a point lookup, with their cache key.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryKeyLookup {
    pub values: Vec<Value>,
    pub cache_key: String,
}

impl Query {
    /// Returns `true` when the query carries any filter.
    pub fn has_filter(&self) -> bool {
        self.primary_key.is_some() || !self.predicate.is_empty() || !self.filter_eq.is_empty()
    }

    /// ANDs `predicate` onto the current predicate.
    pub fn and_predicate(&mut self, predicate: &str, args: Vec<Value>) {
        self.push_predicate(" AND ", predicate, args);
    }

    /// ORs `predicate` onto the current predicate.
    pub fn or_predicate(&mut self, predicate: &str, args: Vec<Value>) {
        self.push_predicate(" OR ", predicate, args);
    }

    fn push_predicate(&mut self, joiner: &str, predicate: &str, args: Vec<Value>) {
        if !self.predicate.is_empty() {
            self.predicate.push_str(joiner);
        }
        self.predicate.push_str(predicate);
        self.predicate_args.extend(args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_join_in_order() {
        let mut query = Query::default();
        query.and_predicate("uid>?", vec![Value::I64(0)]);
        query.and_predicate("gid>?", vec![Value::I64(1)]);
        query.or_predicate("name=?", vec![Value::from("jet")]);

        assert_eq!(query.predicate, "uid>? AND gid>? OR name=?");
        assert_eq!(
            query.predicate_args,
            vec![Value::I64(0), Value::I64(1), Value::from("jet")]
        );
        assert!(query.has_filter());
    }

    #[test]
    fn empty_query_has_no_filter() {
        assert!(!Query::default().has_filter());
    }
}
