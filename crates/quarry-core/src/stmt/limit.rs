/// Row cap for a scan.
///
/// `offset` is `None` when the caller only asked for a count; dialects that
/// accept an offset render it only when it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub offset: Option<u64>,
    pub count: u64,
}

impl Limit {
    /// Builds a limit from the `(start, count?)` pair accepted by
    /// `Query::limit`: a lone value is the row count, a pair is an offset
    /// followed by a count. A lone zero means no limit.
    pub fn new(start: u64, count: Option<u64>) -> Option<Self> {
        match count {
            Some(count) => Some(Self {
                offset: Some(start),
                count,
            }),
            None if start == 0 => None,
            None => Some(Self {
                offset: None,
                count: start,
            }),
        }
    }

    pub fn one() -> Self {
        Self {
            offset: None,
            count: 1,
        }
    }
}
