use super::{Formatter, ToSql};

/// A table or column name, quoted when the dialect quotes identifiers.
pub(super) struct Ident<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let name = self.0.as_ref();
        match f.compiler.capability.identifier_quote {
            Some(quote) => {
                f.dst.push(quote);
                for ch in name.chars() {
                    if ch == quote {
                        f.dst.push(quote);
                    }
                    f.dst.push(ch);
                }
                f.dst.push(quote);
            }
            None => f.dst.push_str(name),
        }
    }
}

/// `name=?` with the value bound as an argument.
pub(super) struct Equals<S>(pub(super) S, pub(super) super::Param);

impl<S: AsRef<str>> ToSql for Equals<S> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, Ident(self.0) "=" self.1);
    }
}
