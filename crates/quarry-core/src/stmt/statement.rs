use super::Value;

/// Compiled statement text with positional `?` arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub args: Vec<Value>,
}

impl Statement {
    pub fn new(text: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            args,
        }
    }

    /// A statement without arguments.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(text, vec![])
    }

    /// Renders the statement with its arguments inlined as literals.
    ///
    /// Placeholders inside quoted literals are left alone. Meant for logs,
    /// never for execution.
    pub fn to_inline_string(&self) -> String {
        let mut out = String::with_capacity(self.text.len() + self.args.len() * 8);
        let mut args = self.args.iter();
        let mut quote = None;

        for ch in self.text.chars() {
            match (ch, quote) {
                ('\'' | '"' | '`', None) => {
                    quote = Some(ch);
                    out.push(ch);
                }
                (c, Some(q)) if c == q => {
                    quote = None;
                    out.push(ch);
                }
                ('?', None) => match args.next() {
                    Some(arg) => out.push_str(&arg.to_literal()),
                    None => out.push('?'),
                },
                _ => out.push(ch),
            }
        }

        out
    }
}

impl core::fmt::Display for Statement {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(&self.to_inline_string())
    }
}
