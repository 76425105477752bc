/// Key columns discovered from backend metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInfo {
    /// Primary key columns, in declaration order. Empty when the table has
    /// neither a primary key nor a unique constraint.
    pub primary_key: Vec<String>,

    /// The column the backend fills in on insert.
    pub auto_increment: Option<String>,
}

impl KeyInfo {
    /// Reads key information out of a `CREATE TABLE` statement.
    ///
    /// Recognizes an inline `PRIMARY KEY` on a column definition and a
    /// separate `[CONSTRAINT name] PRIMARY KEY (a, b)` clause. Without a
    /// primary key, the first unique constraint stands in for it. A column
    /// marked `AUTO_INCREMENT`, `AUTOINCREMENT`, `SERIAL` or `IDENTITY` is the
    /// auto-increment column.
    pub fn from_create_statement(sql: &str) -> KeyInfo {
        let mut info = KeyInfo::default();
        let mut unique = Vec::new();

        let Some(body) = table_body(sql) else {
            return info;
        };

        for definition in split_top_level(body) {
            let definition = strip_constraint_name(definition.trim());
            let words = keywords(definition);

            match words.as_slice() {
                [first, second, ..] if first == "PRIMARY" && second == "KEY" => {
                    if info.primary_key.is_empty() {
                        info.primary_key = column_list(definition);
                    }
                }
                [first, ..] if first == "UNIQUE" => {
                    if unique.is_empty() {
                        unique = column_list(definition);
                    }
                }
                [first, ..]
                    if matches!(
                        first.as_str(),
                        "KEY" | "INDEX" | "FOREIGN" | "CHECK" | "FULLTEXT" | "SPATIAL"
                    ) => {}
                [] => {}
                _ => {
                    let Some((name, rest)) = split_identifier(definition) else {
                        continue;
                    };
                    let attrs = keywords(rest);

                    if has_pair(&attrs, "PRIMARY", "KEY") && info.primary_key.is_empty() {
                        info.primary_key = vec![name.clone()];
                    }

                    if attrs.iter().any(|attr| attr == "UNIQUE") && unique.is_empty() {
                        unique = vec![name.clone()];
                    }

                    let auto = attrs.iter().any(|attr| {
                        matches!(
                            attr.as_str(),
                            "AUTO_INCREMENT" | "AUTOINCREMENT" | "SERIAL" | "BIGSERIAL" | "IDENTITY"
                        )
                    });
                    if auto && info.auto_increment.is_none() {
                        info.auto_increment = Some(name);
                    }
                }
            }
        }

        if info.primary_key.is_empty() {
            info.primary_key = unique;
        }

        info
    }
}

/// Returns the text between the first `(` and its matching `)`.
fn table_body(sql: &str) -> Option<&str> {
    let open = sql.find('(')?;
    let mut depth = 0usize;
    let mut quote = None;

    for (i, ch) in sql[open..].char_indices() {
        match (ch, quote) {
            ('\'' | '"' | '`', None) => quote = Some(ch),
            (c, Some(q)) if c == q => quote = None,
            (_, Some(_)) => {}
            ('(', None) => depth += 1,
            (')', None) => {
                depth -= 1;
                if depth == 0 {
                    return Some(&sql[open + 1..open + i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Splits at commas outside parentheses and quotes.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;

    for (i, ch) in body.char_indices() {
        match (ch, quote) {
            ('\'' | '"' | '`' | '[', None) => quote = Some(if ch == '[' { ']' } else { ch }),
            (c, Some(q)) if c == q => quote = None,
            (_, Some(_)) => {}
            ('(', None) => depth += 1,
            (')', None) => depth = depth.saturating_sub(1),
            (',', None) if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

/// Drops a leading `CONSTRAINT name`.
fn strip_constraint_name(definition: &str) -> &str {
    let Some((word, rest)) = split_word(definition) else {
        return definition;
    };
    if !word.eq_ignore_ascii_case("CONSTRAINT") {
        return definition;
    }
    match split_identifier(rest) {
        Some((_, rest)) => rest.trim_start(),
        None => definition,
    }
}

/// Upper-cased bare words, skipping quoted text and parenthesized groups.
fn keywords(text: &str) -> Vec<String> {
    let mut words = vec![];
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote = None;

    let flush = |current: &mut String, words: &mut Vec<String>| {
        if !current.is_empty() {
            words.push(current.to_ascii_uppercase());
            current.clear();
        }
    };

    for ch in text.chars() {
        match (ch, quote) {
            ('\'' | '"' | '`' | '[', None) => {
                flush(&mut current, &mut words);
                quote = Some(if ch == '[' { ']' } else { ch });
            }
            (c, Some(q)) if c == q => quote = None,
            (_, Some(_)) => {}
            ('(', None) => {
                flush(&mut current, &mut words);
                depth += 1;
            }
            (')', None) => depth = depth.saturating_sub(1),
            (c, None) if depth == 0 && (c.is_alphanumeric() || c == '_') => current.push(c),
            _ => flush(&mut current, &mut words),
        }
    }
    flush(&mut current, &mut words);
    words
}

fn has_pair(words: &[String], first: &str, second: &str) -> bool {
    words.windows(2).any(|pair| pair[0] == first && pair[1] == second)
}

/// Column names from the first parenthesized list in `definition`.
fn column_list(definition: &str) -> Vec<String> {
    let Some(body) = table_body(definition) else {
        return vec![];
    };
    split_top_level(body)
        .into_iter()
        .filter_map(|item| split_identifier(item.trim()).map(|(name, _)| name))
        .collect()
}

fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    let end = text
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(text.len());
    if end == 0 {
        return None;
    }
    Some((&text[..end], &text[end..]))
}

/// Splits a leading, possibly quoted, identifier from the rest of the text.
fn split_identifier(text: &str) -> Option<(String, &str)> {
    let text = text.trim_start();
    let first = text.chars().next()?;

    let close = match first {
        '`' => '`',
        '"' => '"',
        '[' => ']',
        _ => {
            let (word, rest) = split_word(text)?;
            return Some((word.to_string(), rest));
        }
    };

    let inner = &text[1..];
    let end = inner.find(close)?;
    Some((inner[..end].to_string(), &inner[end + 1..]))
}
