//! Splitting CQL migration bodies into single statements.
//!
//! The native protocol executes one statement per request, so a migration
//! file holding several statements is split on `;` first. Semicolons inside
//! string literals, quoted identifiers, `$$` blocks and comments do not end
//! a statement. Neither do semicolons between `BEGIN [UNLOGGED | COUNTER]
//! BATCH` and `APPLY BATCH`, since a batch is a single statement.

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuote,
    DoubleQuote,
    Dollar,
    LineComment,
    BlockComment,
}

/// Split a CQL body into its statements.
///
/// Statements are trimmed and returned without the terminating `;`.
/// Fragments holding only whitespace and comments are dropped. Keywords are
/// matched case-insensitively and only outside literals and comments.
///
/// ```rust
/// use dbmigrate_scylladb::split_statements;
///
/// let parts = split_statements("CREATE TABLE a (id int PRIMARY KEY);\n-- done\n");
/// assert_eq!(parts, vec!["CREATE TABLE a (id int PRIMARY KEY)"]);
/// ```
#[must_use]
pub fn split_statements(body: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut has_code = false;
    let mut state = State::Normal;
    let mut word = String::new();
    let mut recent: [String; 2] = Default::default();
    let mut in_batch = false;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if state == State::Normal {
            if c.is_alphanumeric() || c == '_' {
                word.push(c.to_ascii_uppercase());
            } else {
                end_word(&mut word, &mut recent, &mut in_batch);
            }
        }

        match state {
            State::Normal => match c {
                ';' if in_batch => has_code = true,
                ';' => {
                    recent = Default::default();
                    if has_code {
                        statements.push(current.trim().to_string());
                    }
                    current.clear();
                    has_code = false;
                    continue;
                }
                '-' if chars.peek() == Some(&'-') => state = State::LineComment,
                '/' if chars.peek() == Some(&'/') => state = State::LineComment,
                '/' if chars.peek() == Some(&'*') => {
                    current.push(c);
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                    state = State::BlockComment;
                    continue;
                }
                '\'' => {
                    state = State::SingleQuote;
                    has_code = true;
                }
                '"' => {
                    state = State::DoubleQuote;
                    has_code = true;
                }
                '$' if chars.peek() == Some(&'$') => {
                    current.push(c);
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                    state = State::Dollar;
                    has_code = true;
                    continue;
                }
                c if !c.is_whitespace() => has_code = true,
                _ => {}
            },
            State::SingleQuote => {
                // '' is an escaped quote; the second one reopens the literal.
                if c == '\'' {
                    state = State::Normal;
                }
            }
            State::DoubleQuote => {
                if c == '"' {
                    state = State::Normal;
                }
            }
            State::Dollar => {
                if c == '$' && chars.peek() == Some(&'$') {
                    current.push(c);
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                    state = State::Normal;
                    continue;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    current.push(c);
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                    state = State::Normal;
                    continue;
                }
            }
        }
        current.push(c);
    }

    if has_code {
        statements.push(current.trim().to_string());
    }

    statements
}

/// Close the keyword being read and track batch boundaries.
///
/// `recent[1]` is the keyword before `word`, `recent[0]` the one before that.
fn end_word(word: &mut String, recent: &mut [String; 2], in_batch: &mut bool) {
    if word.is_empty() {
        return;
    }

    if word == "BATCH" {
        match (recent[0].as_str(), recent[1].as_str()) {
            (_, "BEGIN") | ("BEGIN", "UNLOGGED" | "COUNTER") => *in_batch = true,
            (_, "APPLY") => *in_batch = false,
            _ => {}
        }
    }

    recent[0] = std::mem::take(&mut recent[1]);
    recent[1] = std::mem::take(word);
}
