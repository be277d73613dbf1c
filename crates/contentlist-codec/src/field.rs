//! Record-level field quoting.

use std::borrow::Cow;

/// Whether a field must be wrapped in double quotes.
pub fn needs_quoting(field: &str) -> bool {
    field.contains(['"', ',', '\r', '\n'])
}

/// Quote a field if required, doubling any inner double quotes.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if !needs_quoting(field) {
        return Cow::Borrowed(field);
    }
    let mut quoted = String::with_capacity(field.len() + 2);
    quoted.push('"');
    for c in field.chars() {
        if c == '"' {
            quoted.push('"');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields_pass_through() {
        assert!(matches!(escape_field("/a/b.txt"), Cow::Borrowed("/a/b.txt")));
        assert_eq!(escape_field(""), "");
        assert_eq!(escape_field("it's fine"), "it's fine");
    }

    #[test]
    fn test_quoted_fields() {
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(escape_field("cr\r"), "\"cr\r\"");
    }
}
