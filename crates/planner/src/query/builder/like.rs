use crate::error::FilterEvaluationError;

/// Rewrites a filter `LIKE` pattern with its own wildcard, single character
/// and escape characters into an SQL pattern using `%`, `_` and
/// `sql_escape`.
///
/// Characters that are special in SQL but literal in the filter pattern are
/// escaped, so `100%*` with `*` as wildcard matches strings starting with
/// `100%`.
pub fn translate_like_pattern(
    pattern: &str,
    wildcard: char,
    single_char: char,
    escape_char: char,
    sql_escape: char,
) -> Result<String, FilterEvaluationError> {
    let invalid = |message: &str| FilterEvaluationError::InvalidLikePattern {
        pattern: pattern.to_string(),
        message: message.to_string(),
    };

    if wildcard == single_char || wildcard == escape_char || single_char == escape_char {
        return Err(invalid(
            "wildcard, single character and escape character must differ",
        ));
    }

    let mut out = String::with_capacity(pattern.len() + 4);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == escape_char {
            let escaped = chars
                .next()
                .ok_or_else(|| invalid("pattern ends with the escape character"))?;
            push_literal(&mut out, escaped, sql_escape);
        } else if c == wildcard {
            out.push('%');
        } else if c == single_char {
            out.push('_');
        } else {
            push_literal(&mut out, c, sql_escape);
        }
    }
    Ok(out)
}

fn push_literal(out: &mut String, c: char, sql_escape: char) {
    if c == '%' || c == '_' || c == sql_escape {
        out.push(sql_escape);
    }
    out.push(c);
}
