/// A `{name}`-style placeholder template. Parsing is hand-rolled rather
/// than regex-based since the grammar is trivial: a `{`...`}` span whose
/// contents are all identifier characters is a placeholder; anything
/// else (stray braces, empty braces, braces with punctuation inside) is
/// passed through literally.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut chars = template.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c != '{' {
            continue;
        }
        if let Some(end) = template[start + 1..].find('}') {
            let name = &template[start + 1..start + 1 + end];
            if is_identifier(name) && !out.iter().any(|n: &String| n == name) {
                out.push(name.to_string());
            }
        }
    }
    out
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Replaces every `{name}` occurrence for which `lookup(name)` returns
/// `Some`; anything else (unknown name, non-identifier braces) is left
/// untouched.
pub fn substitute(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];
        match after_brace.find('}') {
            Some(end) => {
                let name = &after_brace[..end];
                if is_identifier(name) {
                    match lookup(name) {
                        Some(value) => out.push_str(&value),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                } else {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
                rest = &after_brace[end + 1..];
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_distinct_placeholders_in_order() {
        assert_eq!(placeholders("a {foo} b {bar} c {foo}"), vec!["foo".to_string(), "bar".to_string()]);
    }

    #[test]
    fn ignores_non_identifier_braces() {
        assert_eq!(placeholders("json: {\"a\": 1}"), Vec::<String>::new());
    }

    #[test]
    fn substitutes_known_names_and_leaves_unknown_alone() {
        let out = substitute("a {foo} b {bar}", |n| if n == "foo" { Some("X".to_string()) } else { None });
        assert_eq!(out, "a X b {bar}");
    }
}
