//! Identifier conversion for emitted Rust.

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn", "else", "enum",
    "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "macro", "match", "mod",
    "move", "mut", "override", "priv", "pub", "ref", "return", "static", "struct", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const NON_RAW: &[&str] = &["crate", "self", "Self", "super"];

/// `SayHello` → `say_hello`, `HTTPServer` → `http_server`, `displayName` → `display_name`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' || c == '.' {
            push_underscore(&mut out);
            continue;
        }
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary {
                push_underscore(&mut out);
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out.trim_matches('_').to_string()
}

fn push_underscore(out: &mut String) {
    if !out.is_empty() && !out.ends_with('_') {
        out.push('_');
    }
}

/// `say_hello` → `SayHello`, `MOOD_HAPPY` → `MoodHappy`, `GreetingService` unchanged.
pub fn pascal_case(name: &str) -> String {
    let all_caps = !name.chars().any(char::is_lowercase);
    snake_case(name)
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    let rest: String = if all_caps {
                        chars.as_str().to_lowercase()
                    } else {
                        chars.as_str().to_string()
                    };
                    first.to_uppercase().chain(rest.chars()).collect::<String>()
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Make `name` usable as a Rust identifier.
pub fn rust_ident(name: &str) -> String {
    if NON_RAW.contains(&name) {
        format!("{name}_")
    } else if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

/// The name serde derives for a field written as `ident`.
pub fn serde_name(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}

/// True for names made only of ASCII letters, digits and underscores.
pub fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// A Rust string literal.
pub fn quoted(text: &str) -> String {
    format!("{text:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("SayHello"), "say_hello");
        assert_eq!(snake_case("GreetingService"), "greeting_service");
        assert_eq!(snake_case("HTTPServer"), "http_server");
        assert_eq!(snake_case("displayName"), "display_name");
        assert_eq!(snake_case("already_snake"), "already_snake");
        assert_eq!(snake_case("V2Thing"), "v2_thing");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("say_hello"), "SayHello");
        assert_eq!(pascal_case("GreetingService"), "GreetingService");
        assert_eq!(pascal_case("MOOD_UNSPECIFIED"), "MoodUnspecified");
        assert_eq!(pascal_case("happy"), "Happy");
    }

    #[test]
    fn test_rust_ident() {
        assert_eq!(rust_ident("type"), "r#type");
        assert_eq!(rust_ident("self"), "self_");
        assert_eq!(rust_ident("name"), "name");
        assert_eq!(serde_name("r#type"), "type");
        assert!(is_plain_identifier("page_size"));
        assert!(!is_plain_identifier("page-size"));
        assert!(!is_plain_identifier("9lives"));
    }
}
