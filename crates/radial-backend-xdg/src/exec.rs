//! `Exec=` command line handling.
//!
//! Splits an Exec value into arguments following the desktop entry quoting
//! rules and expands its field codes. Launching from the menu never passes
//! files or URLs, so file and URL codes expand to nothing.

use crate::error::XdgError;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Values the `%i`, `%c` and `%k` field codes expand to.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldValues<'a> {
    pub icon: Option<&'a str>,
    pub name: &'a str,
    pub location: Option<&'a Path>,
}

fn field_code() -> Option<&'static Regex> {
    static FIELD_CODE: OnceLock<Option<Regex>> = OnceLock::new();
    FIELD_CODE
        .get_or_init(|| Regex::new(r"%[%a-zA-Z]").ok())
        .as_ref()
}

/// Split `exec` into arguments, honoring double quotes and backslash escapes.
pub fn tokenize(id: &str, exec: &str) -> Result<Vec<String>, XdgError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;
    let mut chars = exec.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            '\\' => match chars.next() {
                Some(escaped) => {
                    current.push(escaped);
                    in_token = true;
                }
                None => {
                    return Err(XdgError::InvalidExec {
                        id: id.to_string(),
                        reason: "trailing backslash".to_string(),
                    })
                }
            },
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err(XdgError::InvalidExec {
            id: id.to_string(),
            reason: "unterminated quote".to_string(),
        });
    }
    if in_token {
        args.push(current);
    }
    if args.is_empty() {
        return Err(XdgError::MissingExec { id: id.to_string() });
    }
    Ok(args)
}

/// Expand field codes in already tokenized arguments.
///
/// A lone `%i` becomes `--icon <icon>`; other codes expand in place. An
/// argument that was nothing but a file or URL code is dropped.
pub fn expand_field_codes(args: Vec<String>, values: FieldValues<'_>) -> Vec<String> {
    let Some(field_code) = field_code() else {
        return args;
    };
    let mut expanded = Vec::with_capacity(args.len());

    for arg in args {
        if arg == "%i" {
            if let Some(icon) = values.icon {
                expanded.push("--icon".to_string());
                expanded.push(icon.to_string());
            }
            continue;
        }

        let replaced = field_code.replace_all(&arg, |caps: &regex::Captures<'_>| {
            match &caps[0] {
                "%%" => "%".to_string(),
                "%c" => values.name.to_string(),
                "%k" => values
                    .location
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            }
        });

        if replaced.is_empty() && !arg.is_empty() {
            continue;
        }
        expanded.push(replaced.into_owned());
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_plain() {
        assert_eq!(
            tokenize("a", "firefox --new-window %u").unwrap(),
            args(&["firefox", "--new-window", "%u"])
        );
    }

    #[test]
    fn test_tokenize_quotes_and_escapes() {
        assert_eq!(
            tokenize("a", r#""/opt/My App/run" --title "a \"b\"""#).unwrap(),
            args(&["/opt/My App/run", "--title", r#"a "b""#])
        );
        assert_eq!(tokenize("a", r#"run """#).unwrap(), args(&["run", ""]));
    }

    #[test]
    fn test_tokenize_errors() {
        assert!(matches!(
            tokenize("a", r#"run "open"#),
            Err(XdgError::InvalidExec { .. })
        ));
        assert!(matches!(tokenize("a", "   "), Err(XdgError::MissingExec { .. })));
    }

    #[test]
    fn test_expand_drops_file_codes() {
        let values = FieldValues {
            icon: Some("calendar"),
            name: "Calendar",
            location: None,
        };
        assert_eq!(
            expand_field_codes(args(&["gnome-calendar", "%U", "%i", "--name=%c", "100%%"]), values),
            args(&["gnome-calendar", "--icon", "calendar", "--name=Calendar", "100%"])
        );
    }

    #[test]
    fn test_expand_without_icon() {
        let values = FieldValues {
            name: "Tool",
            ..FieldValues::default()
        };
        assert_eq!(expand_field_codes(args(&["tool", "%i", "%f"]), values), args(&["tool"]));
    }
}
