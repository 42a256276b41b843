//! Textual preprocessing that runs before tokenizing: comment stripping,
//! `@import` recognition and `@theme` macro expansion.
//!
//! Every rewrite keeps the number of newlines it replaced, so spans reported
//! by later stages still point into the original source.

use crate::ast::ThemeDefinition;
use crate::error::{Error, Result, Span};

#[derive(Debug, Default)]
pub struct Preprocessed {
    pub text: String,
    pub imports: Vec<String>,
}

pub fn preprocess(source: &str) -> Result<Preprocessed> {
    let stripped = strip_comments(source);
    let (text, imports) = replace_imports(&stripped);
    let text = expand_themes(&text)?;
    Ok(Preprocessed { text, imports })
}

/// Removes `/* ... */` comments outside of quoted strings.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if ch == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Swaps every `@import "path";` line for a marker comment and collects the
/// paths. Imports are recognized but never inlined here.
fn replace_imports(input: &str) -> (String, Vec<String>) {
    let mut imports = Vec::new();
    let mut out = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        let (content, newline) = match line.strip_suffix('\n') {
            Some(content) => (content, "\n"),
            None => (line, ""),
        };
        if let Some(target) = parse_import_line(content) {
            tracing::debug!("recorded @import \"{}\" (not inlined)", target);
            out.push_str(&format!("/* @import \"{}\" (not inlined) */", target));
            out.push_str(newline);
            imports.push(target.to_string());
            continue;
        }
        out.push_str(line);
    }
    (out, imports)
}

fn parse_import_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix("@import")?.trim_start();
    let literal = rest.strip_suffix(';')?.trim();
    let literal = literal
        .strip_prefix("url(")
        .and_then(|inner| inner.strip_suffix(')'))
        .map(str::trim)
        .unwrap_or(literal);
    if literal.len() < 2 {
        return None;
    }

    let bytes = literal.as_bytes();
    let first = bytes[0];
    let last = bytes[bytes.len() - 1];
    if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
        Some(&literal[1..literal.len() - 1])
    } else {
        None
    }
}

const THEME_KEYWORD: &str = "@theme";

/// Rewrites every `@theme <name> { key: value; }` block in place into a
/// `:root[data-theme="<name>"]` custom-property rule.
///
/// Blocks sharing a name are not merged: each produces its own rule.
pub fn expand_themes(input: &str) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(start) = find_unquoted(input, pos, THEME_KEYWORD) {
        out.push_str(&input[pos..start]);
        let after_keyword = start + THEME_KEYWORD.len();

        // `@themes`, `@theme-x` and friends are not theme blocks.
        if !input[after_keyword..].starts_with(char::is_whitespace) {
            out.push_str(THEME_KEYWORD);
            pos = after_keyword;
            continue;
        }

        let (theme, end) = parse_theme_block(input, start, after_keyword)?;
        out.push_str(&render_theme(&theme));
        let consumed = &input[start..end];
        for _ in 0..consumed.matches('\n').count() {
            out.push('\n');
        }
        pos = end;
    }

    out.push_str(&input[pos..]);
    Ok(out)
}

/// Parses the block beginning at `start`; returns the theme and the byte
/// offset just past its closing brace.
fn parse_theme_block(input: &str, start: usize, from: usize) -> Result<(ThemeDefinition, usize)> {
    let rest = &input[from..];
    let name_start = from + (rest.len() - rest.trim_start().len());
    let name_len = input[name_start..]
        .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(input.len() - name_start);
    let name = &input[name_start..name_start + name_len];
    if name.is_empty() {
        return Err(Error::syntax(
            "@theme requires a name",
            Span::locate(input, start),
        ));
    }

    let after_name = &input[name_start + name_len..];
    let open = name_start + name_len + (after_name.len() - after_name.trim_start().len());
    if !input[open..].starts_with('{') {
        return Err(Error::syntax(
            format!("expected '{{' after @theme {}", name),
            Span::locate(input, open),
        ));
    }

    let close = match find_unquoted(input, open + 1, "}") {
        Some(close) => close,
        None => {
            return Err(Error::syntax(
                format!("unterminated @theme {} block", name),
                Span::locate(input, start),
            ))
        }
    };

    let variables = split_declarations(&input[open + 1..close])
        .into_iter()
        .filter_map(|entry| {
            let (key, value) = entry.split_once(':')?;
            let key = key.trim().trim_start_matches('-');
            let value = value.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect();

    let theme = ThemeDefinition {
        name: name.to_string(),
        variables,
    };
    Ok((theme, close + 1))
}

fn render_theme(theme: &ThemeDefinition) -> String {
    let mut out = format!(":root[data-theme=\"{}\"] {{ ", theme.name);
    for (key, value) in &theme.variables {
        out.push_str(&format!("--theme-{}: {}; ", key, value));
    }
    out.push('}');
    out
}

fn find_unquoted(input: &str, from: usize, pattern: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, ch) in input[from..].char_indices() {
        let idx = from + i;
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
            continue;
        }
        if input[idx..].starts_with(pattern) {
            return Some(idx);
        }
    }
    None
}

fn split_declarations(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth = 0usize;
    let mut pos = 0;
    for (idx, ch) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                parts.push(&input[pos..idx]);
                pos = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[pos..]);
    parts
}
