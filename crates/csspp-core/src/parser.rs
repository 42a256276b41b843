use crate::ast::{Declaration, Rule, Stylesheet};
use crate::diagnostic::Diagnostic;
use crate::error::{Error, Result, Span};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::theme;

#[derive(Debug)]
pub struct Parsed {
    pub stylesheet: Stylesheet,
    pub warnings: Vec<Diagnostic>,
}

/// Preprocesses `input` (comments, imports, themes) and extracts its rules.
pub fn parse(input: &str) -> Result<Parsed> {
    let pre = theme::preprocess(input)?;
    for import in &pre.imports {
        tracing::debug!("import '{}' left for the bundler", import);
    }

    let mut parser = Parser::new(Lexer::tokenize(&pre.text));
    let rules = parser.parse_rules()?;
    tracing::debug!("extracted {} rule(s)", rules.len());

    Ok(Parsed {
        stylesheet: Stylesheet {
            rules,
            imports: pre.imports,
        },
        warnings: parser.warnings,
    })
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    warnings: Vec<Diagnostic>,
}

enum Terminator {
    Semicolon,
    OpenBrace,
    CloseBrace,
    Eof,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token<'a>>) -> Self {
        Self {
            tokens,
            pos: 0,
            warnings: Vec::new(),
        }
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn skip_trivia(&mut self) {
        while let Some(tok) = self.peek() {
            if !matches!(tok.kind, TokenKind::Whitespace | TokenKind::Comment) {
                break;
            }
            self.pos += 1;
        }
    }

    fn parse_rules(&mut self) -> Result<Vec<Rule>> {
        let mut rules = Vec::new();

        loop {
            self.skip_trivia();
            let Some(first) = self.peek().copied() else {
                break;
            };
            if first.kind == TokenKind::CloseBrace {
                return Err(Error::syntax("unexpected '}'", first.span));
            }

            let (prelude, term) = self.collect_until_terminator();
            let text = render(&prelude);
            match term {
                Terminator::Semicolon => {
                    self.warnings.push(
                        Diagnostic::warning(format!("unsupported statement '{}' skipped", text))
                            .at(first.span),
                    );
                }
                Terminator::Eof => {
                    return Err(Error::syntax(
                        format!("expected '{{' after '{}'", text),
                        first.span,
                    ));
                }
                Terminator::CloseBrace => {
                    return Err(Error::syntax(
                        format!("unexpected '}}' after '{}'", text),
                        first.span,
                    ));
                }
                Terminator::OpenBrace => {
                    if text.is_empty() {
                        return Err(Error::syntax("missing selector before '{'", first.span));
                    }
                    let declarations = self.parse_block(&text, first.span)?;
                    rules.push(Rule {
                        selector: text,
                        declarations,
                        span: first.span,
                    });
                }
            }
        }

        Ok(rules)
    }

    /// Parses declarations up to and including the closing brace of the
    /// current rule.
    fn parse_block(&mut self, selector: &str, rule_span: Span) -> Result<Vec<Declaration>> {
        let mut declarations = Vec::new();

        loop {
            let (tokens, term) = self.collect_until_terminator();
            match term {
                Terminator::Semicolon => {
                    self.push_declaration(selector, &tokens, &mut declarations)
                }
                Terminator::CloseBrace => {
                    self.push_declaration(selector, &tokens, &mut declarations);
                    return Ok(declarations);
                }
                Terminator::OpenBrace => {
                    let header = render(&tokens);
                    self.skip_nested_block(selector, rule_span)?;
                    let span = tokens.iter().find(|t| !is_trivia(t)).map_or(rule_span, |t| t.span);
                    let message =
                        format!("nested block '{}' is not supported and was skipped", header);
                    self.warnings.push(
                        Diagnostic::warning(message)
                            .with_selector(selector)
                            .at(span),
                    );
                }
                Terminator::Eof => {
                    return Err(Error::syntax(
                        format!("unclosed block for selector '{}'", selector),
                        rule_span,
                    ));
                }
            }
        }
    }

    /// Consumes tokens until a structural delimiter. `;` inside parentheses
    /// does not terminate. The terminator itself is consumed.
    fn collect_until_terminator(&mut self) -> (Vec<Token<'a>>, Terminator) {
        let mut collected = Vec::new();
        let mut depth = 0usize;

        while let Some(tok) = self.peek().copied() {
            self.pos += 1;
            match tok.kind {
                TokenKind::OpenBrace => return (collected, Terminator::OpenBrace),
                TokenKind::CloseBrace => return (collected, Terminator::CloseBrace),
                TokenKind::Semicolon if depth == 0 => return (collected, Terminator::Semicolon),
                TokenKind::OpenParen => depth += 1,
                TokenKind::CloseParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            collected.push(tok);
        }
        (collected, Terminator::Eof)
    }

    fn skip_nested_block(&mut self, selector: &str, rule_span: Span) -> Result<()> {
        let mut depth = 1usize;
        while let Some(tok) = self.peek().copied() {
            self.pos += 1;
            match tok.kind {
                TokenKind::OpenBrace => depth += 1,
                TokenKind::CloseBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(Error::syntax(
            format!("unclosed nested block in '{}'", selector),
            rule_span,
        ))
    }

    fn push_declaration(
        &mut self,
        selector: &str,
        tokens: &[Token<'a>],
        out: &mut Vec<Declaration>,
    ) {
        let Some(first) = tokens.iter().find(|t| !is_trivia(t)) else {
            // empty declaration, e.g. `;;`
            return;
        };

        let mut depth = 0usize;
        let colon = tokens.iter().position(|t| match t.kind {
            TokenKind::OpenParen => {
                depth += 1;
                false
            }
            TokenKind::CloseParen => {
                depth = depth.saturating_sub(1);
                false
            }
            TokenKind::Colon => depth == 0,
            _ => false,
        });

        let parsed = colon.and_then(|idx| {
            let property = render(&tokens[..idx]);
            let value = render(&tokens[idx + 1..]);
            (!property.is_empty()).then_some((property, value))
        });

        match parsed {
            Some((property, value)) => out.push(Declaration::new(property, value, first.span)),
            None => self.warnings.push(
                Diagnostic::warning(format!("malformed declaration '{}' dropped", render(tokens)))
                    .with_selector(selector)
                    .at(first.span),
            ),
        }
    }
}

fn is_trivia(tok: &Token<'_>) -> bool {
    matches!(tok.kind, TokenKind::Whitespace | TokenKind::Comment)
}

/// Joins token text, dropping comments and collapsing whitespace runs.
fn render(tokens: &[Token<'_>]) -> String {
    let mut out = String::new();
    for tok in tokens {
        match tok.kind {
            TokenKind::Comment => {}
            TokenKind::Whitespace => {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            _ => out.push_str(tok.text),
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(src: &str) -> Vec<Rule> {
        parse(src).expect("parse").stylesheet.rules
    }

    #[test]
    fn extracts_rules_in_order() {
        let rules = rules(".a { color: red; }\n.b{margin:0}");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].selector, ".a");
        assert_eq!(rules[0].declarations[0].property, "color");
        assert_eq!(rules[0].declarations[0].value, "red");
        assert_eq!(rules[1].selector, ".b");
        assert_eq!(rules[1].declarations[0].value, "0");
    }

    #[test]
    fn selectors_are_trimmed_and_collapsed() {
        let rules = rules("  .a,\n   .b > p  { color: red }");
        assert_eq!(rules[0].selector, ".a, .b > p");
    }

    #[test]
    fn splits_on_first_colon_only() {
        let rules = rules("a:hover { background: url(http://x/y.png); }");
        assert_eq!(rules[0].selector, "a:hover");
        assert_eq!(rules[0].declarations[0].value, "url(http://x/y.png)");
    }

    #[test]
    fn semicolons_in_parens_and_strings_do_not_split() {
        let rules = rules(".a { background: url(data:image/png;base64,AAA); content: \"x;}{\"; }");
        let decls = &rules[0].declarations;
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].value, "url(data:image/png;base64,AAA)");
        assert_eq!(decls[1].value, "\"x;}{\"");
    }

    #[test]
    fn empty_declarations_drop_silently() {
        let parsed = parse(".a { ; color: red;; ; }").unwrap();
        assert_eq!(parsed.stylesheet.rules[0].declarations.len(), 1);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn malformed_declaration_warns() {
        let parsed = parse(".a { color red; margin: 0; }").unwrap();
        assert_eq!(parsed.stylesheet.rules[0].declarations.len(), 1);
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].message.contains("color red"));
    }

    #[test]
    fn classifies_csspp_declarations() {
        let rules = rules(".a { color: red; depth: 3d; }");
        assert!(!rules[0].declarations[0].is_csspp);
        assert!(rules[0].declarations[1].is_csspp);
    }

    #[test]
    fn nested_block_is_skipped_with_warning() {
        let source = ".a { color: red; &:hover { color: blue; } margin: 0; }\n.b { x: y; }";
        let parsed = parse(source).unwrap();
        let rules = parsed.stylesheet.rules;
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].declarations.len(), 2);
        assert_eq!(rules[0].declarations[1].property, "margin");
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn unclosed_block_is_a_syntax_error() {
        let err = parse(".a { color: red;\n.b { color: blue; }\n.c { margin: 0;").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn stray_close_brace_is_a_syntax_error() {
        let err = parse(".a { color: red; }\n}").unwrap_err();
        match err {
            Error::Syntax { span, .. } => assert_eq!(span, Span::new(2, 1)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn declaration_spans_point_into_source() {
        let src = "/* banner\n */\n.a {\n  depth: 2px;\n}";
        let rules = rules(src);
        assert_eq!(rules[0].span, Span::new(3, 1));
        assert_eq!(rules[0].declarations[0].span, Span::new(4, 3));
    }

    #[test]
    fn theme_blocks_become_root_rules() {
        let rules = rules("@theme dark { bg: #000; }\n.a { color: var(--theme-bg); }");
        assert_eq!(rules[0].selector, ":root[data-theme=\"dark\"]");
        assert_eq!(rules[0].declarations[0].property, "--theme-bg");
        assert_eq!(rules[0].declarations[0].value, "#000");
        assert_eq!(rules[1].declarations.len(), 1);
    }

    #[test]
    fn imports_are_recorded() {
        let parsed = parse("@import \"shared.csspp\";\n.a { color: red; }").unwrap();
        assert_eq!(parsed.stylesheet.imports, vec!["shared.csspp"]);
        assert_eq!(parsed.stylesheet.rules.len(), 1);
        assert!(parsed.warnings.is_empty());
    }
}
