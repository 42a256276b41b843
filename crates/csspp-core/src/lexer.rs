use crate::error::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Colon,
    Semicolon,
    /// Quoted string, quotes included. May be unterminated at end of input.
    String,
    Whitespace,
    Comment,
    /// Any other run of characters.
    Text,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(src: &'a str) -> Vec<Token<'a>> {
        Lexer::new(src).collect()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn bump_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
    }

    fn lex_string(&mut self, quote: char) {
        while let Some(ch) = self.bump() {
            if ch == '\\' {
                self.bump();
            } else if ch == quote {
                break;
            }
        }
    }

    fn lex_comment(&mut self) {
        let mut prev = '\0';
        while let Some(ch) = self.bump() {
            if prev == '*' && ch == '/' {
                break;
            }
            prev = ch;
        }
    }
}

fn is_delimiter(ch: char) -> bool {
    matches!(ch, '{' | '}' | '(' | ')' | ':' | ';' | '"' | '\'') || ch.is_whitespace()
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let start = self.pos;
        let span = Span::new(self.line, self.column);
        let ch = self.bump()?;

        let kind = match ch {
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '"' | '\'' => {
                self.lex_string(ch);
                TokenKind::String
            }
            '/' if self.peek() == Some('*') => {
                self.bump();
                self.lex_comment();
                TokenKind::Comment
            }
            c if c.is_whitespace() => {
                self.bump_while(char::is_whitespace);
                TokenKind::Whitespace
            }
            _ => {
                let src = self.src;
                let mut pos = self.pos;
                self.bump_while(|c| {
                    // stop before a comment opener so it lexes as its own token
                    let stop = is_delimiter(c) || (c == '/' && src[pos..].starts_with("/*"));
                    pos += c.len_utf8();
                    !stop
                });
                TokenKind::Text
            }
        };

        Some(Token {
            kind,
            text: &self.src[start..self.pos],
            span,
        })
    }
}
