//! Source scanning.
//!
//! A JavaScript tokenizer that is just precise enough for the built-in
//! rules: it separates comments, string and template literals, regular
//! expressions, identifiers and punctuators, and checks that brackets are
//! balanced. Anything it cannot make sense of becomes a [`ParseError`],
//! which the linter reports as a single fatal message.

use lintpool_diagnostic::{LineIndex, Span};

const KEYWORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "let", "new", "null", "return", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Keywords after which a `/` starts a regular expression.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==", "!=",
    "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-", "*", "/",
    "%", "&", "|", "^", "!", "~", "?", ":", "=", ".", "@", "#",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Number,
    String,
    Template,
    RegExp,
    Punctuator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// 1-based line of the first character.
    pub line: u32,
    /// 1-based line of the last character.
    pub end_line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    /// Span including the delimiters.
    pub span: Span,
    /// Span of the comment body.
    pub value: Span,
    pub line: u32,
    pub end_line: u32,
}

/// An unrecoverable scanning failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parsing error: {}", self.message)
    }
}

/// Scanned source text.
#[derive(Debug, Clone)]
pub struct SourceCode {
    text: String,
    lines: LineIndex,
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
}

impl SourceCode {
    /// Scans `text`.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let lines = LineIndex::new(text);
        let (tokens, comments) = Scanner::new(text, &lines).run()?;
        Ok(Self {
            text: text.to_string(),
            lines,
            tokens,
            comments,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    /// Text covered by `span`.
    pub fn slice(&self, span: Span) -> &str {
        &self.text[span.start as usize..span.end as usize]
    }

    /// Text of the token at `index`, or `""` past the end.
    pub fn token_text(&self, index: usize) -> &str {
        self.tokens
            .get(index)
            .map(|token| self.slice(token.span))
            .unwrap_or("")
    }

    /// True if the token at `index` is a punctuator equal to `value`.
    pub fn is_punct(&self, index: usize, value: &str) -> bool {
        self.tokens.get(index).is_some_and(|token| {
            token.kind == TokenKind::Punctuator && self.slice(token.span) == value
        })
    }

    /// True if the token at `index` is the keyword `value`.
    pub fn is_keyword(&self, index: usize, value: &str) -> bool {
        self.tokens.get(index).is_some_and(|token| {
            token.kind == TokenKind::Keyword && self.slice(token.span) == value
        })
    }

    /// Converts a byte offset to a 1-based `(line, column)` pair.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        self.lines.line_col(offset)
    }

    /// Index of the token matching the bracket at `open`, if any.
    pub fn matching_bracket(&self, open: usize) -> Option<usize> {
        let (opening, closing) = match self.token_text(open) {
            "(" => ("(", ")"),
            "[" => ("[", "]"),
            "{" => ("{", "}"),
            _ => return None,
        };
        let mut depth = 0usize;
        for index in open..self.tokens.len() {
            if self.is_punct(index, opening) {
                depth += 1;
            } else if self.is_punct(index, closing) {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
        }
        None
    }

    /// Index of the token opening the bracket closed at `close`, if any.
    pub fn opening_bracket(&self, close: usize) -> Option<usize> {
        let (opening, closing) = match self.token_text(close) {
            ")" => ("(", ")"),
            "]" => ("[", "]"),
            "}" => ("{", "}"),
            _ => return None,
        };
        let mut depth = 0usize;
        for index in (0..=close).rev() {
            if self.is_punct(index, closing) {
                depth += 1;
            } else if self.is_punct(index, opening) {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
        }
        None
    }
}

struct Scanner<'a> {
    text: &'a str,
    lines: &'a LineIndex,
    pos: usize,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
    brackets: Vec<(char, usize)>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, lines: &'a LineIndex) -> Self {
        Self {
            text,
            lines,
            pos: 0,
            tokens: Vec::new(),
            comments: Vec::new(),
            brackets: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_at(&self, skip: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(skip)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> ParseError {
        let (line, column) = self.lines.line_col(offset as u32);
        ParseError {
            message: message.into(),
            line,
            column,
        }
    }

    fn line_of(&self, offset: usize) -> u32 {
        self.lines.line_col(offset as u32).0
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let end = self.pos;
        self.tokens.push(Token {
            kind,
            span: Span::new(start as u32, end as u32),
            line: self.line_of(start),
            end_line: self.line_of(end.saturating_sub(1).max(start)),
        });
    }

    fn run(mut self) -> Result<(Vec<Token>, Vec<Comment>), ParseError> {
        if self.text.starts_with("#!") {
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                self.bump();
            }
        }

        while let Some(c) = self.peek() {
            let start = self.pos;
            if c.is_whitespace() || c == '\u{feff}' {
                self.bump();
            } else if c == '/' && self.peek_at(1) == Some('/') {
                self.line_comment(start);
            } else if c == '/' && self.peek_at(1) == Some('*') {
                self.block_comment(start)?;
            } else if is_identifier_start(c) {
                self.identifier(start);
            } else if c.is_ascii_digit()
                || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()))
            {
                self.number(start);
            } else if c == '"' || c == '\'' {
                self.string(start, c)?;
            } else if c == '`' {
                self.template(start)?;
            } else if c == '/' && self.regex_allowed() {
                self.regex(start)?;
            } else {
                self.punctuator(start)?;
            }
        }

        if let Some(&(_, offset)) = self.brackets.last() {
            return Err(self.error("Unexpected end of input", offset.max(self.text.len())));
        }

        Ok((self.tokens, self.comments))
    }

    fn line_comment(&mut self, start: usize) {
        self.pos += 2;
        let value_start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.bump();
        }
        self.comments.push(Comment {
            kind: CommentKind::Line,
            span: Span::new(start as u32, self.pos as u32),
            value: Span::new(value_start as u32, self.pos as u32),
            line: self.line_of(start),
            end_line: self.line_of(start),
        });
    }

    fn block_comment(&mut self, start: usize) -> Result<(), ParseError> {
        self.pos += 2;
        let value_start = self.pos;
        let Some(close) = self.text[self.pos..].find("*/") else {
            return Err(self.error("Unterminated comment", start));
        };
        let value_end = self.pos + close;
        self.pos = value_end + 2;
        self.comments.push(Comment {
            kind: CommentKind::Block,
            span: Span::new(start as u32, self.pos as u32),
            value: Span::new(value_start as u32, value_end as u32),
            line: self.line_of(start),
            end_line: self.line_of(self.pos - 1),
        });
        Ok(())
    }

    fn identifier(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if is_identifier_part(c) {
                self.bump();
            } else {
                break;
            }
        }
        let word = &self.text[start..self.pos];
        let kind = if KEYWORDS.contains(&word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.push(kind, start);
    }

    fn number(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                let exponent = (c == 'e' || c == 'E')
                    && !self.text[start..self.pos].starts_with("0x")
                    && !self.text[start..self.pos].starts_with("0X");
                self.bump();
                if exponent && matches!(self.peek(), Some('+') | Some('-')) {
                    self.bump();
                }
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, start);
    }

    fn string(&mut self, start: usize, quote: char) -> Result<(), ParseError> {
        self.bump();
        loop {
            match self.bump() {
                None | Some('\n') | Some('\r') => {
                    return Err(self.error("Unterminated string constant", start));
                }
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => break,
                Some(_) => {}
            }
        }
        self.push(TokenKind::String, start);
        Ok(())
    }

    fn template(&mut self, start: usize) -> Result<(), ParseError> {
        self.bump();
        let mut depth = 0usize;
        loop {
            match self.bump() {
                None => return Err(self.error("Unterminated template", start)),
                Some('\\') => {
                    self.bump();
                }
                Some('`') if depth == 0 => break,
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    depth += 1;
                }
                Some('{') if depth > 0 => depth += 1,
                Some('}') if depth > 0 => depth -= 1,
                Some(q @ ('"' | '\'')) if depth > 0 => {
                    while let Some(c) = self.bump() {
                        if c == '\\' {
                            self.bump();
                        } else if c == q {
                            break;
                        }
                    }
                }
                Some(_) => {}
            }
        }
        self.push(TokenKind::Template, start);
        Ok(())
    }

    fn regex_allowed(&self) -> bool {
        let Some(previous) = self.tokens.last() else {
            return true;
        };
        let text = &self.text[previous.span.start as usize..previous.span.end as usize];
        match previous.kind {
            TokenKind::Punctuator => !matches!(text, ")" | "]" | "}"),
            TokenKind::Keyword => REGEX_PREFIX_KEYWORDS.contains(&text),
            _ => false,
        }
    }

    fn regex(&mut self, start: usize) -> Result<(), ParseError> {
        self.bump();
        let mut in_class = false;
        loop {
            match self.bump() {
                None | Some('\n') | Some('\r') => {
                    return Err(self.error("Unterminated regular expression", start));
                }
                Some('\\') => {
                    self.bump();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some(_) => {}
            }
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_alphabetic() {
                self.bump();
            } else {
                break;
            }
        }
        self.push(TokenKind::RegExp, start);
        Ok(())
    }

    fn punctuator(&mut self, start: usize) -> Result<(), ParseError> {
        let rest = &self.text[self.pos..];
        let Some(punct) = PUNCTUATORS.iter().find(|p| {
            rest.starts_with(**p)
                && !(**p == "?." && rest[2..].starts_with(|c: char| c.is_ascii_digit()))
        }) else {
            let c = rest.chars().next().unwrap_or(' ');
            return Err(self.error(format!("Unexpected character '{c}'"), start));
        };
        self.pos += punct.len();

        match *punct {
            "(" | "[" | "{" => {
                let c = punct.chars().next().unwrap_or('(');
                self.brackets.push((c, start));
            }
            ")" | "]" | "}" => {
                let expected = match *punct {
                    ")" => '(',
                    "]" => '[',
                    _ => '{',
                };
                match self.brackets.pop() {
                    Some((open, _)) if open == expected => {}
                    _ => return Err(self.error(format!("Unexpected token {punct}"), start)),
                }
            }
            _ => {}
        }

        self.push(TokenKind::Punctuator, start);
        Ok(())
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric() || c == '\u{200c}' || c == '\u{200d}'
}
