use crate::{
    ast::{Position, Token, TokenKind},
    error::{LexError, LexErrorKind},
};

pub struct Lexer {
    input: Vec<char>,
    index: usize,
    offset: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            index: 0,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.index).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.index + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.index += 1;
            self.offset += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column, self.offset)
    }

    fn text_from(&self, start: usize) -> String {
        self.input[start..self.index].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_line_comment(&mut self) {
        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Bracketed comments nest: `/* a /* b */ c */` is one comment.
    fn read_bracketed_comment(&mut self, start: Position) -> Result<(), LexError> {
        self.advance();
        self.advance();
        let mut depth = 1;

        while depth > 0 {
            match (self.current_char(), self.peek_char(1)) {
                (Some('/'), Some('*')) => {
                    self.advance();
                    self.advance();
                    depth += 1;
                }
                (Some('*'), Some('/')) => {
                    self.advance();
                    self.advance();
                    depth -= 1;
                }
                (Some(_), _) => self.advance(),
                (None, _) => {
                    return Err(LexError::new(start, LexErrorKind::UnterminatedComment));
                }
            }
        }
        Ok(())
    }

    fn read_string(&mut self, start: Position) -> Result<(), LexError> {
        if self.peek_char(1) == Some('"') && self.peek_char(2) == Some('"') {
            return self.read_raw_string(start);
        }

        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(());
                }
                '\r' | '\n' => break,
                '\\' => {
                    let escape_at = self.position();
                    self.advance();
                    self.read_escape(escape_at)?;
                }
                _ => self.advance(),
            }
        }

        Err(LexError::new(start, LexErrorKind::UnterminatedString))
    }

    fn read_escape(&mut self, escape_at: Position) -> Result<(), LexError> {
        match self.current_char() {
            Some('b' | 't' | 'n' | 'f' | 'r' | '"' | '\'' | '\\' | '/') => {
                self.advance();
                Ok(())
            }
            Some('u') => {
                let start = self.index;
                self.advance();
                if self.current_char() != Some('{') {
                    return Err(self.invalid_escape(escape_at, start));
                }
                self.advance();
                let mut digits = String::new();
                while let Some(ch) = self.current_char() {
                    if ch.is_ascii_hexdigit() {
                        digits.push(ch);
                        self.advance();
                    } else {
                        break;
                    }
                }
                if self.current_char() != Some('}') || digits.is_empty() || digits.len() > 8 {
                    return Err(self.invalid_escape(escape_at, start));
                }
                self.advance();
                let valid = u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .is_some();
                if valid {
                    Ok(())
                } else {
                    Err(self.invalid_escape(escape_at, start))
                }
            }
            Some(ch) => Err(LexError::new(
                escape_at,
                LexErrorKind::InvalidEscape(format!("\\{}", ch)),
            )),
            None => Err(LexError::new(escape_at, LexErrorKind::UnterminatedString)),
        }
    }

    fn invalid_escape(&self, escape_at: Position, start: usize) -> LexError {
        LexError::new(
            escape_at,
            LexErrorKind::InvalidEscape(format!("\\{}", self.text_from(start))),
        )
    }

    /// `"""..."""`: no escapes; up to two extra quotes before the closing
    /// delimiter belong to the content.
    fn read_raw_string(&mut self, start: Position) -> Result<(), LexError> {
        for _ in 0..3 {
            self.advance();
        }

        loop {
            match self.current_char() {
                None => return Err(LexError::new(start, LexErrorKind::UnterminatedString)),
                Some('"') if self.peek_char(1) == Some('"') && self.peek_char(2) == Some('"') => {
                    for _ in 0..3 {
                        self.advance();
                    }
                    for _ in 0..2 {
                        if self.current_char() == Some('"') {
                            self.advance();
                        }
                    }
                    return Ok(());
                }
                Some(_) => self.advance(),
            }
        }
    }

    fn read_quoted_identifier(&mut self, start: Position) -> Result<(), LexError> {
        self.advance(); // opening backquote

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == '`' {
                // a doubled backquote is an escaped one
                if self.current_char() == Some('`') {
                    self.advance();
                } else {
                    return Ok(());
                }
            }
        }

        Err(LexError::new(start, LexErrorKind::UnterminatedIdentifier))
    }

    fn read_number(&mut self) -> TokenKind {
        let mut is_decimal = false;

        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.current_char() == Some('.') {
            is_decimal = true;
            self.advance();
            while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            let has_exponent = match self.peek_char(1) {
                Some('+' | '-') => self.peek_char(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if has_exponent {
                is_decimal = true;
                self.advance();
                if matches!(self.current_char(), Some('+' | '-')) {
                    self.advance();
                }
                while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        if is_decimal {
            TokenKind::DecimalValue
        } else {
            TokenKind::IntegerValue
        }
    }

    fn read_word(&mut self) -> TokenKind {
        let start = self.index;
        while self.current_char().is_some_and(is_identifier_part) {
            self.advance();
        }
        let word = self.text_from(start);

        if self.current_char() == Some('~') {
            let with_tilde = format!("{}~", word);
            if let Some(kind) = TokenKind::keyword(&with_tilde) {
                self.advance();
                return kind;
            }
            if is_tilde_identifier(&word) {
                self.advance();
                return TokenKind::TildeIdentifier;
            }
        }

        TokenKind::keyword(&word).unwrap_or(TokenKind::Identifier)
    }

    fn read_operator(&mut self, start: Position, ch: char) -> Result<TokenKind, LexError> {
        let followed_by_eq = self.peek_char(1) == Some('=');

        let kind = match ch {
            '=' if followed_by_eq => {
                self.advance();
                TokenKind::Eq
            }
            '!' if followed_by_eq => {
                self.advance();
                TokenKind::Neq
            }
            '<' if followed_by_eq => {
                self.advance();
                TokenKind::Lte
            }
            '>' if followed_by_eq => {
                self.advance();
                TokenKind::Gte
            }
            '=' => TokenKind::Asgn,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            ':' => TokenKind::Seq,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            '[' => TokenKind::Lb,
            ']' => TokenKind::Rb,
            '(' => TokenKind::Lp,
            ')' => TokenKind::Rp,
            '|' => TokenKind::Pipe,
            // a lone '!' included
            other => {
                return Err(LexError::new(
                    start,
                    LexErrorKind::UnexpectedCharacter(other),
                ));
            }
        };

        self.advance();
        Ok(kind)
    }

    /// Scans the next token, hidden ones (whitespace, comments) included.
    ///
    /// Returns `Eof` forever once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let start = self.position();
        let start_index = self.index;

        let kind = match self.current_char() {
            None => return Ok(Token::new(TokenKind::Eof, "", start)),
            Some(ch) if ch.is_whitespace() => {
                self.skip_whitespace();
                TokenKind::Whitespace
            }
            Some('/') if self.peek_char(1) == Some('/') => {
                self.read_line_comment();
                TokenKind::LineComment
            }
            Some('/') if self.peek_char(1) == Some('*') => {
                self.read_bracketed_comment(start)?;
                TokenKind::BracketedComment
            }
            Some('"') => {
                self.read_string(start)?;
                TokenKind::String
            }
            Some('\'') => {
                return Err(LexError::new(start, LexErrorKind::SingleQuotedString));
            }
            Some('`') => {
                self.read_quoted_identifier(start)?;
                TokenKind::QuotedIdentifier
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some('.') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()
            }
            Some(ch) if is_identifier_start(ch) => self.read_word(),
            Some(ch) => self.read_operator(start, ch)?,
        };

        Ok(Token::new(kind, self.text_from(start_index), start))
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '@'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '@'
}

fn is_tilde_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `name` can be written without back-quotes.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_identifier_start)
        && chars.all(is_identifier_part)
        && TokenKind::keyword(name).is_none()
}

/// Splits `input` into the significant tokens, ending with `Eof`.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        if token.kind.is_hidden() {
            continue;
        }
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

/// Decodes the text of a `STRING` token into its value.
///
/// Expects text the lexer accepted; malformed escapes decode to U+FFFD.
pub fn unquote_string(text: &str) -> String {
    if text.len() >= 6 && text.starts_with("\"\"\"") && text.ends_with("\"\"\"") {
        return text[3..text.len() - 3].to_string();
    }

    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('b') => result.push('\u{0008}'),
            Some('t') => result.push('\t'),
            Some('n') => result.push('\n'),
            Some('f') => result.push('\u{000C}'),
            Some('r') => result.push('\r'),
            Some('u') => {
                let digits: String = chars
                    .by_ref()
                    .skip_while(|c| *c == '{')
                    .take_while(|c| *c != '}')
                    .collect();
                let decoded = u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                result.push(decoded);
            }
            Some(other) => result.push(other),
            None => result.push(char::REPLACEMENT_CHARACTER),
        }
    }
    result
}

/// Decodes a `QUOTED_IDENTIFIER` token: strips the back-quotes and
/// collapses doubled back-quotes.
pub fn unquote_identifier(text: &str) -> String {
    text.strip_prefix('`')
        .and_then(|t| t.strip_suffix('`'))
        .unwrap_or(text)
        .replace("``", "`")
}

/// Writes `value` as a `STRING` token the lexer reads back unchanged.
pub fn quote_string(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 2);
    result.push('"');
    for ch in value.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{0008}' => result.push_str("\\b"),
            '\u{000C}' => result.push_str("\\f"),
            c if c.is_control() => result.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

/// Writes `name` as an identifier, back-quoting it when needed.
pub fn quote_identifier(name: &str) -> String {
    if is_plain_identifier(name) {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}

#[test]
fn test_keywords() {
    let kinds: Vec<TokenKind> = tokenize("and or not in~ like~ regex~ sequence")
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::InInsensitive,
            TokenKind::LikeInsensitive,
            TokenKind::RegexInsensitive,
            TokenKind::Sequence,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_hidden_tokens_are_reported_by_next_token() {
    let mut lexer = Lexer::new("a /* x */ b");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Whitespace);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::BracketedComment);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Whitespace);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
}

#[test]
fn test_string_quoting_is_reversible() {
    let value = "tab\there \"quoted\" back\\slash\u{1}";
    assert_eq!(unquote_string(&quote_string(value)), value);
    assert_eq!(unquote_identifier(&quote_identifier("odd`name")), "odd`name");
}
