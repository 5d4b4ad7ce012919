use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Location of a character in the query text.
///
/// Lines and columns are 1-based; `offset` is the byte offset from the start
/// of the input and is what slices of the original text are taken with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Position {
            line,
            column,
            offset,
        }
    }

    /// Start of the input.
    pub fn start() -> Self {
        Position::new(1, 1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Terminal symbols of the EQL grammar.
///
/// Ordered by declaration; expected-token lists are reported in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TokenKind {
    // Keywords
    /// `and`
    And,
    /// `any`
    Any,
    /// `by`
    By,
    /// `false`
    False,
    /// `in`
    In,
    /// `in~`
    InInsensitive,
    /// `join`
    Join,
    /// `like`
    Like,
    /// `like~`
    LikeInsensitive,
    /// `maxspan`
    Maxspan,
    /// `not`
    Not,
    /// `null`
    Null,
    /// `of`
    Of,
    /// `or`
    Or,
    /// `regex`
    Regex,
    /// `regex~`
    RegexInsensitive,
    /// `sequence`
    Sequence,
    /// `true`
    True,
    /// `until`
    Until,
    /// `where`
    Where,
    /// `with`
    With,

    // Operators
    /// `:`, the case-insensitive equality predicate
    Seq,
    /// `=`, only used in `with key = value` parameters
    Asgn,
    /// `==`
    Eq,
    /// `!=`
    Neq,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `[`
    Lb,
    /// `]`
    Rb,
    /// `(`
    Lp,
    /// `)`
    Rp,
    /// `|`
    Pipe,

    // Literals
    /// Double-quoted or triple-quoted string
    ///
    /// # Examples
    /// ```text
    /// "cmd.exe"
    /// "C:\\Windows"
    /// """raw \ string"""
    /// ```
    String,
    /// Digits only
    IntegerValue,
    /// Digits with a fraction and/or an exponent
    ///
    /// # Examples
    /// ```text
    /// 1.5
    /// .5
    /// 2E10
    /// ```
    DecimalValue,
    /// Field, event category or function name
    Identifier,
    /// Back-quoted name, never a keyword
    ///
    /// # Examples
    /// ```text
    /// `process name`
    /// `sequence`
    /// ```
    QuotedIdentifier,
    /// Function name with a trailing `~` marking the case-insensitive variant
    ///
    /// # Examples
    /// ```text
    /// startsWith~
    /// ```
    TildeIdentifier,

    // Hidden channel
    /// `// ...` up to end of line
    LineComment,
    /// `/* ... */`, may nest
    BracketedComment,
    /// Spaces, tabs, carriage returns and newlines
    Whitespace,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Maps a word to its keyword, if it is one.
    ///
    /// Keywords are lowercase; `AND` is an identifier.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        use TokenKind::*;
        let kind = match word {
            "and" => And,
            "any" => Any,
            "by" => By,
            "false" => False,
            "in" => In,
            "in~" => InInsensitive,
            "join" => Join,
            "like" => Like,
            "like~" => LikeInsensitive,
            "maxspan" => Maxspan,
            "not" => Not,
            "null" => Null,
            "of" => Of,
            "or" => Or,
            "regex" => Regex,
            "regex~" => RegexInsensitive,
            "sequence" => Sequence,
            "true" => True,
            "until" => Until,
            "where" => Where,
            "with" => With,
            _ => return None,
        };
        Some(kind)
    }

    /// Fixed spelling of keyword and operator tokens.
    pub fn literal(&self) -> Option<&'static str> {
        use TokenKind::*;
        let text = match self {
            And => "and",
            Any => "any",
            By => "by",
            False => "false",
            In => "in",
            InInsensitive => "in~",
            Join => "join",
            Like => "like",
            LikeInsensitive => "like~",
            Maxspan => "maxspan",
            Not => "not",
            Null => "null",
            Of => "of",
            Or => "or",
            Regex => "regex",
            RegexInsensitive => "regex~",
            Sequence => "sequence",
            True => "true",
            Until => "until",
            Where => "where",
            With => "with",
            Seq => ":",
            Asgn => "=",
            Eq => "==",
            Neq => "!=",
            Lt => "<",
            Lte => "<=",
            Gt => ">",
            Gte => ">=",
            Plus => "+",
            Minus => "-",
            Asterisk => "*",
            Slash => "/",
            Percent => "%",
            Dot => ".",
            Comma => ",",
            Lb => "[",
            Rb => "]",
            Lp => "(",
            Rp => ")",
            Pipe => "|",
            _ => return None,
        };
        Some(text)
    }

    /// Symbolic name for tokens without a fixed spelling.
    pub fn symbolic_name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            String => "STRING",
            IntegerValue => "INTEGER_VALUE",
            DecimalValue => "DECIMAL_VALUE",
            Identifier => "IDENTIFIER",
            QuotedIdentifier => "QUOTED_IDENTIFIER",
            TildeIdentifier => "TILDE_IDENTIFIER",
            LineComment => "LINE_COMMENT",
            BracketedComment => "BRACKETED_COMMENT",
            Whitespace => "WS",
            Eof => "<EOF>",
            _ => "<KEYWORD>",
        }
    }

    /// Whitespace and comments: tracked for positions, skipped by the parser.
    pub fn is_hidden(&self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BracketedComment | TokenKind::Whitespace
        )
    }

    pub fn is_keyword(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            And | Any
                | By
                | False
                | In
                | InInsensitive
                | Join
                | Like
                | LikeInsensitive
                | Maxspan
                | Not
                | Null
                | Of
                | Or
                | Regex
                | RegexInsensitive
                | Sequence
                | True
                | Until
                | Where
                | With
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.literal() {
            Some(text) => write!(f, "'{}'", text),
            None => f.write_str(self.symbolic_name()),
        }
    }
}

/// A lexical token.
///
/// `text` is the exact slice of the input the token was scanned from,
/// quotes and escapes included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    /// Byte offset one past the last character of the token.
    pub fn end(&self) -> usize {
        self.position.offset + self.text.len()
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("<EOF>"),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

/// Where an AST node came from: its start position and the original text.
///
/// Parsed sources share one copy of the query text and only keep the byte
/// range they cover, so building a tree never copies the input per node.
///
/// Sources never take part in node equality or hashing: two nodes parsed
/// from differently formatted queries compare equal when their structure
/// does.
#[derive(Clone, Default)]
pub struct Source {
    pub position: Position,
    query: Arc<str>,
    range: Range<usize>,
}

impl Source {
    /// Source covering all of `text`.
    pub fn new(position: Position, text: impl Into<Arc<str>>) -> Self {
        let query: Arc<str> = text.into();
        let range = 0..query.len();
        Source {
            position,
            query,
            range,
        }
    }

    /// The part of `query` between `position` and byte offset `end`.
    pub fn slice(query: &Arc<str>, position: Position, end: usize) -> Self {
        let range = match query.get(position.offset..end) {
            Some(_) => position.offset..end,
            None => 0..0,
        };
        Source {
            position,
            query: Arc::clone(query),
            range,
        }
    }

    /// Source for nodes built programmatically rather than parsed.
    pub fn synthetic() -> Self {
        Source::default()
    }

    pub fn text(&self) -> &str {
        self.query.get(self.range.clone()).unwrap_or_default()
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("position", &self.position)
            .field("text", &self.text())
            .finish()
    }
}

impl Serialize for Source {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Source", 2)?;
        state.serialize_field("position", &self.position)?;
        state.serialize_field("text", self.text())?;
        state.end()
    }
}

impl PartialEq for Source {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Source {}

impl std::hash::Hash for Source {
    fn hash<H: std::hash::Hasher>(&self, _state: &mut H) {}
}
