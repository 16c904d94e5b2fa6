//! Parameter Value Language (PVL), the label syntax of ISIS cubes.
//!
//! Supported subset:
//! * `Object = Name ... End_Object` and `Group = Name ... End_Group` blocks (objects nest);
//! * `Keyword = value` where the value is a bare word, a number, a quoted string or a
//!   parenthesised list, optionally followed by a unit such as `<mm>`;
//! * `/* ... */` comments and lines starting with `#`;
//! * a terminating `End` statement. Anything after it (binary cube data) is ignored.
//!
//! Lookups are case-insensitive, as in ISIS.

use crate::error::IsisError;
use std::borrow::Cow;
use std::str::FromStr;

/// A `Keyword = value` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PvlKeyword {
    name: String,
    values: Vec<String>,
    unit: Option<String>,
}

impl PvlKeyword {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First (or only) value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Parses the first value.
    ///
    /// # Errors
    /// Returns [`IsisError::InvalidValue`] if the keyword is empty or does not parse as `T`.
    pub fn parse<T: FromStr>(&self) -> Result<T, IsisError> {
        let raw = self.value().unwrap_or_default();
        raw.parse().map_err(|_| IsisError::invalid(self.name.clone(), raw))
    }

    /// Parses every value of a list keyword.
    ///
    /// # Errors
    /// Returns [`IsisError::InvalidValue`] for the first element that does not parse as `T`.
    pub fn parse_all<T: FromStr>(&self) -> Result<Vec<T>, IsisError> {
        self.values
            .iter()
            .map(|raw| raw.parse().map_err(|_| IsisError::invalid(self.name.clone(), raw.as_str())))
            .collect()
    }
}

/// A `Group = Name` block. Groups hold keywords only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PvlGroup {
    name: String,
    keywords: Vec<PvlKeyword>,
}

impl PvlGroup {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn keyword(&self, name: &str) -> Option<&PvlKeyword> {
        find(&self.keywords, name, PvlKeyword::name)
    }

    /// Same as [`PvlGroup::keyword`], but absence is an error naming `Group/Keyword`.
    ///
    /// # Errors
    /// Returns [`IsisError::MissingKeyword`] if the keyword is absent.
    pub fn require(&self, name: &str) -> Result<&PvlKeyword, IsisError> {
        self.keyword(name).ok_or_else(|| IsisError::missing(format!("{}/{name}", self.name)))
    }

    #[must_use]
    pub fn keywords(&self) -> &[PvlKeyword] {
        &self.keywords
    }
}

/// An `Object = Name` block, or the unnamed root of a label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PvlObject {
    name: String,
    keywords: Vec<PvlKeyword>,
    groups: Vec<PvlGroup>,
    objects: Vec<Self>,
}

impl PvlObject {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn keyword(&self, name: &str) -> Option<&PvlKeyword> {
        find(&self.keywords, name, PvlKeyword::name)
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&PvlGroup> {
        find(&self.groups, name, PvlGroup::name)
    }

    #[must_use]
    pub fn object(&self, name: &str) -> Option<&Self> {
        find(&self.objects, name, Self::name)
    }

    /// # Errors
    /// Returns [`IsisError::MissingKeyword`] if the group is absent.
    pub fn require_group(&self, name: &str) -> Result<&PvlGroup, IsisError> {
        self.group(name).ok_or_else(|| IsisError::missing(format!("{}/{name}", self.name)))
    }

    /// # Errors
    /// Returns [`IsisError::MissingKeyword`] if the object is absent.
    pub fn require_object(&self, name: &str) -> Result<&Self, IsisError> {
        self.object(name).ok_or_else(|| IsisError::missing(format!("{}/{name}", self.name)))
    }

    /// # Errors
    /// Returns [`IsisError::MissingKeyword`] if the keyword is absent.
    pub fn require(&self, name: &str) -> Result<&PvlKeyword, IsisError> {
        self.keyword(name).ok_or_else(|| IsisError::missing(format!("{}/{name}", self.name)))
    }

    #[must_use]
    pub fn groups(&self) -> &[PvlGroup] {
        &self.groups
    }

    #[must_use]
    pub fn objects(&self) -> &[Self] {
        &self.objects
    }
}

/// A parsed label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pvl {
    root: PvlObject,
}

impl Pvl {
    /// Top-level statements of the label.
    #[must_use]
    pub const fn root(&self) -> &PvlObject {
        &self.root
    }

    /// Parses label text.
    ///
    /// # Errors
    /// Returns [`IsisError::Label`] with the offending line for malformed input.
    pub fn parse(text: &str) -> Result<Self, IsisError> {
        let tokens = tokenize(text)?;
        let mut parser = Parser { tokens, pos: 0 };
        let root = parser.block(Block::Root)?;
        Ok(Self { root })
    }
}

impl FromStr for Pvl {
    type Err = IsisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Returns the label portion of an attached-label cube: everything up to and including the
/// first line that reads `End`, or `None` if no such line exists in `bytes`.
#[must_use]
pub fn label_prefix(bytes: &[u8]) -> Option<Cow<'_, str>> {
    let mut offset = 0;
    for line in bytes.split(|b| *b == b'\n') {
        offset += line.len() + 1;
        let trimmed = line.strip_suffix(b"\r").unwrap_or(line);
        if trimmed.trim_ascii().eq_ignore_ascii_case(b"end") {
            let end = offset.min(bytes.len());
            return Some(String::from_utf8_lossy(&bytes[..end]));
        }
    }
    None
}

fn find<'a, T>(items: &'a [T], name: &str, key: impl Fn(&T) -> &str) -> Option<&'a T> {
    items.iter().find(|item| key(item).eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Unit(String),
    Equals,
    Open,
    Close,
    Comma,
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
}

fn syntax(line: usize, message: impl Into<Cow<'static, str>>) -> IsisError {
    IsisError::Label { line, message: message.into(), context: None }
}

fn tokenize(text: &str) -> Result<Vec<Spanned>, IsisError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;
    let mut at_line_start = true;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                chars.next();
                line += 1;
                at_line_start = true;
                continue;
            },
            c if c.is_whitespace() => {
                chars.next();
                continue;
            },
            '#' if at_line_start => {
                while chars.next_if(|c| *c != '\n').is_some() {}
                continue;
            },
            _ => {},
        }
        at_line_start = false;
        let start_line = line;

        let token = match c {
            '=' => {
                chars.next();
                Token::Equals
            },
            '(' | '{' => {
                chars.next();
                Token::Open
            },
            ')' | '}' => {
                chars.next();
                Token::Close
            },
            ',' => {
                chars.next();
                Token::Comma
            },
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some(q) if q == c => break,
                        Some('\n') => {
                            line += 1;
                            value.push(' ');
                        },
                        Some(other) => value.push(other),
                        None => return Err(syntax(start_line, "unterminated quoted string")),
                    }
                }
                Token::Quoted(collapse_whitespace(&value))
            },
            '<' => {
                chars.next();
                let mut unit = String::new();
                loop {
                    match chars.next() {
                        Some('>') => break,
                        Some('\n') | None => return Err(syntax(start_line, "unterminated unit")),
                        Some(other) => unit.push(other),
                    }
                }
                Token::Unit(unit.trim().to_owned())
            },
            '/' if is_comment_start(&chars) => {
                chars.next();
                chars.next();
                let mut prev = '\0';
                loop {
                    match chars.next() {
                        Some('/') if prev == '*' => break,
                        Some(other) => {
                            if other == '\n' {
                                line += 1;
                            }
                            prev = other;
                        },
                        None => return Err(syntax(start_line, "unterminated comment")),
                    }
                }
                continue;
            },
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '=' | '(' | ')' | '{' | '}' | ',' | '<' | '"')
                    {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                Token::Word(word)
            },
        };

        tokens.push(Spanned { token, line: start_line });
    }

    Ok(tokens)
}

fn is_comment_start(chars: &std::iter::Peekable<std::str::Chars<'_>>) -> bool {
    let mut ahead = chars.clone();
    ahead.next();
    ahead.next() == Some('*')
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Root,
    Object,
    Group,
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map_or(1, |t| t.line)
    }

    fn block(&mut self, kind: Block) -> Result<PvlObject, IsisError> {
        let mut object = PvlObject::default();

        loop {
            let Some(Spanned { token, line }) = self.next() else {
                return match kind {
                    // A label cut short of its `End` statement is still usable.
                    Block::Root => Ok(object),
                    Block::Object => Err(syntax(self.last_line(), "missing End_Object")),
                    Block::Group => Err(syntax(self.last_line(), "missing End_Group")),
                };
            };
            let Token::Word(word) = &token else {
                return Err(syntax(line, format!("expected a keyword, found {token:?}")));
            };
            let word = word.clone();

            if word.eq_ignore_ascii_case("end") {
                if kind != Block::Root {
                    return Err(syntax(line, "unexpected End inside a block"));
                }
                return Ok(object);
            }
            if word.eq_ignore_ascii_case("end_object") {
                return if kind == Block::Object {
                    self.skip_block_name();
                    Ok(object)
                } else {
                    Err(syntax(line, "End_Object without matching Object"))
                };
            }
            if word.eq_ignore_ascii_case("end_group") {
                return if kind == Block::Group {
                    self.skip_block_name();
                    Ok(object)
                } else {
                    Err(syntax(line, "End_Group without matching Group"))
                };
            }

            let is_object = word.eq_ignore_ascii_case("object");
            let is_group = word.eq_ignore_ascii_case("group") || word.eq_ignore_ascii_case("begin_group");
            if (is_object || is_group) && kind == Block::Group {
                return Err(syntax(line, "groups cannot contain objects or groups"));
            }

            self.expect_equals(line, &word)?;
            let (values, unit) = self.value(line)?;

            if is_object || is_group {
                let name = values.into_iter().next().unwrap_or_default();
                let mut child = self.block(if is_object { Block::Object } else { Block::Group })?;
                child.name = name;
                if is_object {
                    object.objects.push(child);
                } else {
                    object.groups.push(PvlGroup { name: child.name, keywords: child.keywords });
                }
            } else {
                object.keywords.push(PvlKeyword { name: word, values, unit });
            }
        }
    }

    fn skip_block_name(&mut self) {
        if matches!(self.peek(), Some(Spanned { token: Token::Equals, .. })) {
            self.pos += 2;
        }
    }

    fn expect_equals(&mut self, line: usize, keyword: &str) -> Result<(), IsisError> {
        match self.next() {
            Some(Spanned { token: Token::Equals, .. }) => Ok(()),
            _ => Err(syntax(line, format!("expected '=' after {keyword}"))),
        }
    }

    fn value(&mut self, line: usize) -> Result<(Vec<String>, Option<String>), IsisError> {
        let mut values = Vec::new();
        let mut unit = None;

        match self.next().map(|t| t.token) {
            Some(Token::Word(w) | Token::Quoted(w)) => values.push(w),
            Some(Token::Open) => loop {
                match self.next().map(|t| t.token) {
                    Some(Token::Word(w) | Token::Quoted(w)) => values.push(w),
                    Some(Token::Unit(u)) => unit = Some(u),
                    Some(Token::Comma) => {},
                    Some(Token::Close) => break,
                    _ => return Err(syntax(line, "unterminated list value")),
                }
            },
            _ => return Err(syntax(line, "missing value")),
        }

        if let Some(Spanned { token: Token::Unit(u), .. }) = self.peek() {
            unit = Some(u.clone());
            self.pos += 1;
        }

        Ok((values, unit))
    }
}
