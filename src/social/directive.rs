use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead};
use std::str::FromStr;

use crate::social::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    AddUser,
    AddFriends,
}

impl DirectiveKind {
    #[must_use]
    #[inline]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::AddUser => "adduser",
            Self::AddFriends => "addfriends",
        }
    }

    /// Number of name tokens the directive consumes.
    #[must_use]
    #[inline]
    pub const fn arity(self) -> usize {
        match self {
            Self::AddUser => 1,
            Self::AddFriends => 2,
        }
    }
}

impl fmt::Display for DirectiveKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Why a token is not a directive keyword.
///
/// - `Unknown`: any token other than `adduser` or `addfriends`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum DirectiveParseError {
    #[default]
    Unknown,
}

impl FromStr for DirectiveKind {
    type Err = DirectiveParseError;

    /// Keywords are matched exactly, `AddUser` is not a directive.
    #[inline]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "adduser" => Ok(Self::AddUser),
            "addfriends" => Ok(Self::AddFriends),
            _ => Err(DirectiveParseError::Unknown),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    AddUser(String),
    AddFriends(String, String),
}

impl Directive {
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> DirectiveKind {
        match self {
            Self::AddUser(_) => DirectiveKind::AddUser,
            Self::AddFriends(_, _) => DirectiveKind::AddFriends,
        }
    }
}

/// Whitespace-delimited tokens of a reader, crossing line boundaries.
pub struct Tokens<R> {
    reader: R,
    pending: VecDeque<String>,
    line: String,
}

impl<R: BufRead> Tokens<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
            line: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for Tokens<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }

            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => self
                    .pending
                    .extend(self.line.split_whitespace().map(str::to_owned)),
                Err(error) => return Some(Err(error)),
            }
        }
    }
}

/// Greedy directive reader over one source.
///
/// A keyword always consumes the following tokens as names, even if they are
/// keywords themselves. Tokens that do not start a directive are skipped.
/// Running out of tokens inside a directive yields [`Error::MissingArgument`].
pub struct Directives<R> {
    tokens: Tokens<R>,
    source_name: String,
}

impl<R: BufRead> Directives<R> {
    #[must_use]
    pub fn new(reader: R, source_name: impl Into<String>) -> Self {
        Self {
            tokens: Tokens::new(reader),
            source_name: source_name.into(),
        }
    }

    fn io_error(&self, error: io::Error) -> Error {
        Error::Io {
            source_name: self.source_name.clone(),
            error,
        }
    }

    fn argument(&mut self, kind: DirectiveKind, found: usize) -> Result<String> {
        match self.tokens.next() {
            Some(Ok(token)) => Ok(token),
            Some(Err(error)) => Err(self.io_error(error)),
            None => Err(Error::MissingArgument {
                source_name: self.source_name.clone(),
                directive: kind,
                expected: kind.arity(),
                found,
            }),
        }
    }

    fn directive(&mut self, kind: DirectiveKind) -> Result<Directive> {
        Ok(match kind {
            DirectiveKind::AddUser => Directive::AddUser(self.argument(kind, 0)?),
            DirectiveKind::AddFriends => {
                let first = self.argument(kind, 0)?;
                let second = self.argument(kind, 1)?;
                Directive::AddFriends(first, second)
            }
        })
    }
}

impl<R: BufRead> Iterator for Directives<R> {
    type Item = Result<Directive>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let token = match self.tokens.next()? {
                Ok(token) => token,
                Err(error) => return Some(Err(self.io_error(error))),
            };

            if let Ok(kind) = token.parse::<DirectiveKind>() {
                return Some(self.directive(kind));
            }
        }
    }
}
