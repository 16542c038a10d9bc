// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::num::ParseIntError;

/// A structural problem with the parsed tables themselves, independent of any
/// file they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    NonPositiveCounts,
    TableDimensionMismatch {
        table: &'static str,
        expected: usize,
        got: usize,
    },
}

impl std::fmt::Display for InstanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceError::NonPositiveCounts => {
                write!(f, "event, room, and student counts must be positive")
            }
            InstanceError::TableDimensionMismatch {
                table,
                expected,
                got,
            } => write!(
                f,
                "table {} has {} entries; expected {}",
                table, got, expected
            ),
        }
    }
}

impl std::error::Error for InstanceError {}

/// What went wrong on a particular line of an instance file.
#[derive(Debug)]
pub enum LoadErrorKind {
    Io(std::io::Error),
    ParseInt(ParseIntError),
    UnexpectedEof,
    ExpectedBool(i64),
    ExpectedOrdering(i64),
    ExpectedCount(usize, usize),
    Instance(InstanceError),
}

impl std::fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use LoadErrorKind::*;
        match self {
            Io(e) => write!(f, "I/O error: {e}"),
            ParseInt(e) => write!(f, "{e}"),
            UnexpectedEof => write!(f, "unexpected end of file"),
            ExpectedBool(n) => write!(f, "expected either 0 or 1; got {n} instead"),
            ExpectedOrdering(n) => write!(f, "expected -1, 0, or 1; got {n} instead"),
            ExpectedCount(want, got) => write!(f, "expected {want} integers; got {got}"),
            Instance(e) => write!(f, "{e}"),
        }
    }
}

/// An instance-file parse error. Carries the 1-based line number at which the
/// underlying problem was detected.
#[derive(Debug)]
pub struct LoadError {
    pub line: usize,
    pub kind: LoadErrorKind,
}

impl LoadError {
    #[inline]
    pub fn new(line: usize, kind: LoadErrorKind) -> Self {
        Self { line, kind }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid format at line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            LoadErrorKind::Io(e) => Some(e),
            LoadErrorKind::ParseInt(e) => Some(e),
            LoadErrorKind::Instance(e) => Some(e),
            _ => None,
        }
    }
}

/// A solution-file parse error.
#[derive(Debug)]
pub enum SolutionReadError {
    Io(std::io::Error),
    ParseInt { line: usize, err: ParseIntError },
    MissingFields { line: usize },
    UnexpectedEof { line: usize },
    RoomOutOfRange { line: usize, room: i64 },
    TimeOutOfRange { line: usize, time: i64 },
}

impl std::fmt::Display for SolutionReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SolutionReadError::*;
        match self {
            Io(e) => write!(f, "I/O error: {e}"),
            ParseInt { line, err } => write!(f, "invalid format at line {line}: {err}"),
            MissingFields { line } => {
                write!(f, "invalid format at line {line}: expected \"time room\"")
            }
            UnexpectedEof { line } => write!(f, "unexpected end of file at line {line}"),
            RoomOutOfRange { line, room } => {
                write!(f, "invalid format at line {line}: room {room} out of range")
            }
            TimeOutOfRange { line, time } => {
                write!(f, "invalid format at line {line}: time {time} out of range")
            }
        }
    }
}

impl std::error::Error for SolutionReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolutionReadError::Io(e) => Some(e),
            SolutionReadError::ParseInt { err, .. } => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SolutionReadError {
    fn from(e: std::io::Error) -> Self {
        SolutionReadError::Io(e)
    }
}
