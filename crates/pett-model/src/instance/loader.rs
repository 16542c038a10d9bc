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

use crate::err::{InstanceError, LoadError, LoadErrorKind};
use crate::instance::{Instance, InstanceTables};
use pett_core::prelude::NTIMES;
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

/// Reads ITC-2007 track-2 instance files.
///
/// The format is strictly line-oriented: a header of four integers, then one
/// integer per line for every table cell, in the order capacities, attends,
/// room-feature, event-feature, event-time, event-ordering. Parse errors
/// carry the 1-based line number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceLoader;

impl InstanceLoader {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    pub fn from_bufread<R: BufRead>(&self, br: R) -> Result<Instance, LoadError> {
        let mut sc = Scanner::new(br);

        let header = sc.next_line_ints(4)?;
        if header.iter().any(|&n| n < 0) {
            return Err(LoadError::new(
                sc.line(),
                LoadErrorKind::Instance(InstanceError::NonPositiveCounts),
            ));
        }
        let (n_events, n_rooms, n_features, n_students) = (
            header[0] as usize,
            header[1] as usize,
            header[2] as usize,
            header[3] as usize,
        );

        let mut tables = InstanceTables::blank(n_events, n_rooms, n_features, n_students);

        for capacity in tables.room_capacities.iter_mut() {
            *capacity = sc.next_i64()? as u32;
        }
        for cell in tables.attends.iter_mut() {
            *cell = sc.next_bool()?;
        }
        for cell in tables.room_features.iter_mut() {
            *cell = sc.next_bool()?;
        }
        for cell in tables.event_features.iter_mut() {
            *cell = sc.next_bool()?;
        }
        for event in 0..n_events {
            for time in 0..NTIMES {
                tables.event_times[event * NTIMES + time] = sc.next_bool()?;
            }
        }
        for cell in tables.ordering.iter_mut() {
            *cell = sc.next_ordering()?;
        }

        Instance::new(tables)
            .map_err(|e| LoadError::new(sc.line(), LoadErrorKind::Instance(e)))
    }

    #[inline]
    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<Instance, LoadError> {
        let file =
            File::open(path).map_err(|e| LoadError::new(0, LoadErrorKind::Io(e)))?;
        self.from_bufread(BufReader::new(file))
    }

    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<Instance, LoadError> {
        self.from_bufread(BufReader::new(r))
    }

    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Instance, LoadError> {
        self.from_reader(s.as_bytes())
    }
}

/// Line-oriented integer scanner with a running line count. Blank lines are
/// skipped, which tolerates trailing newlines in the benchmark files.
struct Scanner<R: BufRead> {
    rdr: R,
    buf: String,
    line: usize,
}

impl<R: BufRead> Scanner<R> {
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            line: 0,
        }
    }

    #[inline]
    fn line(&self) -> usize {
        self.line
    }

    #[inline]
    fn err(&self, kind: LoadErrorKind) -> LoadError {
        LoadError::new(self.line, kind)
    }

    /// Advance to the next non-blank line.
    fn fill_line(&mut self) -> Result<(), LoadError> {
        loop {
            self.buf.clear();
            self.line += 1;
            let n = self
                .rdr
                .read_line(&mut self.buf)
                .map_err(|e| self.err(LoadErrorKind::Io(e)))?;
            if n == 0 {
                return Err(self.err(LoadErrorKind::UnexpectedEof));
            }
            if !self.buf.trim().is_empty() {
                return Ok(());
            }
        }
    }

    /// Read a line holding exactly `n` whitespace-separated integers.
    fn next_line_ints(&mut self, n: usize) -> Result<Vec<i64>, LoadError> {
        self.fill_line()?;
        let mut out = Vec::with_capacity(n);
        for tok in self.buf.split_whitespace() {
            out.push(
                tok.parse::<i64>()
                    .map_err(|e| self.err(LoadErrorKind::ParseInt(e)))?,
            );
        }
        if out.len() != n {
            return Err(self.err(LoadErrorKind::ExpectedCount(n, out.len())));
        }
        Ok(out)
    }

    #[inline]
    fn next_i64(&mut self) -> Result<i64, LoadError> {
        Ok(self.next_line_ints(1)?[0])
    }

    #[inline]
    fn next_bool(&mut self) -> Result<bool, LoadError> {
        match self.next_i64()? {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(self.err(LoadErrorKind::ExpectedBool(n))),
        }
    }

    #[inline]
    fn next_ordering(&mut self) -> Result<i8, LoadError> {
        match self.next_i64()? {
            -1 => Ok(-1),
            0 => Ok(0),
            1 => Ok(1),
            n => Err(self.err(LoadErrorKind::ExpectedOrdering(n))),
        }
    }
}
