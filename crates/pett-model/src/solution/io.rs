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

use super::Solution;
use crate::err::SolutionReadError;
use crate::instance::Instance;
use pett_core::prelude::*;
use std::io::{BufRead, Write};

impl Solution<'_> {
    /// Write the solution in the benchmark's `.sln` format: one
    /// `"<time> <room>"` line per event, `-1 -1` for unassigned events.
    pub fn write<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        for event in 0..self.instance().n_events() {
            let rat = self.rat_at(event);
            if rat.assigned() {
                writeln!(w, "{} {}", rat.time, rat.room)?;
            } else {
                writeln!(w, "-1 -1")?;
            }
        }
        Ok(())
    }
}

impl Instance {
    /// Read a `.sln` file back into a solution over this instance.
    pub fn parse_solution<R: BufRead>(&self, r: R) -> Result<Solution<'_>, SolutionReadError> {
        let mut soln = self.solution();
        let mut lines = r.lines();

        for (event, line) in (0..self.n_events()).zip(1..) {
            let text = match lines.next() {
                Some(text) => text?,
                None => return Err(SolutionReadError::UnexpectedEof { line }),
            };

            let mut fields = text.split_whitespace();
            let (Some(time_tok), Some(room_tok)) = (fields.next(), fields.next()) else {
                return Err(SolutionReadError::MissingFields { line });
            };
            let time: i64 = time_tok
                .parse()
                .map_err(|err| SolutionReadError::ParseInt { line, err })?;
            let room: i64 = room_tok
                .parse()
                .map_err(|err| SolutionReadError::ParseInt { line, err })?;

            if time == -1 && room == -1 {
                continue;
            }
            if !(0..NTIMES as i64).contains(&time) {
                return Err(SolutionReadError::TimeOutOfRange { line, time });
            }
            if !(0..self.n_rooms() as i64).contains(&room) {
                return Err(SolutionReadError::RoomOutOfRange { line, room });
            }

            soln.assign(event, Rat::new(room as u32, time as u32));
        }

        Ok(soln)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::small_instance;
    use pett_core::prelude::*;

    #[test]
    fn test_write_format() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(1, 3));

        let mut out = Vec::new();
        soln.write(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3 1\n-1 -1\n");
    }

    #[test]
    fn test_write_then_parse_round_trips_value() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 2));
        soln.assign(1, Rat::new(1, 11));
        let value = soln.value();

        let mut out = Vec::new();
        soln.write(&mut out).unwrap();
        let parsed = inst.parse_solution(out.as_slice()).unwrap();

        assert_eq!(parsed, soln);
        assert_eq!(parsed.value(), value);
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        let inst = small_instance();
        assert!(matches!(
            inst.parse_solution("45 0\n0 0\n".as_bytes()),
            Err(crate::err::SolutionReadError::TimeOutOfRange { line: 1, time: 45 })
        ));
        assert!(matches!(
            inst.parse_solution("0 2\n0 0\n".as_bytes()),
            Err(crate::err::SolutionReadError::RoomOutOfRange { line: 1, room: 2 })
        ));
    }

    #[test]
    fn test_parse_rejects_short_file() {
        let inst = small_instance();
        assert!(matches!(
            inst.parse_solution("0 0\n".as_bytes()),
            Err(crate::err::SolutionReadError::UnexpectedEof { line: 2 })
        ));
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let inst = small_instance();
        assert!(matches!(
            inst.parse_solution("0\n0 0\n".as_bytes()),
            Err(crate::err::SolutionReadError::MissingFields { line: 1 })
        ));
    }
}
