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

/// Number of teaching days in the timetable grid.
pub const NDAYS: usize = 5;

/// Number of teaching hours per day.
pub const HOURS_PER_DAY: usize = 9;

/// Total number of timeslots (5 days of 9 hours each).
pub const NTIMES: usize = NDAYS * HOURS_PER_DAY;

/// A room-and-time pair: the value a scheduled event takes.
///
/// The all-ones sentinel [`Rat::UNASSIGNED`] marks an event without an
/// assignment. Assigned rats always satisfy `time < NTIMES`.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rat {
    pub room: u32,
    pub time: u32,
}

impl Rat {
    pub const UNASSIGNED: Rat = Rat {
        room: u32::MAX,
        time: u32::MAX,
    };

    #[inline]
    pub const fn new(room: u32, time: u32) -> Self {
        Self { room, time }
    }

    #[inline]
    pub const fn assigned(&self) -> bool {
        self.room != u32::MAX && self.time != u32::MAX
    }

    /// Linear index of this rat in the room-major `rooms * NTIMES` table.
    #[inline]
    pub const fn index(&self) -> usize {
        self.room as usize * NTIMES + self.time as usize
    }

    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self {
            room: (index / NTIMES) as u32,
            time: (index % NTIMES) as u32,
        }
    }

    /// The day of this rat's timeslot.
    #[inline]
    pub const fn day(&self) -> usize {
        self.time as usize / HOURS_PER_DAY
    }

    /// The hour-within-day of this rat's timeslot.
    #[inline]
    pub const fn hour(&self) -> usize {
        self.time as usize % HOURS_PER_DAY
    }

    /// Whether this rat's timeslot is strictly later than `other`'s.
    #[inline]
    pub const fn after(&self, other: Rat) -> bool {
        self.time > other.time
    }

    /// Whether this rat's timeslot is strictly earlier than `other`'s.
    #[inline]
    pub const fn before(&self, other: Rat) -> bool {
        self.time < other.time
    }
}

impl std::fmt::Display for Rat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.assigned() {
            write!(f, "Rat(room: {}, time: {})", self.room, self.time)
        } else {
            write!(f, "Rat(unassigned)")
        }
    }
}
