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

use fixedbitset::FixedBitSet;

/// A timetabling event (a class or an exam) with everything precomputed that
/// the hot path needs: feasible times, feasible rooms, the precedence
/// neighbourhood, the exclusion neighbourhood, and the attending students.
#[derive(Debug, Clone)]
pub struct Event {
    id: u32,
    times: FixedBitSet,
    rooms: Vec<u32>,
    before: Vec<u32>,
    after: Vec<u32>,
    exclude: Vec<u32>,
    students: Vec<u32>,
}

impl Event {
    #[inline]
    pub(crate) fn new(
        id: u32,
        times: FixedBitSet,
        rooms: Vec<u32>,
        before: Vec<u32>,
        after: Vec<u32>,
        exclude: Vec<u32>,
        students: Vec<u32>,
    ) -> Self {
        Self {
            id,
            times,
            rooms,
            before,
            after,
            exclude,
            students,
        }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The timeslots in which this event may be scheduled.
    #[inline]
    pub fn times(&self) -> &FixedBitSet {
        &self.times
    }

    #[inline]
    pub fn time_available(&self, time: u32) -> bool {
        self.times.contains(time as usize)
    }

    /// The rooms that can host this event, sorted ascending.
    #[inline]
    pub fn rooms(&self) -> &[u32] {
        &self.rooms
    }

    /// Events that must occur strictly before this one.
    #[inline]
    pub fn before(&self) -> &[u32] {
        &self.before
    }

    /// Events that must occur strictly after this one.
    #[inline]
    pub fn after(&self) -> &[u32] {
        &self.after
    }

    /// Events sharing at least one student with this one; no two of them may
    /// occupy the same timeslot without penalty.
    #[inline]
    pub fn exclude(&self) -> &[u32] {
        &self.exclude
    }

    #[inline]
    pub fn students(&self) -> &[u32] {
        &self.students
    }

    #[inline]
    pub fn attendance(&self) -> usize {
        self.students.len()
    }
}
