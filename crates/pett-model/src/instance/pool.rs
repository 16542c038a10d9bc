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

use parking_lot::Mutex;
use pett_core::prelude::*;
use smallvec::SmallVec;

/// The events occupying one slot of an occupancy table. A singleton in
/// correct solutions; transient search states may briefly hold two or more.
pub type Occupants = SmallVec<[u32; 2]>;

/// The backing tables of one solution, detached from the instance so they can
/// sit in the free list.
#[derive(Debug, Clone)]
pub(crate) struct Buffers {
    pub rats: Vec<Rat>,
    pub slots: Vec<Occupants>,
    pub attendance: Vec<Occupants>,
}

impl Buffers {
    fn alloc(n_events: usize, n_slots: usize, n_cells: usize) -> Self {
        Self {
            rats: vec![Rat::UNASSIGNED; n_events],
            slots: vec![Occupants::new(); n_slots],
            attendance: vec![Occupants::new(); n_cells],
        }
    }

    /// Restore the empty-solution state in place, keeping allocations.
    fn clear(&mut self) {
        self.rats.fill(Rat::UNASSIGNED);
        for cell in &mut self.slots {
            cell.clear();
        }
        for cell in &mut self.attendance {
            cell.clear();
        }
    }
}

/// A thread-safe free list of solution tables. Construction only happens on a
/// miss; the steady state of the search never allocates here.
#[derive(Debug, Default)]
pub(crate) struct SolutionPool {
    free: Mutex<Vec<Buffers>>,
}

impl SolutionPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn acquire(&self, n_events: usize, n_slots: usize, n_cells: usize) -> Buffers {
        if let Some(buf) = self.free.lock().pop() {
            debug_assert_eq!(buf.rats.len(), n_events);
            debug_assert_eq!(buf.slots.len(), n_slots);
            debug_assert_eq!(buf.attendance.len(), n_cells);
            return buf;
        }
        Buffers::alloc(n_events, n_slots, n_cells)
    }

    pub(crate) fn release(&self, mut buf: Buffers) {
        buf.clear();
        self.free.lock().push(buf);
    }

    pub(crate) fn len(&self) -> usize {
        self.free.lock().len()
    }
}
