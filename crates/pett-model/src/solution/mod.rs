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

mod audit;
mod io;
mod score;

pub use audit::AuditError;

use crate::instance::{Buffers, Instance};
use pett_core::prelude::*;

/// A mutable candidate assignment over a shared instance.
///
/// Three tables are kept in lockstep: `rats` maps each event to its slot (or
/// the unassigned sentinel), `slots` maps each (room, time) index to the
/// events occupying it, and `attendance` maps each (student, time) cell to
/// the events that student is sitting in then. The occupancy tables are
/// multisets: a slot or a cell holds one entry per assigned event, so the
/// scoring functions never rescan the assignment vector.
#[derive(Debug)]
pub struct Solution<'i> {
    inst: &'i Instance,
    buf: Buffers,
}

impl<'i> Solution<'i> {
    #[inline]
    pub(crate) fn new(inst: &'i Instance, buf: Buffers) -> Self {
        Self { inst, buf }
    }

    #[inline]
    pub(crate) fn into_buffers(self) -> Buffers {
        self.buf
    }

    #[inline]
    pub(crate) fn buffers(&self) -> &Buffers {
        &self.buf
    }

    #[inline]
    pub fn instance(&self) -> &'i Instance {
        self.inst
    }

    #[inline]
    pub fn rat_at(&self, event: usize) -> Rat {
        self.buf.rats[event]
    }

    #[inline]
    pub fn assigned(&self, event: usize) -> bool {
        self.buf.rats[event].assigned()
    }

    /// The events currently occupying a (room, time) slot.
    #[inline]
    pub fn slot_occupants(&self, rat: Rat) -> &[u32] {
        &self.buf.slots[rat.index()]
    }

    /// The events the given student attends at the given time.
    #[inline]
    pub fn attending(&self, student: usize, time: usize) -> &[u32] {
        &self.buf.attendance[student * NTIMES + time]
    }

    /// Copy-out snapshot of the assignment vector, suitable for sending
    /// across a channel.
    #[inline]
    pub fn assignments(&self) -> Vec<Rat> {
        self.buf.rats.clone()
    }

    /// Place an event. Any previous assignment of the event is vacated
    /// first; the target slot is shared if something else already sits there
    /// (the scoring counts the collision). Assigning the pair an event
    /// already holds re-establishes the identical state.
    pub fn assign(&mut self, event: usize, rat: Rat) {
        let inst = self.inst;
        assert!(event < inst.n_events(), "assign: event {event} out of range");
        assert!(
            rat.assigned()
                && (rat.room as usize) < inst.n_rooms()
                && (rat.time as usize) < NTIMES,
            "assign: rat {rat} out of range"
        );

        let previous = self.buf.rats[event];
        if previous == rat {
            return;
        }
        if previous.assigned() {
            self.unassign(event);
        }

        self.buf.rats[event] = rat;
        self.buf.slots[rat.index()].push(event as u32);
        let time = rat.time as usize;
        for &student in inst.event(event).students() {
            self.buf.attendance[student as usize * NTIMES + time].push(event as u32);
        }
    }

    /// Vacate an event's slot; a no-op when the event is unassigned.
    pub fn unassign(&mut self, event: usize) {
        let inst = self.inst;
        assert!(
            event < inst.n_events(),
            "unassign: event {event} out of range"
        );

        let rat = self.buf.rats[event];
        if !rat.assigned() {
            return;
        }
        self.buf.rats[event] = Rat::UNASSIGNED;

        remove_one(&mut self.buf.slots[rat.index()], event as u32);
        let time = rat.time as usize;
        for &student in inst.event(event).students() {
            remove_one(
                &mut self.buf.attendance[student as usize * NTIMES + time],
                event as u32,
            );
        }
    }

    /// A pooled copy of this solution.
    pub fn duplicate(&self) -> Solution<'i> {
        let mut copy = self.inst.solution();
        copy.buf.rats.copy_from_slice(&self.buf.rats);
        for (dst, src) in copy.buf.slots.iter_mut().zip(&self.buf.slots) {
            dst.clone_from(src);
        }
        for (dst, src) in copy.buf.attendance.iter_mut().zip(&self.buf.attendance) {
            dst.clone_from(src);
        }
        copy
    }
}

/// Remove one occurrence of `event` from a multiset cell.
#[inline]
fn remove_one(cell: &mut crate::instance::Occupants, event: u32) {
    let pos = cell
        .iter()
        .position(|&e| e == event)
        .expect("occupancy tables out of sync with assignment vector");
    cell.swap_remove(pos);
}

impl PartialEq for Solution<'_> {
    /// Two solutions are equal when they assign the same rats over the same
    /// instance; the occupancy tables are functions of the assignment.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.inst, other.inst) && self.buf.rats == other.buf.rats
    }
}

impl Eq for Solution<'_> {}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::instance::{Instance, InstanceTables};

    /// Two events, two rooms of capacity 2, two students each attending both
    /// events, every time available, event 0 before event 1.
    pub(crate) fn small_instance() -> Instance {
        let mut t = InstanceTables::blank(2, 2, 0, 2);
        t.room_capacities = vec![2, 2];
        t.set_attends(0, 0);
        t.set_attends(0, 1);
        t.set_attends(1, 0);
        t.set_attends(1, 1);
        t.set_before(0, 1);
        Instance::new(t).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::small_instance;
    use super::*;

    fn occupancy_in_sync(soln: &Solution<'_>) -> bool {
        soln.audit().is_ok()
    }

    #[test]
    fn test_assign_updates_all_tables() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 3));

        assert_eq!(soln.rat_at(0), Rat::new(0, 3));
        assert_eq!(soln.slot_occupants(Rat::new(0, 3)), &[0]);
        assert_eq!(soln.attending(0, 3), &[0]);
        assert_eq!(soln.attending(1, 3), &[0]);
        assert!(occupancy_in_sync(&soln));
    }

    #[test]
    fn test_reassign_vacates_previous_slot() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 3));
        soln.assign(0, Rat::new(1, 7));

        assert!(soln.slot_occupants(Rat::new(0, 3)).is_empty());
        assert!(soln.attending(0, 3).is_empty());
        assert_eq!(soln.slot_occupants(Rat::new(1, 7)), &[0]);
        assert!(occupancy_in_sync(&soln));
    }

    #[test]
    fn test_shared_slot_is_a_multiset() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 3));
        soln.assign(1, Rat::new(0, 3));

        assert_eq!(soln.slot_occupants(Rat::new(0, 3)).len(), 2);
        assert_eq!(soln.attending(0, 3).len(), 2);
        assert!(occupancy_in_sync(&soln));
    }

    #[test]
    fn test_assign_same_pair_is_idempotent() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 3));
        soln.assign(0, Rat::new(0, 3));

        assert_eq!(soln.slot_occupants(Rat::new(0, 3)), &[0]);
        assert_eq!(soln.attending(0, 3), &[0]);
    }

    #[test]
    fn test_assign_then_unassign_round_trips() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(1, Rat::new(1, 9));
        let before_value = soln.value();
        let before_rats = soln.assignments();

        soln.assign(0, Rat::new(0, 9));
        soln.unassign(0);

        assert_eq!(soln.assignments(), before_rats);
        assert_eq!(soln.value(), before_value);
        assert!(soln.slot_occupants(Rat::new(0, 9)).is_empty());
        assert!(occupancy_in_sync(&soln));
    }

    #[test]
    fn test_unassign_unassigned_is_noop() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.unassign(0);
        assert!(!soln.assigned(0));
    }

    #[test]
    fn test_from_rats_reproduces_solution() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 3));
        soln.assign(1, Rat::new(1, 8));

        let rebuilt = inst.solution_from(&soln.assignments());
        assert_eq!(rebuilt, soln);
        assert_eq!(rebuilt.value(), soln.value());
        assert!(occupancy_in_sync(&rebuilt));
    }

    #[test]
    fn test_duplicate_is_equal_and_independent() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 3));

        let mut copy = soln.duplicate();
        assert_eq!(copy, soln);

        copy.assign(0, Rat::new(1, 4));
        assert_ne!(copy, soln);
        assert_eq!(soln.rat_at(0), Rat::new(0, 3));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_assign_event_out_of_range_is_fatal() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(99, Rat::new(0, 0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_assign_bad_rat_is_fatal() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(17, 0));
    }
}
