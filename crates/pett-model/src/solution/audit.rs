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
use pett_core::prelude::*;

/// A divergence between a solution's assignment vector and its derived
/// occupancy tables. These tables are maintained incrementally; a report
/// from the auditor means the bookkeeping has a bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    SlotMissingEvent { event: u32, rat: Rat },
    SlotGhostEvent { event: u32, slot: usize },
    AttendanceMissingEvent { event: u32, student: u32, time: u32 },
    AttendanceGhostEvent { event: u32, student: usize, time: usize },
}

impl std::fmt::Display for AuditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditError::SlotMissingEvent { event, rat } => {
                write!(f, "event {event} assigned {rat} but absent from the slot table")
            }
            AuditError::SlotGhostEvent { event, slot } => {
                write!(f, "slot {slot} lists event {event} which is not assigned there")
            }
            AuditError::AttendanceMissingEvent {
                event,
                student,
                time,
            } => write!(
                f,
                "student {student} attends event {event} at time {time} but the cell misses it"
            ),
            AuditError::AttendanceGhostEvent {
                event,
                student,
                time,
            } => write!(
                f,
                "attendance cell ({student}, {time}) lists event {event} which is not there"
            ),
        }
    }
}

impl std::error::Error for AuditError {}

impl Solution<'_> {
    /// Cross-check the occupancy tables against the assignment vector in
    /// both directions. O(everything); meant for tests and debugging, never
    /// the search loop.
    pub fn audit(&self) -> Result<(), AuditError> {
        let inst = self.instance();

        for event in 0..inst.n_events() {
            let rat = self.rat_at(event);
            if !rat.assigned() {
                continue;
            }
            if !self.slot_occupants(rat).contains(&(event as u32)) {
                return Err(AuditError::SlotMissingEvent {
                    event: event as u32,
                    rat,
                });
            }
            for &student in inst.event(event).students() {
                if !self
                    .attending(student as usize, rat.time as usize)
                    .contains(&(event as u32))
                {
                    return Err(AuditError::AttendanceMissingEvent {
                        event: event as u32,
                        student,
                        time: rat.time,
                    });
                }
            }
        }

        for slot in 0..inst.n_slots() {
            for &event in self.slot_occupants(Rat::from_index(slot)) {
                if self.rat_at(event as usize).index() != slot {
                    return Err(AuditError::SlotGhostEvent {
                        event,
                        slot,
                    });
                }
            }
        }

        for student in 0..inst.n_students() {
            for time in 0..NTIMES {
                for &event in self.attending(student, time) {
                    let rat = self.rat_at(event as usize);
                    if !rat.assigned() || rat.time as usize != time {
                        return Err(AuditError::AttendanceGhostEvent {
                            event,
                            student,
                            time,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::small_instance;
    use super::*;

    #[test]
    fn test_fresh_and_mutated_solutions_pass() {
        let inst = small_instance();
        let mut soln = inst.solution();
        assert_eq!(soln.audit(), Ok(()));

        soln.assign(0, Rat::new(0, 3));
        soln.assign(1, Rat::new(0, 3));
        assert_eq!(soln.audit(), Ok(()));

        soln.assign(1, Rat::new(1, 9));
        soln.unassign(0);
        assert_eq!(soln.audit(), Ok(()));
    }

    #[test]
    fn test_audit_survives_a_reassignment_storm() {
        let inst = small_instance();
        let mut soln = inst.solution();
        for step in 0u32..200 {
            let event = (step % 2) as usize;
            match step % 5 {
                4 => soln.unassign(event),
                rem => soln.assign(event, Rat::new(rem % 2, (step * 7) % NTIMES as u32)),
            }
        }
        assert_eq!(soln.audit(), Ok(()));
    }
}
