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
use std::collections::HashMap;

#[inline]
fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

impl<'i> Solution<'i> {
    /// Count of hard-constraint violations: student clashes, slot sharing,
    /// and broken precedences. Unassigned events contribute nothing here;
    /// they are measured by [`Solution::distance`].
    pub fn violations(&self) -> u32 {
        let buf = self.buffers();
        let mut violations = 0u32;

        // A student sitting in k simultaneous events misses k - 1 of them.
        for cell in &buf.attendance {
            let k = cell.len() as u32;
            if k >= 2 {
                violations += k - 1;
            }
        }

        // k events in one (room, time) slot clash pairwise.
        for cell in &buf.slots {
            let k = cell.len() as u32;
            if k >= 2 {
                violations += k * (k - 1) / 2;
            }
        }

        // Precedence: everything in after(e) must start strictly later.
        for (event, &rat) in buf.rats.iter().enumerate() {
            if !rat.assigned() {
                continue;
            }
            for &later in self.instance().event(event).after() {
                let other = buf.rats[later as usize];
                if other.assigned() && !other.after(rat) {
                    violations += 1;
                }
            }
        }

        violations
    }

    /// The distance to feasibility: the number of students attending
    /// unscheduled events.
    pub fn distance(&self) -> u32 {
        self.buffers()
            .rats
            .iter()
            .enumerate()
            .filter(|(_, rat)| !rat.assigned())
            .map(|(event, _)| self.instance().event(event).attendance() as u32)
            .sum()
    }

    /// The soft-constraint penalty. Three independent rules per student and
    /// day: a single class that day, runs of more than two consecutive
    /// classes, and a class in the last slot of the day.
    pub fn fitness(&self) -> u32 {
        let mut fitness = 0u32;
        for student in 0..self.instance().n_students() {
            for day in 0..NDAYS {
                fitness += self.student_day_penalty(student, day);
            }
        }
        fitness
    }

    fn student_day_penalty(&self, student: usize, day: usize) -> u32 {
        let attendance = &self.buffers().attendance;
        let base = student * NTIMES + day * HOURS_PER_DAY;

        let mut penalty = 0u32;
        let mut attended = 0u32;
        let mut run = 0u32;
        for hour in 0..HOURS_PER_DAY {
            if attendance[base + hour].is_empty() {
                if run > 2 {
                    penalty += run - 2;
                }
                run = 0;
            } else {
                attended += 1;
                run += 1;
            }
        }
        if run > 2 {
            penalty += run - 2;
        }
        if attended == 1 {
            penalty += 1;
        }
        if !attendance[base + HOURS_PER_DAY - 1].is_empty() {
            penalty += 1;
        }
        penalty
    }

    #[inline]
    pub fn value(&self) -> Value {
        Value::new(self.violations(), self.fitness())
    }

    /// The hard violations one event's current assignment is involved in.
    /// Zero for unassigned events.
    pub fn assignment_violations(&self, event: usize) -> u32 {
        let buf = self.buffers();
        let rat = buf.rats[event];
        if !rat.assigned() {
            return 0;
        }

        let ev = self.instance().event(event);
        let time = rat.time as usize;
        let mut violations = 0u32;

        for &student in ev.students() {
            // The cell contains the event itself; everything else clashes.
            violations += buf.attendance[student as usize * NTIMES + time].len() as u32 - 1;
        }
        violations += buf.slots[rat.index()].len() as u32 - 1;
        for &later in ev.after() {
            let other = buf.rats[later as usize];
            if other.assigned() && !other.after(rat) {
                violations += 1;
            }
        }
        for &earlier in ev.before() {
            let other = buf.rats[earlier as usize];
            if other.assigned() && !other.before(rat) {
                violations += 1;
            }
        }

        violations
    }

    /// Per-event contribution used to weight crossover masks: the hard
    /// violations the assignment takes part in, then the soft penalty of its
    /// attendees' day. An unassigned event is scored by the students it
    /// strands.
    pub fn assignment_quality(&self, event: usize) -> Value {
        let rat = self.rat_at(event);
        let ev = self.instance().event(event);
        if !rat.assigned() {
            return Value::new(ev.attendance() as u32, 0);
        }

        let day = rat.day();
        let soft = ev
            .students()
            .iter()
            .map(|&s| self.student_day_penalty(s as usize, day))
            .sum();
        Value::new(self.assignment_violations(event), soft)
    }

    /// The quality vector over all events.
    pub fn assignment_qualities(&self) -> Vec<Value> {
        (0..self.instance().n_events())
            .map(|event| self.assignment_quality(event))
            .collect()
    }

    /// The weighted multigraph of violations between event pairs, used to
    /// attribute blame when deriving the variable ordering.
    pub fn constraint_pairs(&self) -> HashMap<(u32, u32), u32> {
        let buf = self.buffers();
        let mut pairs: HashMap<(u32, u32), u32> = HashMap::new();

        for cell in buf.attendance.iter().chain(buf.slots.iter()) {
            if cell.len() < 2 {
                continue;
            }
            for (i, &a) in cell.iter().enumerate() {
                for &b in &cell[i + 1..] {
                    *pairs.entry(ordered(a, b)).or_insert(0) += 1;
                }
            }
        }

        for (event, &rat) in buf.rats.iter().enumerate() {
            if !rat.assigned() {
                continue;
            }
            for &later in self.instance().event(event).after() {
                let other = buf.rats[later as usize];
                if other.assigned() && !other.after(rat) {
                    *pairs.entry(ordered(event as u32, later)).or_insert(0) += 1;
                }
            }
        }

        pairs
    }

    /// Scan for a single reassignment that strictly improves the valuation.
    /// The solution is left untouched; the caller applies the returned move.
    pub fn find_improvement(&mut self) -> Option<(usize, Rat)> {
        let inst = self.instance();
        let current = self.value();

        for event in 0..inst.n_events() {
            let original = self.rat_at(event);
            for &rat in inst.base_domain(event) {
                if rat == original {
                    continue;
                }
                self.assign(event, rat);
                let improved = self.value() < current;
                if original.assigned() {
                    self.assign(event, original);
                } else {
                    self.unassign(event);
                }
                if improved {
                    return Some((event, rat));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::small_instance;
    use crate::instance::{Instance, InstanceTables};
    use pett_core::prelude::*;

    /// One event, one room (capacity 1), one student, every time available.
    fn trivial_instance() -> Instance {
        let mut t = InstanceTables::blank(1, 1, 0, 1);
        t.room_capacities = vec![1];
        t.set_attends(0, 0);
        Instance::new(t).unwrap()
    }

    #[test]
    fn test_empty_solution_scores_distance_only() {
        let inst = small_instance();
        let soln = inst.solution();
        assert_eq!(soln.violations(), 0);
        assert_eq!(soln.fitness(), 0);
        assert_eq!(soln.distance(), 4); // two events stranding two students each
    }

    #[test]
    fn test_single_event_day_penalty() {
        // A lone morning class: one class that day, student attends exactly
        // one event, so fitness is 1.
        let inst = trivial_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 2));
        assert_eq!(soln.violations(), 0);
        assert_eq!(soln.fitness(), 1);
        assert_eq!(soln.distance(), 0);
        assert_eq!(soln.value(), Value::new(0, 1));
    }

    #[test]
    fn test_last_slot_of_day_penalty() {
        // Slot 8 is the final hour of day 0: single-class penalty plus the
        // end-of-day penalty.
        let inst = trivial_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 8));
        assert_eq!(soln.violations(), 0);
        assert_eq!(soln.fitness(), 2);
    }

    fn chain_instance(n: usize) -> Instance {
        // n events in one big room, one student attending them all.
        let mut t = InstanceTables::blank(n, 1, 0, 1);
        t.room_capacities = vec![n as u32];
        for e in 0..n {
            t.set_attends(0, e);
        }
        Instance::new(t).unwrap()
    }

    #[test]
    fn test_consecutive_run_penalty() {
        // Three consecutive classes cost (3 - 2); four cost (4 - 2).
        let inst = chain_instance(4);
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 0));
        soln.assign(1, Rat::new(0, 1));
        soln.assign(2, Rat::new(0, 2));
        soln.unassign(3);
        assert_eq!(soln.fitness(), 1);

        soln.assign(3, Rat::new(0, 3));
        assert_eq!(soln.fitness(), 2);
    }

    #[test]
    fn test_two_separate_runs_both_count() {
        // Hours 0-2 and 4-6 of day 0: two runs of three, no single-class
        // penalty, no end-of-day penalty.
        let inst = chain_instance(6);
        let mut soln = inst.solution();
        for (event, hour) in [(0, 0), (1, 1), (2, 2), (3, 4), (4, 5), (5, 6)] {
            soln.assign(event, Rat::new(0, hour));
        }
        assert_eq!(soln.fitness(), 2);
    }

    #[test]
    fn test_run_reaching_day_end_counts_once() {
        // Hours 6, 7, 8: a run of three ending the day, plus end-of-day.
        let inst = chain_instance(3);
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 6));
        soln.assign(1, Rat::new(0, 7));
        soln.assign(2, Rat::new(0, 8));
        assert_eq!(soln.fitness(), 2);
    }

    #[test]
    fn test_student_clash_violation() {
        // Both events of the shared students at the same time, different
        // rooms: each of the two students sits in two events at once.
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 3));
        soln.assign(1, Rat::new(1, 3));
        // Two student clashes plus the broken precedence (0 before 1).
        assert_eq!(soln.violations(), 3);
    }

    #[test]
    fn test_slot_sharing_violation() {
        let inst = chain_instance(3);
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 0));
        soln.assign(1, Rat::new(0, 0));
        soln.assign(2, Rat::new(0, 0));
        // Slot holds 3 events: 3 pairwise clashes. The student sits in 3
        // events at once: 2 more.
        assert_eq!(soln.violations(), 5);
    }

    #[test]
    fn test_precedence_violation_counts_le() {
        let inst = small_instance();
        let mut soln = inst.solution();

        // Correct order: no violation from precedence.
        soln.assign(0, Rat::new(0, 1));
        soln.assign(1, Rat::new(1, 2));
        assert_eq!(soln.violations(), 0);

        // Equal times break "strictly after".
        soln.assign(1, Rat::new(1, 1));
        assert!(soln.violations() >= 1);

        // Reversed order.
        soln.assign(1, Rat::new(1, 0));
        assert_eq!(soln.violations(), 1);
    }

    #[test]
    fn test_assignment_violations_attributes_both_sides() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 5));
        soln.assign(1, Rat::new(1, 2)); // before its predecessor

        // Event 0: precedence violation with event 1 (from the after side).
        assert_eq!(soln.assignment_violations(0), 1);
        // Event 1 sees the same violation from the before side.
        assert_eq!(soln.assignment_violations(1), 1);
    }

    #[test]
    fn test_assignment_quality_prefers_clean_slots() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 1));
        soln.assign(1, Rat::new(1, 9));

        let clean = soln.assignment_quality(0);
        soln.assign(1, Rat::new(1, 1)); // now clashing and order-breaking
        let dirty = soln.assignment_quality(1);
        assert!(clean < dirty);
    }

    #[test]
    fn test_assignment_quality_of_unassigned_counts_students() {
        let inst = small_instance();
        let soln = inst.solution();
        assert_eq!(soln.assignment_quality(0), Value::new(2, 0));
    }

    #[test]
    fn test_constraint_pairs_weights_violations() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 3));
        soln.assign(1, Rat::new(0, 3));

        let pairs = soln.constraint_pairs();
        // Two student clashes, one slot clash, one precedence violation.
        assert_eq!(pairs.get(&(0, 1)), Some(&4));
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_constraint_pairs_empty_when_clean() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 1));
        soln.assign(1, Rat::new(1, 2));
        assert!(soln.constraint_pairs().is_empty());
    }

    #[test]
    fn test_find_improvement_resolves_clash() {
        let inst = small_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 3));
        soln.assign(1, Rat::new(1, 3));
        let before = soln.value();

        let (event, rat) = soln.find_improvement().expect("an improving move exists");
        // The scan must not have mutated the solution.
        assert_eq!(soln.value(), before);

        soln.assign(event, rat);
        assert!(soln.value() < before);
    }

    #[test]
    fn test_find_improvement_none_at_optimum() {
        // Single event alone on day 0 at a non-final slot: fitness 1 is the
        // floor (any slot leaves exactly one class that day).
        let inst = trivial_instance();
        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 2));
        assert_eq!(soln.find_improvement(), None);
    }
}
