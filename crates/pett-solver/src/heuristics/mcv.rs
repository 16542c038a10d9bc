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

use super::shadow::ShadowDomains;
use pett_model::prelude::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Most-constrained-variable-first construction: repeatedly take the
/// unassigned event with the smallest live shadow domain and give it the
/// entry that minimises the soft penalty, ties broken by scan order. The
/// queue is rebuilt after every assignment because propagation changes the
/// neighbours' domain sizes. Events whose domain runs dry stay unassigned.
pub fn most_constrained_ordering(soln: &mut Solution<'_>) {
    let inst = soln.instance();
    let mut shadow = ShadowDomains::new(inst);

    loop {
        // Dry domains drop out here and stay unassigned.
        let mut queue: BinaryHeap<Reverse<(usize, usize)>> = (0..inst.n_events())
            .filter(|&event| !soln.assigned(event) && !shadow.is_empty(event))
            .map(|event| Reverse((shadow.len(event), event)))
            .collect();

        let Some(Reverse((_, event))) = queue.pop() else {
            return;
        };

        let mut best_rat = shadow.entries(event)[0];
        soln.assign(event, best_rat);
        let mut best_fit = soln.fitness();
        for i in 1..shadow.len(event) {
            let rat = shadow.entries(event)[i];
            soln.assign(event, rat);
            let fit = soln.fitness();
            if fit < best_fit {
                best_fit = fit;
                best_rat = rat;
            }
        }

        soln.assign(event, best_rat);
        shadow.propagate(soln, event, best_rat);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::medium_instance;
    use super::*;

    #[test]
    fn test_assigns_every_event_within_domain() {
        let inst = medium_instance();
        let mut soln = inst.solution();
        most_constrained_ordering(&mut soln);

        for event in 0..inst.n_events() {
            assert!(soln.assigned(event));
            assert!(inst.base_domain(event).contains(&soln.rat_at(event)));
        }
    }

    #[test]
    fn test_construction_is_conflict_free_with_room_to_spare() {
        // Domains are wide open; the propagated construction should hand
        // back a solution without hard violations.
        let inst = medium_instance();
        let mut soln = inst.solution();
        most_constrained_ordering(&mut soln);
        assert_eq!(soln.violations(), 0);
    }

    #[test]
    fn test_most_constrained_event_goes_first() {
        // Event 1 has a single admissible time; it must be placed there even
        // though event 0 is scanned first.
        let mut t = InstanceTables::blank(2, 1, 0, 1);
        t.room_capacities = vec![2];
        t.set_attends(0, 0);
        t.set_attends(0, 1);
        for time in 0..NTIMES {
            t.set_time_available(1, time, time == 7);
        }
        let inst = Instance::new(t).unwrap();

        let mut soln = inst.solution();
        most_constrained_ordering(&mut soln);
        assert_eq!(soln.rat_at(1), Rat::new(0, 7));
        // The shared student forces event 0 away from time 7.
        assert_ne!(soln.rat_at(0).time, 7);
    }

    #[test]
    fn test_dry_domains_stay_unassigned() {
        // Two events in exclusion with only one common available time: the
        // second one's shadow domain dries up.
        let mut t = InstanceTables::blank(2, 1, 0, 1);
        t.room_capacities = vec![2];
        t.set_attends(0, 0);
        t.set_attends(0, 1);
        for time in 1..NTIMES {
            t.set_time_available(0, time, false);
            t.set_time_available(1, time, false);
        }
        let inst = Instance::new(t).unwrap();

        let mut soln = inst.solution();
        most_constrained_ordering(&mut soln);
        assert_eq!(
            [soln.assigned(0), soln.assigned(1)]
                .iter()
                .filter(|&&a| a)
                .count(),
            1
        );
    }
}
