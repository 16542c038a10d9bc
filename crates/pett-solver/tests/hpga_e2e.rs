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

use pett_solver::prelude::*;
use std::time::Duration;

fn test_config(timeout: Option<Duration>) -> SolveConfig {
    SolveConfig {
        islands: 2,
        slaves: 2,
        min_pop: 3,
        max_pop: 5,
        timeout,
        ideal: false,
        seed: 1234,
    }
}

#[test]
fn test_solves_trivial_instance_to_validity() {
    // One event, one room seating its one student, every time open. Any
    // assignment is valid, so the run stops as soon as the first seed
    // population reports in.
    let mut t = InstanceTables::blank(1, 1, 0, 1);
    t.room_capacities = vec![1];
    t.set_attends(0, 0);
    let inst = Instance::new(t).unwrap();

    let (soln, value) = run(
        &inst,
        &test_config(Some(Duration::from_secs(30))),
        crossbeam_channel::never(),
    );

    assert_eq!(value.violations, 0);
    assert!(value.fitness >= 1, "a lone class always costs at least 1");
    assert!(soln.assigned(0));
    assert_eq!(soln.value(), value);
    assert_eq!(soln.audit(), Ok(()));
}

#[test]
fn test_solves_disjoint_pair_without_violations() {
    // Two events, two single-seat rooms, two disjoint students: trivially
    // schedulable without clashes.
    let mut t = InstanceTables::blank(2, 2, 0, 2);
    t.room_capacities = vec![1, 1];
    t.set_attends(0, 0);
    t.set_attends(1, 1);
    let inst = Instance::new(t).unwrap();

    let (soln, value) = run(
        &inst,
        &test_config(Some(Duration::from_secs(30))),
        crossbeam_channel::never(),
    );

    assert_eq!(value.violations, 0);
    assert!(soln.assigned(0) && soln.assigned(1));
}

#[test]
fn test_unsatisfiable_precedence_reports_violations() {
    // Event 0 must precede event 1, but event 1 can only sit in the very
    // first slot. No assignment is valid; the run ends on the time budget
    // with the least-bad candidate.
    let mut t = InstanceTables::blank(2, 1, 0, 1);
    t.room_capacities = vec![2];
    t.set_attends(0, 0);
    t.set_attends(0, 1);
    t.set_before(0, 1);
    for time in 1..NTIMES {
        t.set_time_available(1, time, false);
    }
    let inst = Instance::new(t).unwrap();

    let (soln, value) = run(
        &inst,
        &test_config(Some(Duration::from_millis(400))),
        crossbeam_channel::never(),
    );

    assert!(value.violations >= 1);
    assert_eq!(soln.value(), value);
}

#[test]
fn test_interrupt_stops_an_unbounded_run() {
    // Same unsatisfiable instance, but no time budget: only the interrupt
    // ends the run.
    let mut t = InstanceTables::blank(2, 1, 0, 1);
    t.room_capacities = vec![2];
    t.set_attends(0, 0);
    t.set_attends(0, 1);
    t.set_before(0, 1);
    for time in 1..NTIMES {
        t.set_time_available(1, time, false);
    }
    let inst = Instance::new(t).unwrap();

    let (interrupt_tx, interrupt_rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        let _ = interrupt_tx.send(());
    });

    let (_, value) = run(&inst, &test_config(None), interrupt_rx);
    assert!(value.violations >= 1);
}

#[test]
fn test_ideal_stop_waits_for_zero_fitness() {
    // Nine events for one student on one day would always cost fitness, so
    // spread across two students and plenty of rooms an ideal (0, 0) layout
    // exists: put each student's pair of classes adjacent. Run with the
    // ideal flag and a generous budget; the search must find (0, 0).
    let mut t = InstanceTables::blank(2, 2, 0, 2);
    t.room_capacities = vec![2, 2];
    // Both students attend both events: two adjacent classes on one day
    // scores zero (no single-class day, no long run, no last slot).
    t.set_attends(0, 0);
    t.set_attends(0, 1);
    t.set_attends(1, 0);
    t.set_attends(1, 1);
    let inst = Instance::new(t).unwrap();

    let mut config = test_config(Some(Duration::from_secs(60)));
    config.ideal = true;
    let (soln, value) = run(&inst, &config, crossbeam_channel::never());

    assert!(value.is_ideal(), "expected (0, 0), got {value}");
    assert_eq!(soln.value(), value);
}
