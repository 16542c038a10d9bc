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

mod event;
pub mod loader;
mod pool;
mod room;

pub use event::Event;
pub use pool::Occupants;
pub(crate) use pool::Buffers;
pub use room::Room;

use crate::err::InstanceError;
use crate::solution::Solution;
use fixedbitset::FixedBitSet;
use pett_core::prelude::*;
use pool::SolutionPool;

/// The raw tables of an ITC-2007 track-2 instance, in file order. All of the
/// matrix tables are flat and row-major.
#[derive(Debug, Clone)]
pub struct InstanceTables {
    pub n_events: usize,
    pub n_rooms: usize,
    pub n_features: usize,
    pub n_students: usize,
    pub room_capacities: Vec<u32>,
    /// `[student * n_events + event]`
    pub attends: Vec<bool>,
    /// `[room * n_features + feature]`
    pub room_features: Vec<bool>,
    /// `[event * n_features + feature]`
    pub event_features: Vec<bool>,
    /// `[event * NTIMES + time]`
    pub event_times: Vec<bool>,
    /// `[first * n_events + second]`; `1` means first occurs before second,
    /// `-1` after, `0` unrelated.
    pub ordering: Vec<i8>,
}

impl InstanceTables {
    /// Tables for an instance with every time available, no attendance, no
    /// features, and no ordering. A convenient starting point for
    /// programmatic construction.
    pub fn blank(n_events: usize, n_rooms: usize, n_features: usize, n_students: usize) -> Self {
        Self {
            n_events,
            n_rooms,
            n_features,
            n_students,
            room_capacities: vec![0; n_rooms],
            attends: vec![false; n_students * n_events],
            room_features: vec![false; n_rooms * n_features],
            event_features: vec![false; n_events * n_features],
            event_times: vec![true; n_events * NTIMES],
            ordering: vec![0; n_events * n_events],
        }
    }

    #[inline]
    pub fn set_attends(&mut self, student: usize, event: usize) {
        self.attends[student * self.n_events + event] = true;
    }

    #[inline]
    pub fn set_room_feature(&mut self, room: usize, feature: usize) {
        self.room_features[room * self.n_features + feature] = true;
    }

    #[inline]
    pub fn set_event_feature(&mut self, event: usize, feature: usize) {
        self.event_features[event * self.n_features + feature] = true;
    }

    #[inline]
    pub fn set_time_available(&mut self, event: usize, time: usize, available: bool) {
        self.event_times[event * NTIMES + time] = available;
    }

    /// Record that `first` must occur strictly before `second`.
    #[inline]
    pub fn set_before(&mut self, first: usize, second: usize) {
        self.ordering[first * self.n_events + second] = 1;
        self.ordering[second * self.n_events + first] = -1;
    }

    fn check_dimensions(&self) -> Result<(), InstanceError> {
        let checks: [(&'static str, usize, usize); 5] = [
            ("room capacities", self.n_rooms, self.room_capacities.len()),
            (
                "attends",
                self.n_students * self.n_events,
                self.attends.len(),
            ),
            (
                "room features",
                self.n_rooms * self.n_features,
                self.room_features.len(),
            ),
            (
                "event features",
                self.n_events * self.n_features,
                self.event_features.len(),
            ),
            (
                "event times",
                self.n_events * NTIMES,
                self.event_times.len(),
            ),
        ];
        for (table, expected, got) in checks {
            if expected != got {
                return Err(InstanceError::TableDimensionMismatch {
                    table,
                    expected,
                    got,
                });
            }
        }
        if self.ordering.len() != self.n_events * self.n_events {
            return Err(InstanceError::TableDimensionMismatch {
                table: "ordering",
                expected: self.n_events * self.n_events,
                got: self.ordering.len(),
            });
        }
        Ok(())
    }
}

/// An immutable timetabling instance. Built once at startup and shared across
/// every worker by reference; everything the search repeatedly needs (room
/// compatibility, exclusion and precedence sets, base domains) is derived
/// here so the hot path only ever reads.
#[derive(Debug)]
pub struct Instance {
    n_events: usize,
    n_rooms: usize,
    n_features: usize,
    n_students: usize,
    events: Vec<Event>,
    rooms: Vec<Room>,
    /// Events attended by each student, sorted ascending.
    students: Vec<Vec<u32>>,
    /// Per-event base domain: the a-priori admissible (room, time) pairs.
    domains: Vec<Vec<Rat>>,
    pool: SolutionPool,
}

impl Instance {
    /// Derive an instance from its raw tables.
    pub fn new(tables: InstanceTables) -> Result<Self, InstanceError> {
        if tables.n_events == 0 || tables.n_rooms == 0 || tables.n_students == 0 {
            return Err(InstanceError::NonPositiveCounts);
        }
        tables.check_dimensions()?;

        let n_events = tables.n_events;
        let n_rooms = tables.n_rooms;
        let n_features = tables.n_features;
        let n_students = tables.n_students;

        let rooms: Vec<Room> = (0..n_rooms)
            .map(|r| {
                let mut features = FixedBitSet::with_capacity(n_features);
                for f in 0..n_features {
                    if tables.room_features[r * n_features + f] {
                        features.insert(f);
                    }
                }
                Room::new(tables.room_capacities[r], features)
            })
            .collect();

        // Attendance, from both directions.
        let mut students: Vec<Vec<u32>> = vec![Vec::new(); n_students];
        let mut attending: Vec<Vec<u32>> = vec![Vec::new(); n_events];
        for (s, row) in students.iter_mut().enumerate() {
            for e in 0..n_events {
                if tables.attends[s * n_events + e] {
                    row.push(e as u32);
                    attending[e].push(s as u32);
                }
            }
        }

        // Two events that share a student may not occupy the same timeslot.
        let mut exclude: Vec<FixedBitSet> =
            vec![FixedBitSet::with_capacity(n_events); n_events];
        for row in &students {
            for (i, &a) in row.iter().enumerate() {
                for &b in &row[i + 1..] {
                    exclude[a as usize].insert(b as usize);
                    exclude[b as usize].insert(a as usize);
                }
            }
        }

        // Precedence, read from the upper triangle only; the file mirrors the
        // lower triangle with the opposite sign.
        let mut before: Vec<Vec<u32>> = vec![Vec::new(); n_events];
        let mut after: Vec<Vec<u32>> = vec![Vec::new(); n_events];
        for first in 0..n_events {
            for second in 0..n_events {
                if tables.ordering[first * n_events + second] == 1 {
                    after[first].push(second as u32);
                    before[second].push(first as u32);
                }
            }
        }

        let mut events = Vec::with_capacity(n_events);
        let mut domains = Vec::with_capacity(n_events);
        for e in 0..n_events {
            let mut times = FixedBitSet::with_capacity(NTIMES);
            for t in 0..NTIMES {
                if tables.event_times[e * NTIMES + t] {
                    times.insert(t);
                }
            }

            let mut required = FixedBitSet::with_capacity(n_features);
            for f in 0..n_features {
                if tables.event_features[e * n_features + f] {
                    required.insert(f);
                }
            }

            let feasible_rooms: Vec<u32> = (0..n_rooms)
                .filter(|&r| rooms[r].can_host(attending[e].len(), &required))
                .map(|r| r as u32)
                .collect();

            let mut domain = Vec::with_capacity(feasible_rooms.len() * times.count_ones(..));
            for &room in &feasible_rooms {
                for time in times.ones() {
                    domain.push(Rat::new(room, time as u32));
                }
            }
            domains.push(domain);

            events.push(Event::new(
                e as u32,
                times,
                feasible_rooms,
                std::mem::take(&mut before[e]),
                std::mem::take(&mut after[e]),
                exclude[e].ones().map(|x| x as u32).collect(),
                std::mem::take(&mut attending[e]),
            ));
        }

        Ok(Self {
            n_events,
            n_rooms,
            n_features,
            n_students,
            events,
            rooms,
            students,
            domains,
            pool: SolutionPool::new(),
        })
    }

    #[inline]
    pub fn n_events(&self) -> usize {
        self.n_events
    }

    #[inline]
    pub fn n_rooms(&self) -> usize {
        self.n_rooms
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    pub fn n_students(&self) -> usize {
        self.n_students
    }

    /// Number of (room, time) slots, which is also the length of a
    /// solution's slot-occupancy table.
    #[inline]
    pub fn n_slots(&self) -> usize {
        self.n_rooms * NTIMES
    }

    #[inline]
    pub fn event(&self, event: usize) -> &Event {
        &self.events[event]
    }

    #[inline]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[inline]
    pub fn room(&self, room: usize) -> &Room {
        &self.rooms[room]
    }

    /// Events attended by the given student, sorted ascending.
    #[inline]
    pub fn attended_by(&self, student: usize) -> &[u32] {
        &self.students[student]
    }

    /// The a-priori admissible (room, time) pairs of an event.
    #[inline]
    pub fn base_domain(&self, event: usize) -> &[Rat] {
        &self.domains[event]
    }

    /// Draw an empty solution from the pool.
    #[inline]
    pub fn solution(&self) -> Solution<'_> {
        Solution::new(
            self,
            self.pool
                .acquire(self.n_events, self.n_slots(), self.n_students * NTIMES),
        )
    }

    /// Build a solution from an assignment snapshot. Rats outside the base
    /// domain are accepted; the caller vouches for them.
    pub fn solution_from(&self, rats: &[Rat]) -> Solution<'_> {
        let mut soln = self.solution();
        for (event, &rat) in rats.iter().enumerate() {
            if rat.assigned() {
                soln.assign(event, rat);
            }
        }
        soln
    }

    /// Clear a solution and return its tables to the pool.
    #[inline]
    pub fn release(&self, soln: Solution<'_>) {
        self.pool.release(soln.into_buffers());
    }

    /// Number of solutions currently sitting in the free list.
    #[inline]
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_counts() {
        let t = InstanceTables::blank(0, 1, 0, 1);
        assert!(matches!(
            Instance::new(t),
            Err(InstanceError::NonPositiveCounts)
        ));
    }

    #[test]
    fn test_rejects_dimension_mismatch() {
        let mut t = InstanceTables::blank(2, 1, 0, 1);
        t.room_capacities.push(5);
        match Instance::new(t) {
            Err(InstanceError::TableDimensionMismatch { table, .. }) => {
                assert_eq!(table, "room capacities")
            }
            other => panic!("expected dimension mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_feasible_rooms_respect_capacity() {
        // Two rooms; room 0 seats 1, room 1 seats 2. Event 0 has 2 students.
        let mut t = InstanceTables::blank(1, 2, 0, 2);
        t.room_capacities = vec![1, 2];
        t.set_attends(0, 0);
        t.set_attends(1, 0);
        let inst = Instance::new(t).unwrap();
        assert_eq!(inst.event(0).rooms(), &[1]);
    }

    #[test]
    fn test_feasible_rooms_respect_features() {
        // Event 0 requires feature 0, which only room 1 offers.
        let mut t = InstanceTables::blank(1, 2, 1, 1);
        t.room_capacities = vec![10, 10];
        t.set_event_feature(0, 0);
        t.set_room_feature(1, 0);
        let inst = Instance::new(t).unwrap();
        assert_eq!(inst.event(0).rooms(), &[1]);
    }

    #[test]
    fn test_exclusion_is_shared_student() {
        // Student 0 attends events 0 and 2; student 1 attends event 1 alone.
        let mut t = InstanceTables::blank(3, 1, 0, 2);
        t.room_capacities = vec![10];
        t.set_attends(0, 0);
        t.set_attends(0, 2);
        t.set_attends(1, 1);
        let inst = Instance::new(t).unwrap();
        assert_eq!(inst.event(0).exclude(), &[2]);
        assert_eq!(inst.event(1).exclude(), &[] as &[u32]);
        assert_eq!(inst.event(2).exclude(), &[0]);
        assert_eq!(inst.attended_by(0), &[0, 2]);
    }

    #[test]
    fn test_precedence_sets_are_mirrored() {
        let mut t = InstanceTables::blank(2, 1, 0, 1);
        t.room_capacities = vec![10];
        t.set_before(0, 1);
        let inst = Instance::new(t).unwrap();
        assert_eq!(inst.event(0).after(), &[1]);
        assert_eq!(inst.event(0).before(), &[] as &[u32]);
        assert_eq!(inst.event(1).before(), &[0]);
        assert_eq!(inst.event(1).after(), &[] as &[u32]);
    }

    #[test]
    fn test_base_domain_is_rooms_cross_times() {
        let mut t = InstanceTables::blank(1, 2, 0, 1);
        t.room_capacities = vec![10, 10];
        // Only times 0 and 7 available.
        for time in 0..NTIMES {
            t.set_time_available(0, time, time == 0 || time == 7);
        }
        let inst = Instance::new(t).unwrap();
        assert_eq!(
            inst.base_domain(0),
            &[
                Rat::new(0, 0),
                Rat::new(0, 7),
                Rat::new(1, 0),
                Rat::new(1, 7)
            ]
        );
    }

    #[test]
    fn test_solutions_round_trip_through_pool() {
        let mut t = InstanceTables::blank(2, 1, 0, 1);
        t.room_capacities = vec![10];
        t.set_attends(0, 0);
        let inst = Instance::new(t).unwrap();

        let mut soln = inst.solution();
        soln.assign(0, Rat::new(0, 3));
        inst.release(soln);
        assert_eq!(inst.pooled(), 1);

        let again = inst.solution();
        assert_eq!(inst.pooled(), 0);
        assert!(!again.assigned(0));
        assert!(!again.assigned(1));
    }
}
