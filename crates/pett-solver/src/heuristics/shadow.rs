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

use pett_model::prelude::*;

/// Per-call shrinkable copies of the base domains. Assignments made during a
/// construction run forward-propagate the exclusion and precedence
/// constraints into the domains of the still-unassigned neighbours; the base
/// domains on the instance are never touched.
#[derive(Debug)]
pub struct ShadowDomains {
    domains: Vec<Vec<Rat>>,
}

impl ShadowDomains {
    pub fn new(inst: &Instance) -> Self {
        Self {
            domains: (0..inst.n_events())
                .map(|event| inst.base_domain(event).to_vec())
                .collect(),
        }
    }

    #[inline]
    pub fn len(&self, event: usize) -> usize {
        self.domains[event].len()
    }

    #[inline]
    pub fn is_empty(&self, event: usize) -> bool {
        self.domains[event].is_empty()
    }

    #[inline]
    pub fn entries(&self, event: usize) -> &[Rat] {
        &self.domains[event]
    }

    /// Record that `event` was just assigned `rat` and shrink the domains of
    /// its unassigned neighbours accordingly. The assigned event's own
    /// domain is emptied; it is out of the ordering's consideration.
    pub fn propagate(&mut self, soln: &Solution<'_>, event: usize, rat: Rat) {
        let inst = soln.instance();
        let ev = inst.event(event);
        self.domains[event].clear();

        for &other in ev.exclude() {
            if !soln.assigned(other as usize) {
                self.domains[other as usize].retain(|r| r.time != rat.time);
            }
        }
        for &later in ev.after() {
            if !soln.assigned(later as usize) {
                self.domains[later as usize].retain(|r| r.time > rat.time);
            }
        }
        for &earlier in ev.before() {
            if !soln.assigned(earlier as usize) {
                self.domains[earlier as usize].retain(|r| r.time < rat.time);
            }
        }
    }
}
