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

use parking_lot::RwLock;
use pett_model::prelude::*;
use std::sync::Arc;

#[derive(Debug, Default)]
struct SuccessCounts {
    crossovers: u32,
    successes: u32,
}

/// How often an individual's reproductions improved on it. Shared between
/// the owning sub-population and any exported snapshots; ratio reads
/// dominate, hence the reader-writer lock.
#[derive(Debug, Default)]
pub struct Success {
    counts: RwLock<SuccessCounts>,
}

impl Success {
    pub fn new() -> Self {
        Self::default()
    }

    /// successes / crossovers, or 0 before the first crossover.
    pub fn ratio(&self) -> f64 {
        let counts = self.counts.read();
        if counts.crossovers == 0 {
            0.0
        } else {
            f64::from(counts.successes) / f64::from(counts.crossovers)
        }
    }

    /// Record one crossover, successful iff the child improved on this
    /// parent.
    pub fn record(&self, improved: bool) {
        let mut counts = self.counts.write();
        counts.crossovers += 1;
        if improved {
            counts.successes += 1;
        }
    }

    pub fn crossovers(&self) -> u32 {
        self.counts.read().crossovers
    }

    pub fn successes(&self) -> u32 {
        self.counts.read().successes
    }
}

/// A member of a sub-population: a pooled solution with its cached valuation,
/// per-event quality vector, and shared success counter.
#[derive(Debug)]
pub struct Individual<'i> {
    soln: Solution<'i>,
    value: Value,
    quality: Vec<Value>,
    success: Arc<Success>,
}

impl<'i> Individual<'i> {
    pub fn new(soln: Solution<'i>) -> Self {
        let value = soln.value();
        Self::with_value(soln, value)
    }

    /// Wrap a solution whose valuation the caller already computed.
    pub fn with_value(soln: Solution<'i>, value: Value) -> Self {
        debug_assert_eq!(soln.value(), value);
        let quality = soln.assignment_qualities();
        Self {
            soln,
            value,
            quality,
            success: Arc::new(Success::new()),
        }
    }

    #[inline]
    pub fn soln(&self) -> &Solution<'i> {
        &self.soln
    }

    #[inline]
    pub fn value(&self) -> Value {
        self.value
    }

    #[inline]
    pub fn success(&self) -> &Success {
        &self.success
    }

    #[inline]
    pub fn into_solution(self) -> Solution<'i> {
        self.soln
    }

    /// Snapshot this individual for shipping across a channel. The snapshot
    /// shares the success counter, so crossovers recorded against it count
    /// for the original.
    pub fn export(&self) -> Genome {
        Genome {
            assignments: self.soln.assignments(),
            quality: self.quality.clone(),
            value: self.value,
            success: Arc::clone(&self.success),
        }
    }
}

/// A detached individual: the assignment vector plus the cached metadata a
/// crossover needs. This is what travels in messages.
#[derive(Debug, Clone)]
pub struct Genome {
    pub assignments: Vec<Rat>,
    pub quality: Vec<Value>,
    pub value: Value,
    pub success: Arc<Success>,
}

/// Anything crossover can draw a parent from.
pub trait CrossoverParent {
    fn rat_at(&self, event: usize) -> Rat;
    fn quality(&self, event: usize) -> Value;
    fn value(&self) -> Value;
    fn success(&self) -> &Success;
}

impl CrossoverParent for Individual<'_> {
    #[inline]
    fn rat_at(&self, event: usize) -> Rat {
        self.soln.rat_at(event)
    }

    #[inline]
    fn quality(&self, event: usize) -> Value {
        self.quality[event]
    }

    #[inline]
    fn value(&self) -> Value {
        self.value
    }

    #[inline]
    fn success(&self) -> &Success {
        &self.success
    }
}

impl CrossoverParent for Genome {
    #[inline]
    fn rat_at(&self, event: usize) -> Rat {
        self.assignments[event]
    }

    #[inline]
    fn quality(&self, event: usize) -> Value {
        self.quality[event]
    }

    #[inline]
    fn value(&self) -> Value {
        self.value
    }

    #[inline]
    fn success(&self) -> &Success {
        &self.success
    }
}
