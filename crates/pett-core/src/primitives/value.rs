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

/// A solution valuation: hard-constraint violations first, then the soft
/// fitness penalty. The derived ordering is lexicographic, so `a < b` means
/// `a` is the strictly better valuation.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Value {
    pub violations: u32,
    pub fitness: u32,
}

impl Value {
    /// The sentinel that every real valuation improves on.
    pub const WORST: Value = Value {
        violations: u32::MAX,
        fitness: u32::MAX,
    };

    #[inline]
    pub const fn new(violations: u32, fitness: u32) -> Self {
        Self {
            violations,
            fitness,
        }
    }

    /// A valuation with no hard violations and no soft penalty.
    #[inline]
    pub const fn ideal() -> Self {
        Self {
            violations: 0,
            fitness: 0,
        }
    }

    #[inline]
    pub const fn is_ideal(&self) -> bool {
        self.violations == 0 && self.fitness == 0
    }

    /// Valid means free of hard-constraint violations; the soft penalty may
    /// be anything.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.violations == 0
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.violations, self.fitness)
    }
}
