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

//! The hierarchical parallel genetic algorithm: a three-level tree of
//! cooperating workers (one controller, several islands, several slaves per
//! island) coordinated purely by typed message passing on bounded channels.

pub mod comm;
mod controller;
pub mod hillclimb;
mod island;
pub mod message;
mod slave;

pub use controller::run;

use std::time::Duration;

/// Probability (in percent points of a 1..=100 roll) of a mutation step.
const P_MUTATE: u32 = 5;

/// Probability mass of a local crossover; the remainder of the roll goes to
/// foreign crossovers through the island.
const P_LOCAL: u32 = 75;

/// How often each island produces a genetic-modification individual.
const GM_INTERVAL: Duration = Duration::from_secs(300);

/// Knobs of one solver run.
#[derive(Debug, Clone)]
pub struct SolveConfig {
    pub islands: usize,
    pub slaves: usize,
    pub min_pop: usize,
    pub max_pop: usize,
    /// `None` means no time budget.
    pub timeout: Option<Duration>,
    /// Stop only on an ideal `(0, 0)` best instead of any valid `(0, ·)`.
    pub ideal: bool,
    pub seed: u64,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            islands: 2,
            slaves: 2,
            min_pop: 50,
            max_pop: 75,
            timeout: Some(Duration::from_secs(30 * 60)),
            ideal: false,
            seed: 0,
        }
    }
}

impl SolveConfig {
    /// Configuration errors are caught at the CLI boundary; reaching this
    /// with bad values is a programming error.
    pub(crate) fn validate(&self) {
        assert!(self.islands >= 2, "at least two islands are required");
        assert!(self.slaves >= 2, "at least two slaves per island are required");
        assert!(
            self.max_pop > self.min_pop,
            "max population size must exceed min population size"
        );
        assert!(self.min_pop >= 2, "sub-populations need at least two members");
    }
}
