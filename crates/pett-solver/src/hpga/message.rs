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

use crate::heuristics::ValueWeights;
use crate::population::Genome;
use crossbeam_utils::sync::WaitGroup;
use pett_core::prelude::*;

/// Source id used by a parent; a child only ever has one parent, so no
/// further distinction is needed.
pub const PARENT_ID: i32 = -1;

/// Source id of the hill-climbing metaheuristic task.
pub const HC_ID: i32 = -2;

/// Source id of an island's periodic GM producer.
pub const GM_ID: i32 = -3;

/// A message envelope: who sent it, and what it carries.
#[derive(Debug)]
pub struct Message {
    pub source: i32,
    pub content: Content,
}

/// Everything that travels between workers in the tree.
#[derive(Debug)]
pub enum Content {
    /// Root-to-leaf cancellation.
    Stop,
    /// A child's final message; exactly one per child, nothing follows it.
    Fin,
    /// Release a slave parked after reporting a full sub-population.
    Continue,
    /// A slave's sub-population hit its maximum size.
    Full,
    /// A best-known valuation, broadcast to prune the search.
    Value(Value),
    /// A full candidate: an assignment snapshot with its valuation.
    Solution { rats: Vec<Rat>, value: Value },
    /// A slave asks its island for a foreign crossover with this parent.
    CrossoverRequest(Genome),
    /// The island asks a slave for a partner individual.
    IndividualRequest { id: u32 },
    /// The slave's answer to an [`Content::IndividualRequest`].
    IndividualReply { id: u32, genome: Genome },
    /// The hill-climber's variable ordering and value-weight table.
    Ordering {
        var_order: Vec<u32>,
        val_weights: ValueWeights,
    },
    /// Startup barrier handle; dropped once the receiver is seeded.
    Wait(WaitGroup),
    /// The GM producer's interval fired.
    GmTick,
}

impl Content {
    /// Short name for watchdog diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Content::Stop => "stop",
            Content::Fin => "fin",
            Content::Continue => "continue",
            Content::Full => "full",
            Content::Value(_) => "value",
            Content::Solution { .. } => "solution",
            Content::CrossoverRequest(_) => "crossoverRequest",
            Content::IndividualRequest { .. } => "individualRequest",
            Content::IndividualReply { .. } => "individualReply",
            Content::Ordering { .. } => "ordering",
            Content::Wait(_) => "wait",
            Content::GmTick => "gmTick",
        }
    }
}
