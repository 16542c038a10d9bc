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

use super::message::{Content, HC_ID, Message};
use crate::heuristics::{ValueWeights, random_assignment};
use crossbeam_channel::Sender;
use pett_model::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Total improvement-step budget across all restarts.
pub const MAX_TRIES: usize = 1000;

/// Step budget of a single episode before restarting from scratch.
pub const CUT_OFF: usize = 50;

/// The hill-climbing metaheuristic. Runs once, alongside the GA: repeated
/// random restarts with first-improvement descent. Valid solutions found on
/// the way are reported; everything else feeds blame attribution, which
/// yields a static variable ordering (low-blame events first) and a
/// strictly-positive value-weight table, both emitted at the end.
///
/// The reply channel disconnecting and the stop flag both cancel the run;
/// the controller does not wait out the budget at shutdown.
pub fn run(inst: &Instance, report: Sender<Message>, seed: u64, stop: Arc<AtomicBool>) {
    let mut rng = SeedSequencer::rng(seed);
    let n_events = inst.n_events();
    let mut var_weights: Vec<u64> = vec![0; n_events];
    let mut val_weights: Vec<HashMap<Rat, i64>> = vec![HashMap::new(); n_events];
    let mut blame: Vec<u32> = vec![0; n_events];

    let mut tries = 0;
    'episodes: while tries < MAX_TRIES && !stop.load(Ordering::Relaxed) {
        let mut soln = inst.solution();
        random_assignment(&mut soln, &mut rng);

        let mut steps = 0;
        let mut found = false;
        while steps < CUT_OFF && tries < MAX_TRIES {
            steps += 1;
            tries += 1;
            if stop.load(Ordering::Relaxed) {
                inst.release(soln);
                break 'episodes;
            }

            match soln.find_improvement() {
                Some((event, rat)) => soln.assign(event, rat),
                None => break, // local minimum
            }

            if soln.violations() == 0 {
                let value = soln.value();
                tracing::debug!(best = %value, "hill-climber found a valid solution");
                if !report_or_cancelled(&report, Content::Solution {
                    rats: soln.assignments(),
                    value,
                }) {
                    inst.release(soln);
                    return;
                }
                found = true;
                break;
            }
        }

        if !found {
            attribute_blame(&soln, &mut blame, &mut var_weights, &mut val_weights);
        }
        inst.release(soln);
    }

    let (var_order, val_weights) = derive_ordering(var_weights, val_weights);
    tracing::debug!("hill-climber budget exhausted; emitting variable ordering");
    report_or_cancelled(&report, Content::Ordering {
        var_order,
        val_weights,
    });
}

/// Fold one failed episode into the weight tables.
fn attribute_blame(
    soln: &Solution<'_>,
    blame: &mut [u32],
    var_weights: &mut [u64],
    val_weights: &mut [HashMap<Rat, i64>],
) {
    blame.fill(0);
    for ((a, b), count) in soln.constraint_pairs() {
        blame[a as usize] += count;
        blame[b as usize] += count;
    }

    for (event, &count) in blame.iter().enumerate() {
        let rat = soln.rat_at(event);
        if !rat.assigned() {
            continue;
        }
        if count == 0 {
            *val_weights[event].entry(rat).or_insert(0) += 1;
        } else {
            var_weights[event] += u64::from(count);
            *val_weights[event].entry(rat).or_insert(0) -= 1;
        }
    }
}

/// Sort events by ascending blame and translate the value weights so every
/// weight is strictly positive.
fn derive_ordering(
    var_weights: Vec<u64>,
    val_weights: Vec<HashMap<Rat, i64>>,
) -> (Vec<u32>, ValueWeights) {
    let mut var_order: Vec<u32> = (0..var_weights.len() as u32).collect();
    var_order.sort_by_key(|&event| var_weights[event as usize]);

    // Unobserved rats carry an implicit weight of zero, so the translation
    // floor includes it.
    let min = val_weights
        .iter()
        .flat_map(|table| table.values())
        .copied()
        .min()
        .unwrap_or(0)
        .min(0);
    let baseline = (1 - min) as u32;
    let tables = val_weights
        .into_iter()
        .map(|table| {
            table
                .into_iter()
                .map(|(rat, weight)| (rat, (weight - min + 1) as u32))
                .collect()
        })
        .collect();

    (var_order, ValueWeights::new(tables, baseline))
}

/// Send a report; false means the run has been cancelled under us.
fn report_or_cancelled(report: &Sender<Message>, content: Content) -> bool {
    report
        .send(Message {
            source: HC_ID,
            content,
        })
        .is_ok()
}
