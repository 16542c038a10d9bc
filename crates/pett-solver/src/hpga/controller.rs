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

use super::comm::{ChildEnd, ParentEnd};
use super::island::Island;
use super::message::{Content, HC_ID};
use super::{SolveConfig, hillclimb};
use crossbeam_channel::{Receiver, never, select};
use crossbeam_utils::sync::WaitGroup;
use pett_core::prelude::*;
use pett_model::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Run the whole HPGA tree to completion and return the best solution found
/// with its valuation.
///
/// The run ends on the time budget, on a message from `interrupt`, or when a
/// good-enough best arrives: ideal `(0, 0)` when `config.ideal` is set, any
/// valid `(0, ·)` otherwise. Shutdown cascades root-to-leaf, and late
/// best-knowns observed during the cascade are kept.
pub fn run<'i>(
    inst: &'i Instance,
    config: &SolveConfig,
    interrupt: Receiver<()>,
) -> (Solution<'i>, Value) {
    config.validate();
    let seeds = SeedSequencer::new(config.seed);
    let (ctrl_tx, ctrl_rx) = super::comm::channel();

    std::thread::scope(|scope| {
        let mut island_txs = Vec::with_capacity(config.islands);
        for index in 0..config.islands {
            let (island_tx, island_rx) = super::comm::channel();
            island_txs.push(island_tx.clone());
            let island = Island::new(
                inst,
                index,
                ChildEnd::new(index as i32, ctrl_tx.clone()),
                island_rx,
                island_tx,
                config.clone(),
                seeds,
            );
            scope.spawn(move || island.run());
        }
        let parent = ParentEnd::new(island_txs);

        // Startup barrier: every slave seeds its sub-population, then the
        // wait-group clones drop and we proceed.
        let barrier = WaitGroup::new();
        parent.broadcast(|| Content::Wait(barrier.clone()));
        barrier.wait();
        tracing::info!(
            islands = config.islands,
            slaves = config.slaves,
            "all sub-populations seeded"
        );

        let hc_stop = Arc::new(AtomicBool::new(false));
        let (hc_tx, hc_rx) = super::comm::channel();
        {
            let stop = Arc::clone(&hc_stop);
            let seed = seeds.for_hill_climber();
            scope.spawn(move || hillclimb::run(inst, hc_tx, seed, stop));
        }

        let timeout = match config.timeout {
            Some(duration) => crossbeam_channel::after(duration),
            None => never(),
        };

        let mut best = inst.solution();
        let mut best_value = Value::WORST;
        let mut hc_rx = hc_rx;
        let mut interrupt = interrupt;

        loop {
            select! {
                recv(ctrl_rx) -> msg => {
                    let msg = msg.expect("controller inbound channel closed");
                    if let Content::Solution { rats, value } = msg.content
                        && install_best(inst, &parent, config, &mut best, &mut best_value,
                            msg.source, &rats, value)
                    {
                        break;
                    }
                }
                recv(hc_rx) -> msg => match msg {
                    Ok(msg) => match msg.content {
                        Content::Solution { rats, value } => {
                            if install_best(inst, &parent, config, &mut best, &mut best_value,
                                HC_ID, &rats, value)
                            {
                                break;
                            }
                        }
                        Content::Ordering { var_order, val_weights } => {
                            tracing::info!("forwarding hill-climber ordering to islands");
                            for island in 0..parent.n_children() {
                                parent.send_to_child(island, Content::Ordering {
                                    var_order: var_order.clone(),
                                    val_weights: val_weights.clone(),
                                });
                            }
                        }
                        _ => {}
                    },
                    // Hill-climber exhausted its budget and hung up.
                    Err(_) => hc_rx = never(),
                },
                recv(timeout) -> _ => {
                    tracing::info!("time budget exhausted");
                    break;
                }
                recv(interrupt) -> msg => match msg {
                    Ok(()) => {
                        tracing::info!("interrupted");
                        break;
                    }
                    Err(_) => interrupt = never(),
                },
            }
        }

        // Cancel the hill-climber first so the shutdown drain cannot race
        // against a blocked report.
        hc_stop.store(true, Ordering::Relaxed);
        drop(hc_rx);

        parent.stop_children(&ctrl_rx, |source, rats, value| {
            if value < best_value {
                best_value = value;
                let old = std::mem::replace(&mut best, inst.solution_from(&rats));
                inst.release(old);
                tracing::debug!(island = source, best = %value, "late best folded at shutdown");
            }
        });

        tracing::info!(best = %best_value, "search finished");
        (best, best_value)
    })
}

/// Install a candidate as the global best if it improves on it. Returns
/// whether the stop condition is met. The source island is not told its own
/// result.
#[allow(clippy::too_many_arguments)]
fn install_best<'i>(
    inst: &'i Instance,
    parent: &ParentEnd,
    config: &SolveConfig,
    best: &mut Solution<'i>,
    best_value: &mut Value,
    source: i32,
    rats: &[Rat],
    value: Value,
) -> bool {
    if value >= *best_value {
        return false;
    }
    *best_value = value;
    let old = std::mem::replace(best, inst.solution_from(rats));
    inst.release(old);
    tracing::info!(source, best = %value, "new global best");

    let skip = if source >= 0 { source as usize } else { usize::MAX };
    parent.broadcast_except(skip, || Content::Value(value));

    if config.ideal {
        value.is_ideal()
    } else {
        value.is_valid()
    }
}
