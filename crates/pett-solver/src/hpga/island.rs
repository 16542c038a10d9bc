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
use super::message::{Content, GM_ID, Message, PARENT_ID};
use super::slave::Slave;
use super::{GM_INTERVAL, SolveConfig};
use crate::heuristics::{ValueWeights, ordered_weighted};
use crate::population::{Genome, Population, crossover};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use pett_core::prelude::*;
use pett_model::prelude::*;
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// What an outstanding individual request is for.
#[derive(Debug)]
enum Pending {
    Crossover { requester: usize, genome: Genome },
    Gm,
}

/// The mid-level worker. Owns its slaves and their shared population,
/// mediates foreign crossovers, runs selection when the population fills,
/// and produces GM individuals on a timer.
pub(super) struct Island<'i> {
    inst: &'i Instance,
    index: usize,
    child: ChildEnd,
    rx: Receiver<Message>,
    self_tx: Sender<Message>,
    config: SolveConfig,
    seeds: SeedSequencer,
    rng: ChaCha8Rng,
    top: Value,
    pending: HashMap<u32, Pending>,
    pending_gm: Vec<(Vec<Rat>, Value)>,
    ordering: Option<(Vec<u32>, ValueWeights)>,
}

impl<'i> Island<'i> {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        inst: &'i Instance,
        index: usize,
        child: ChildEnd,
        rx: Receiver<Message>,
        self_tx: Sender<Message>,
        config: SolveConfig,
        seeds: SeedSequencer,
    ) -> Self {
        let rng = SeedSequencer::rng(seeds.for_island(index));
        Self {
            inst,
            index,
            child,
            rx,
            self_tx,
            config,
            seeds,
            rng,
            top: Value::WORST,
            pending: HashMap::new(),
            pending_gm: Vec::new(),
            ordering: None,
        }
    }

    pub(super) fn run(mut self) {
        let pop = Population::new(
            self.config.min_pop,
            self.config.max_pop,
            self.config.slaves,
        );
        let (gm_stop_tx, gm_stop_rx) = crossbeam_channel::bounded::<()>(1);

        std::thread::scope(|scope| {
            let mut slave_txs = Vec::with_capacity(self.config.slaves);
            for index in 0..self.config.slaves {
                let (tx, slave_rx) = super::comm::channel();
                slave_txs.push(tx);
                let slave = Slave::new(
                    self.inst,
                    ChildEnd::new(index as i32, self.self_tx.clone()),
                    slave_rx,
                    &pop,
                    index,
                    SeedSequencer::rng(self.seeds.for_slave(self.index, index)),
                );
                scope.spawn(move || slave.run());
            }
            let parent = ParentEnd::new(slave_txs);

            let gm_tx = self.self_tx.clone();
            scope.spawn(move || gm_producer(gm_stop_rx, gm_tx));

            self.event_loop(&parent, &pop);
            drop(gm_stop_tx);
        });
    }

    fn event_loop(&mut self, parent: &ParentEnd, pop: &Population<'i>) {
        loop {
            let msg = self.rx.recv().expect("island inbound channel closed");
            match (msg.source, msg.content) {
                (PARENT_ID, Content::Stop) => {
                    self.shutdown(parent);
                    return;
                }
                (PARENT_ID, Content::Value(value)) => {
                    if value < self.top {
                        self.top = value;
                    }
                    parent.broadcast(|| Content::Value(value));
                }
                (PARENT_ID, Content::Ordering {
                    var_order,
                    val_weights,
                }) => {
                    tracing::debug!(island = self.index, "variable ordering received");
                    self.ordering = Some((var_order, val_weights));
                }
                (PARENT_ID, Content::Wait(group)) => {
                    parent.broadcast(|| Content::Wait(group.clone()));
                    drop(group);
                }
                (GM_ID, Content::GmTick) => self.request_gm_donor(parent),
                (source, content) if source >= 0 => {
                    self.handle_slave(parent, pop, source as usize, content)
                }
                (source, content) => {
                    tracing::warn!(island = self.index, source, kind = content.kind(),
                        "unexpected message dropped");
                }
            }
        }
    }

    fn handle_slave(
        &mut self,
        parent: &ParentEnd,
        pop: &Population<'i>,
        source: usize,
        content: Content,
    ) {
        match content {
            Content::Solution { rats, value } => {
                if value < self.top {
                    self.top = value;
                    tracing::debug!(island = self.index, slave = source, best = %value,
                        "new island best");
                    parent.broadcast_except(source, || Content::Value(value));
                    self.child.send_to_parent(Content::Solution { rats, value });
                }
            }
            Content::Full => {
                // Selection must not run while an individual request is in
                // flight: it transiently empties the sub-populations a
                // parked slave may still serve picks from. The reporter is
                // released instead and will report again.
                if self.pending.is_empty() && pop.should_select() {
                    self.run_selection(pop);
                    parent.broadcast(|| Content::Continue);
                } else {
                    parent.send_to_child(source, Content::Continue);
                }
            }
            Content::CrossoverRequest(genome) => {
                let partner = self.pick_partner(parent.n_children(), source);
                let id = self.fresh_id();
                self.pending.insert(
                    id,
                    Pending::Crossover {
                        requester: source,
                        genome,
                    },
                );
                parent.send_to_child(partner, Content::IndividualRequest { id });
            }
            Content::IndividualReply { id, genome } => {
                match self.pending.remove(&id) {
                    Some(Pending::Crossover { requester, genome: mother }) => {
                        self.finish_crossover(parent, requester, mother, genome)
                    }
                    Some(Pending::Gm) => self.finish_gm(genome),
                    None => {}
                }
                // A selection deferred on this request may be due now.
                if self.pending.is_empty() && pop.should_select() {
                    self.run_selection(pop);
                    parent.broadcast(|| Content::Continue);
                }
            }
            other => {
                tracing::warn!(island = self.index, slave = source, kind = other.kind(),
                    "unexpected slave message dropped");
            }
        }
    }

    fn finish_crossover(
        &mut self,
        parent: &ParentEnd,
        requester: usize,
        mother: Genome,
        father: Genome,
    ) {
        let (child_soln, value) = crossover(self.inst, &mother, &father, &mut self.rng);
        let rats = child_soln.assignments();
        self.inst.release(child_soln);

        parent.send_to_child(
            requester,
            Content::Solution {
                rats: rats.clone(),
                value,
            },
        );
        if value < self.top {
            self.top = value;
            tracing::debug!(island = self.index, best = %value, "foreign crossover improved best");
            parent.broadcast(|| Content::Value(value));
            self.child.send_to_parent(Content::Solution { rats, value });
        }
    }

    /// Every GM interval, borrow a donor individual from a random slave.
    fn request_gm_donor(&mut self, parent: &ParentEnd) {
        let donor = self.rng.random_range(0..parent.n_children());
        let id = self.fresh_id();
        self.pending.insert(id, Pending::Gm);
        parent.send_to_child(donor, Content::IndividualRequest { id });
    }

    /// The genetic modification operator: re-roll one random chromosome of
    /// the donor, weighted by the hill-climber's value weights once an
    /// ordering has arrived.
    fn finish_gm(&mut self, donor: Genome) {
        let mut soln = self.inst.solution_from(&donor.assignments);
        let event = self.rng.random_range(0..self.inst.n_events());
        let domain = self.inst.base_domain(event);

        let rat = match &self.ordering {
            Some((_, weights)) => {
                let mut chosen = None;
                let mut total = 0u64;
                for &rat in domain {
                    let w = u64::from(weights.weight(event, rat));
                    total += w;
                    if self.rng.random_range(0..total) < w {
                        chosen = Some(rat);
                    }
                }
                chosen
            }
            None => domain.choose(&mut self.rng).copied(),
        };
        if let Some(rat) = rat {
            soln.assign(event, rat);
        }

        let value = soln.value();
        let rats = soln.assignments();
        self.inst.release(soln);
        self.pending_gm.push((rats, value));
    }

    fn run_selection(&mut self, pop: &Population<'i>) {
        // With an ordering in hand and nothing pending, contribute one
        // ordered-weighted construction so selection always has fresh blood.
        if self.pending_gm.is_empty()
            && let Some((var_order, weights)) = &self.ordering
        {
            let mut soln = self.inst.solution();
            ordered_weighted(&mut soln, var_order, weights, &mut self.rng);
            let value = soln.value();
            let rats = soln.assignments();
            self.inst.release(soln);
            self.pending_gm.push((rats, value));
        }

        let injected_before = self.pending_gm.len();
        pop.select(self.inst, &mut self.pending_gm);
        tracing::debug!(
            island = self.index,
            injected = injected_before - self.pending_gm.len(),
            "selection complete"
        );
    }

    fn pick_partner(&mut self, n_slaves: usize, requester: usize) -> usize {
        let mut partner = self.rng.random_range(0..n_slaves - 1);
        if partner >= requester {
            partner += 1;
        }
        partner
    }

    fn fresh_id(&mut self) -> u32 {
        loop {
            let id = self.rng.random();
            if !self.pending.contains_key(&id) {
                return id;
            }
        }
    }

    fn shutdown(&mut self, parent: &ParentEnd) {
        let rx = &self.rx;
        let top = &mut self.top;
        let child = &self.child;
        parent.stop_children(rx, |_, rats, value| {
            if value < *top {
                *top = value;
                child.send_to_parent(Content::Solution { rats, value });
            }
        });
        self.child.fin();
    }
}

/// The island's periodic GM producer task. Ticks are best-effort: a full
/// island inbox just skips an interval.
fn gm_producer(stop: Receiver<()>, to_island: Sender<Message>) {
    loop {
        match stop.recv_timeout(GM_INTERVAL) {
            Err(RecvTimeoutError::Timeout) => {
                match to_island.try_send(Message {
                    source: GM_ID,
                    content: Content::GmTick,
                }) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => return,
                }
            }
            _ => return,
        }
    }
}
