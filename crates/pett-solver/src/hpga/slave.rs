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

use super::comm::ChildEnd;
use super::message::{Content, Message};
use super::{P_LOCAL, P_MUTATE};
use crate::population::{Individual, Population};
use crossbeam_channel::Receiver;
use pett_model::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// The leaf worker. Owns one sub-population and runs the steady-state GA
/// inner loop: mutate a little, cross over locally most of the time, and
/// once in a while ask the island for a foreign crossover.
pub(super) struct Slave<'i, 'p> {
    inst: &'i Instance,
    child: ChildEnd,
    rx: Receiver<Message>,
    pop: &'p Population<'i>,
    index: usize,
    rng: ChaCha8Rng,
    best: Value,
}

impl<'i, 'p> Slave<'i, 'p> {
    pub(super) fn new(
        inst: &'i Instance,
        child: ChildEnd,
        rx: Receiver<Message>,
        pop: &'p Population<'i>,
        index: usize,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            inst,
            child,
            rx,
            pop,
            index,
            rng,
            best: Value::WORST,
        }
    }

    pub(super) fn run(mut self) {
        // Seed the sub-population, publish the best of the batch, and let
        // the startup barrier (queued as a wait message) know we're ready.
        let (rats, value) = self
            .pop
            .subpop(self.index)
            .lock()
            .generate(self.inst, &mut self.rng);
        self.best = value;
        self.child
            .send_to_parent(Content::Solution { rats, value });
        tracing::debug!(slave = self.child.id(), best = %value, "sub-population seeded");

        loop {
            // Serve anything the island queued up, without blocking.
            while let Ok(msg) = self.rx.try_recv() {
                if self.handle(msg) == Flow::Stop {
                    self.child.fin();
                    return;
                }
            }

            if self.pop.subpop(self.index).lock().is_full() {
                self.child.send_to_parent(Content::Full);
                if self.wait_for(|c| matches!(c, Content::Continue)).is_none() {
                    self.child.fin();
                    return;
                }
                continue;
            }

            let roll: u32 = self.rng.random_range(1..=100);
            let produced = if roll < P_MUTATE {
                Some(
                    self.pop
                        .subpop(self.index)
                        .lock()
                        .mutate_one(self.inst, &mut self.rng),
                )
            } else if roll < P_MUTATE + P_LOCAL {
                self.pop
                    .subpop(self.index)
                    .lock()
                    .local_crossover(self.inst, &mut self.rng)
            } else {
                let genome = self
                    .pop
                    .subpop(self.index)
                    .lock()
                    .pick_export(&mut self.rng);
                self.child.send_to_parent(Content::CrossoverRequest(genome));
                match self.wait_for(|c| matches!(c, Content::Solution { .. })) {
                    Some(Content::Solution { rats, value }) => {
                        Some((self.inst.solution_from(&rats), value))
                    }
                    Some(_) => unreachable!("wait_for returned a non-matching message"),
                    None => {
                        self.child.fin();
                        return;
                    }
                }
            };

            let Some((soln, value)) = produced else {
                continue;
            };
            if value < self.best {
                self.best = value;
                self.child.send_to_parent(Content::Solution {
                    rats: soln.assignments(),
                    value,
                });
            }
            self.pop
                .subpop(self.index)
                .lock()
                .insert(Individual::with_value(soln, value));
        }
    }

    /// Process one inbound message outside of the produce step.
    fn handle(&mut self, msg: Message) -> Flow {
        match msg.content {
            Content::Stop => Flow::Stop,
            Content::Value(value) => {
                // A better best-known elsewhere prunes our own reporting.
                if value < self.best {
                    self.best = value;
                }
                Flow::Continue
            }
            Content::IndividualRequest { id } => {
                let genome = self
                    .pop
                    .subpop(self.index)
                    .lock()
                    .pick_export(&mut self.rng);
                self.child
                    .send_to_parent(Content::IndividualReply { id, genome });
                Flow::Continue
            }
            Content::Wait(group) => {
                drop(group);
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    /// Block until a message matching `want` arrives, serving everything
    /// else on the way. Returns `None` when a stop arrives instead.
    fn wait_for(&mut self, want: impl Fn(&Content) -> bool) -> Option<Content> {
        loop {
            let msg = self.rx.recv().expect("island channel closed");
            if want(&msg.content) {
                return Some(msg.content);
            }
            if self.handle(msg) == Flow::Stop {
                return None;
            }
        }
    }
}
