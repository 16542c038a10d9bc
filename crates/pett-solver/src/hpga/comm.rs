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

use super::message::{Content, Message, PARENT_ID};
use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender, bounded};
use pett_core::prelude::*;
use std::time::Duration;

/// Every worker's single inbound channel holds at most this many messages.
pub const CHANNEL_CAPACITY: usize = 5;

/// A send or a shutdown drain that stalls this long means the protocol has
/// deadlocked; that is a bug, and the process fails fast, also in release.
pub const WATCHDOG: Duration = Duration::from_secs(10);

#[inline]
pub fn channel() -> (Sender<Message>, Receiver<Message>) {
    bounded(CHANNEL_CAPACITY)
}

/// Watchdog send. A full channel that stays full and a disconnected peer are
/// both protocol bugs, never user-facing conditions.
pub fn send(tx: &Sender<Message>, source: i32, content: Content) {
    let kind = content.kind();
    match tx.send_timeout(Message { source, content }, WATCHDOG) {
        Ok(()) => {}
        Err(SendTimeoutError::Timeout(_)) => {
            panic!("send of {kind} message stalled for {WATCHDOG:?}: protocol deadlock")
        }
        Err(SendTimeoutError::Disconnected(_)) => {
            panic!("send of {kind} message to a disconnected worker")
        }
    }
}

/// The parent half of a worker: send handles to its children. The worker's
/// inbound receiver is owned by the worker itself, since parent and child
/// traffic share the one channel.
#[derive(Debug)]
pub struct ParentEnd {
    children: Vec<Sender<Message>>,
}

impl ParentEnd {
    #[inline]
    pub fn new(children: Vec<Sender<Message>>) -> Self {
        Self { children }
    }

    #[inline]
    pub fn n_children(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn send_to_child(&self, child: usize, content: Content) {
        send(&self.children[child], PARENT_ID, content);
    }

    /// Broadcast to every child; the closure builds one message per child.
    pub fn broadcast(&self, mut content: impl FnMut() -> Content) {
        for tx in &self.children {
            send(tx, PARENT_ID, content());
        }
    }

    /// Broadcast to every child except one (typically the message's source).
    pub fn broadcast_except(&self, skip: usize, mut content: impl FnMut() -> Content) {
        for (index, tx) in self.children.iter().enumerate() {
            if index != skip {
                send(tx, PARENT_ID, content());
            }
        }
    }

    /// Cascade shutdown: push `stop` to every child, then drain the inbound
    /// channel until each has acknowledged with `fin`. Solutions that arrive
    /// on the way are folded through `on_solution` so best-knowns observed
    /// at shutdown are not lost; everything else is discarded.
    ///
    /// The stop pushes keep draining our own inbox: a child blocked sending
    /// to us must get through before it can read its stop.
    pub fn stop_children(
        &self,
        rx: &Receiver<Message>,
        mut on_solution: impl FnMut(i32, Vec<Rat>, Value),
    ) {
        let mut fins = 0;
        let mut fold = |msg: Message, fins: &mut usize| match msg.content {
            Content::Fin => *fins += 1,
            Content::Solution { rats, value } => on_solution(msg.source, rats, value),
            _ => {}
        };

        for tx in &self.children {
            let mut pending = Message {
                source: PARENT_ID,
                content: Content::Stop,
            };
            let start = std::time::Instant::now();
            loop {
                match tx.try_send(pending) {
                    Ok(()) => break,
                    Err(crossbeam_channel::TrySendError::Full(msg)) => {
                        pending = msg;
                        while let Ok(inbound) = rx.try_recv() {
                            fold(inbound, &mut fins);
                        }
                        if start.elapsed() > WATCHDOG {
                            panic!("send of stop message stalled for {WATCHDOG:?}: protocol deadlock");
                        }
                        std::thread::yield_now();
                    }
                    Err(crossbeam_channel::TrySendError::Disconnected(_)) => {
                        panic!("send of stop message to a disconnected worker")
                    }
                }
            }
        }

        while fins < self.children.len() {
            match rx.recv_timeout(WATCHDOG) {
                Ok(msg) => fold(msg, &mut fins),
                Err(RecvTimeoutError::Timeout) => {
                    panic!(
                        "shutdown drain stalled for {WATCHDOG:?} with {} of {} children pending",
                        self.children.len() - fins,
                        self.children.len()
                    )
                }
                Err(RecvTimeoutError::Disconnected) => {
                    panic!("inbound channel disconnected while draining children")
                }
            }
        }
    }
}

/// The child half of a worker: its identity and the send handle to the
/// parent.
#[derive(Debug)]
pub struct ChildEnd {
    id: i32,
    to_parent: Sender<Message>,
}

impl ChildEnd {
    #[inline]
    pub fn new(id: i32, to_parent: Sender<Message>) -> Self {
        Self { id, to_parent }
    }

    #[inline]
    pub fn id(&self) -> i32 {
        self.id
    }

    #[inline]
    pub fn send_to_parent(&self, content: Content) {
        send(&self.to_parent, self.id, content);
    }

    /// The final acknowledgement; nothing may be sent after this.
    #[inline]
    pub fn fin(&self) {
        self.send_to_parent(Content::Fin);
    }
}
