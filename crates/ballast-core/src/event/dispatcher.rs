// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::MemoryEvent;

/// A synchronous observer of [`MemoryEvent`]s.
pub trait MemoryEventListener: Send {
    /// Called before the clears announced by `event` run.
    fn on_memory_event(&mut self, event: MemoryEvent);
}

impl<F> MemoryEventListener for F
where
    F: FnMut(MemoryEvent) + Send,
{
    fn on_memory_event(&mut self, event: MemoryEvent) {
        self(event)
    }
}

/// Fans a [`MemoryEvent`] out to an explicit list of subscribers.
///
/// Two kinds of subscribers are supported: synchronous listeners, called in
/// registration order, and channel subscribers that receive a copy on a
/// `flume` channel for later processing. Channel subscribers whose receiver
/// has been dropped are pruned on the next dispatch.
#[derive(Default)]
pub struct MemoryEventDispatcher {
    listeners: Vec<Box<dyn MemoryEventListener>>,
    channels: Vec<flume::Sender<MemoryEvent>>,
}

impl MemoryEventDispatcher {
    /// Creates a dispatcher with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a synchronous listener.
    pub fn subscribe(&mut self, listener: impl MemoryEventListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Registers a channel subscriber and returns its receiving end.
    pub fn subscribe_channel(&mut self) -> flume::Receiver<MemoryEvent> {
        let (sender, receiver) = flume::unbounded();
        self.channels.push(sender);
        receiver
    }

    /// Delivers `event` to every subscriber before returning.
    pub fn dispatch(&mut self, event: MemoryEvent) {
        log::debug!(
            "Dispatching {event} to {} listener(s) and {} channel(s).",
            self.listeners.len(),
            self.channels.len()
        );

        for listener in &mut self.listeners {
            listener.on_memory_event(event);
        }

        self.channels.retain(|sender| match sender.send(event) {
            Ok(()) => true,
            Err(_) => {
                log::trace!("Dropping disconnected memory event channel.");
                false
            }
        });
    }

    /// Returns the number of live subscribers of both kinds.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len() + self.channels.len()
    }
}

impl std::fmt::Debug for MemoryEventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventDispatcher")
            .field("listeners", &self.listeners.len())
            .field("channels", &self.channels.len())
            .finish()
    }
}
