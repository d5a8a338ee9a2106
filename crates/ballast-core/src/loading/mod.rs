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

//! Contracts for streaming resource sets into the engine.
//!
//! The governor never decodes a bundle itself. It only decides *when* a
//! resource set should be requested, and observes completion through a
//! [`LoadTicket`] handed to the external [`BundleLoader`].

mod state;
mod ticket;

pub use self::state::LoadState;
pub use self::ticket::{LoadCompletion, LoadTicket};

use serde::{Deserialize, Serialize};

/// An opaque resource-set identifier, as understood by the bundle loader.
pub type ResourceKey = String;

/// A caller-supplied progress observer.
///
/// Returning an `Err` is reported in the log and otherwise ignored; it never
/// stalls the load queue.
pub type ProgressCallback = Box<dyn FnMut(LoadState) -> anyhow::Result<()> + Send>;

/// How resources reach the running application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Resources are built into the base image and are always available.
    Embedded,
    /// Resources live in bundles that must be streamed in before use.
    Streamed,
}

impl DeliveryMode {
    /// Returns `true` if resources must be fetched through the bundle loader.
    pub fn requires_streaming(self) -> bool {
        matches!(self, DeliveryMode::Streamed)
    }
}

/// Reports the delivery mode currently in effect.
///
/// The mode may change at runtime (e.g. switching from an editor build to a
/// packed build), so the load queue asks on every call instead of caching it.
pub trait DeliveryModeQuery: Send + Sync {
    /// Returns the active delivery mode.
    fn delivery_mode(&self) -> DeliveryMode;
}

impl DeliveryModeQuery for DeliveryMode {
    fn delivery_mode(&self) -> DeliveryMode {
        *self
    }
}

/// The external mechanism that actually streams bundles.
///
/// `load_async` must return immediately. The loader reports back through the
/// [`LoadTicket`], from any thread; the governor applies the result on its own
/// tick. A loader that never finishes a ticket stalls the queue.
pub trait BundleLoader: Send {
    /// Starts loading the bundle identified by `key`.
    ///
    /// An `Err` means the request could not even be started. The queue treats
    /// it as a finished (failed) load and moves on.
    fn load_async(&mut self, key: &str, ticket: LoadTicket) -> anyhow::Result<()>;

    /// Releases a previously loaded bundle.
    fn unload(&mut self, key: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_streamed_mode_requires_streaming() {
        assert!(DeliveryMode::Streamed.requires_streaming());
        assert!(!DeliveryMode::Embedded.requires_streaming());
    }

    #[test]
    fn fixed_mode_answers_its_own_query() {
        let query: &dyn DeliveryModeQuery = &DeliveryMode::Embedded;
        assert_eq!(query.delivery_mode(), DeliveryMode::Embedded);
    }
}
