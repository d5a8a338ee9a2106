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

//! Acts as the agent for resource-set streaming.
//!
//! Callers hand over batches of bundle keys; the [`LoadQueue`] dispatches them
//! to the external loader strictly one at a time, one dispatch per frame at
//! most, and reports progress through the callbacks registered with the batch.

mod queue;

pub use self::queue::LoadQueue;
