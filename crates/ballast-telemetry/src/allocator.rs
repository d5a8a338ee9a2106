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

//! A `GlobalAlloc` wrapper that feeds the heap counters in `ballast_core::memory`.

use ballast_core::memory::{
    CURRENTLY_ALLOCATED_BYTES, PEAK_ALLOCATED_BYTES, TOTAL_ALLOCATIONS, TOTAL_DEALLOCATIONS,
};
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::Ordering;

/// Wraps an allocator (`System` by default) and keeps the global heap counters
/// up to date, which is what the heap tier of the governor samples.
///
/// The allocator never logs: the logger itself allocates.
///
/// # Usage
///
/// ```rust,ignore
/// use ballast_telemetry::TrackingAllocator;
///
/// #[global_allocator]
/// static GLOBAL: TrackingAllocator = TrackingAllocator::new(std::alloc::System);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackingAllocator<A = System> {
    inner: A,
}

impl<A> TrackingAllocator<A> {
    /// Creates a tracking allocator around `inner`.
    pub const fn new(inner: A) -> Self {
        Self { inner }
    }
}

fn record_growth(size: usize) {
    if let Ok(previous) =
        CURRENTLY_ALLOCATED_BYTES.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
            current.checked_add(size)
        })
    {
        PEAK_ALLOCATED_BYTES.fetch_max((previous + size) as u64, Ordering::Relaxed);
    }
}

fn record_shrink(size: usize) {
    // Saturate: memory allocated before the allocator was installed can be freed through it.
    let _ = CURRENTLY_ALLOCATED_BYTES.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_sub(size))
    });
}

unsafe impl<A: GlobalAlloc> GlobalAlloc for TrackingAllocator<A> {
    /// # Safety
    ///
    /// Same contract as [`GlobalAlloc::alloc`].
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc(layout);
        if !ptr.is_null() {
            TOTAL_ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
            record_growth(layout.size());
        }
        ptr
    }

    /// # Safety
    ///
    /// Same contract as [`GlobalAlloc::dealloc`].
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        TOTAL_DEALLOCATIONS.fetch_add(1, Ordering::Relaxed);
        record_shrink(layout.size());
        self.inner.dealloc(ptr, layout);
    }

    /// # Safety
    ///
    /// Same contract as [`GlobalAlloc::alloc_zeroed`].
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc_zeroed(layout);
        if !ptr.is_null() {
            TOTAL_ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
            record_growth(layout.size());
        }
        ptr
    }

    /// # Safety
    ///
    /// Same contract as [`GlobalAlloc::realloc`].
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let old_size = layout.size();
        let new_ptr = self.inner.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            match new_size.cmp(&old_size) {
                std::cmp::Ordering::Greater => record_growth(new_size - old_size),
                std::cmp::Ordering::Less => record_shrink(old_size - new_size),
                std::cmp::Ordering::Equal => {}
            }
        }
        new_ptr
    }
}
