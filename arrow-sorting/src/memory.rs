// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Memory resources that the outputs of the sorting kernels are accounted against
//!
//! Every kernel that produces a new column reserves the size of its output
//! from a [`MemoryResource`] before building it. The returned
//! [`MemoryReservation`] travels with the output and is released when the
//! output is dropped.
//!
//! ```
//! # use std::sync::Arc;
//! # use arrow_array::{ArrayRef, Int32Array};
//! # use arrow_sorting::memory::{MemoryResource, TrackingMemoryResource};
//! # use arrow_sorting::sort::sorted_order;
//! # use arrow_sorting::table::TableView;
//! let columns: Vec<ArrayRef> = vec![Arc::new(Int32Array::from(vec![3, 1, 2]))];
//! let table = TableView::try_new(&columns).unwrap();
//!
//! let resource = TrackingMemoryResource::default();
//! let order = sorted_order(&table, &[], &[], Some(&resource)).unwrap();
//! assert_eq!(resource.allocated(), 12);
//!
//! drop(order);
//! assert_eq!(resource.allocated(), 0);
//! assert_eq!(resource.peak(), 12);
//! ```

use arrow_schema::ArrowError;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// A source of memory that output columns are reserved from
pub trait MemoryResource: Send + Sync + Debug {
    /// Reserves `size` bytes, returning a [`MemoryReservation`] that releases
    /// them on drop
    fn reserve(&self, size: usize) -> Result<Box<dyn MemoryReservation>, ArrowError>;

    /// Returns the number of bytes currently reserved
    fn allocated(&self) -> usize;
}

/// A reservation within a [`MemoryResource`] that is freed on drop
pub trait MemoryReservation: Send + Sync + Debug {
    /// Returns the number of reserved bytes
    fn size(&self) -> usize;
}

impl<T: MemoryResource + ?Sized> MemoryResource for Arc<T> {
    fn reserve(&self, size: usize) -> Result<Box<dyn MemoryReservation>, ArrowError> {
        self.as_ref().reserve(size)
    }

    fn allocated(&self) -> usize {
        self.as_ref().allocated()
    }
}

#[derive(Debug, Default)]
struct Usage {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Usage {
    fn add(&self, size: usize) {
        let current = self.current.fetch_add(size, Ordering::Relaxed) + size;
        self.peak.fetch_max(current, Ordering::Relaxed);
    }

    fn sub(&self, size: usize) {
        self.current.fetch_sub(size, Ordering::Relaxed);
    }
}

/// A [`MemoryResource`] that tracks current and peak usage without limit
#[derive(Debug, Default, Clone)]
pub struct TrackingMemoryResource(Arc<Usage>);

impl TrackingMemoryResource {
    /// Returns the largest number of bytes reserved at any one time
    pub fn peak(&self) -> usize {
        self.0.peak.load(Ordering::Relaxed)
    }
}

impl MemoryResource for TrackingMemoryResource {
    fn reserve(&self, size: usize) -> Result<Box<dyn MemoryReservation>, ArrowError> {
        self.0.add(size);
        log::trace!("reserved {size} bytes, {} in use", self.allocated());
        Ok(Box::new(Tracker {
            size,
            shared: Arc::clone(&self.0),
        }))
    }

    fn allocated(&self) -> usize {
        self.0.current.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct Tracker {
    size: usize,
    shared: Arc<Usage>,
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.shared.sub(self.size);
    }
}

impl MemoryReservation for Tracker {
    fn size(&self) -> usize {
        self.size
    }
}

/// A [`MemoryResource`] adaptor that refuses reservations once the bytes
/// reserved through it would exceed `limit`
///
/// ```
/// # use std::sync::Arc;
/// # use arrow_sorting::memory::{LimitingMemoryResource, MemoryResource, TrackingMemoryResource};
/// let upstream = Arc::new(TrackingMemoryResource::default());
/// let limited = LimitingMemoryResource::new(upstream.clone(), 100);
///
/// let a = limited.reserve(60).unwrap();
/// assert!(limited.reserve(60).is_err());
/// assert_eq!(upstream.allocated(), 60);
///
/// drop(a);
/// assert!(limited.reserve(100).is_ok());
/// ```
#[derive(Debug)]
pub struct LimitingMemoryResource {
    upstream: Arc<dyn MemoryResource>,
    limit: usize,
    used: Arc<AtomicUsize>,
}

impl LimitingMemoryResource {
    /// Create a new adaptor that allows at most `limit` bytes from `upstream`
    pub fn new(upstream: Arc<dyn MemoryResource>, limit: usize) -> Self {
        Self {
            upstream,
            limit,
            used: Default::default(),
        }
    }

    /// Returns the configured limit in bytes
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl MemoryResource for LimitingMemoryResource {
    fn reserve(&self, size: usize) -> Result<Box<dyn MemoryReservation>, ArrowError> {
        let limit = self.limit;
        self.used
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |used| {
                used.checked_add(size).filter(|total| *total <= limit)
            })
            .map_err(|used| {
                ArrowError::MemoryError(format!(
                    "Cannot reserve {size} bytes: {used} of {limit} bytes already in use"
                ))
            })?;

        match self.upstream.reserve(size) {
            Ok(inner) => Ok(Box::new(Limited {
                inner,
                used: Arc::clone(&self.used),
            })),
            Err(e) => {
                self.used.fetch_sub(size, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    fn allocated(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct Limited {
    inner: Box<dyn MemoryReservation>,
    used: Arc<AtomicUsize>,
}

impl Drop for Limited {
    fn drop(&mut self) {
        self.used.fetch_sub(self.inner.size(), Ordering::Relaxed);
    }
}

impl MemoryReservation for Limited {
    fn size(&self) -> usize {
        self.inner.size()
    }
}

fn default_slot() -> &'static RwLock<Arc<dyn MemoryResource>> {
    static DEFAULT: OnceLock<RwLock<Arc<dyn MemoryResource>>> = OnceLock::new();
    DEFAULT.get_or_init(|| RwLock::new(Arc::new(TrackingMemoryResource::default())))
}

/// Returns the process-wide default [`MemoryResource`]
///
/// Kernels use this resource when no resource is passed explicitly. It is a
/// [`TrackingMemoryResource`] until replaced with [`set_default_resource`].
pub fn default_resource() -> Arc<dyn MemoryResource> {
    let slot = default_slot().read().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(&*slot)
}

/// Replaces the process-wide default [`MemoryResource`], returning the previous one
///
/// Reservations already taken from the previous resource are unaffected.
pub fn set_default_resource(resource: Arc<dyn MemoryResource>) -> Arc<dyn MemoryResource> {
    let mut slot = default_slot()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_resource() {
        let resource = TrackingMemoryResource::default();
        let a = resource.reserve(100).unwrap();
        let b = resource.reserve(28).unwrap();
        assert_eq!(a.size(), 100);
        assert_eq!(resource.allocated(), 128);

        drop(a);
        assert_eq!(resource.allocated(), 28);
        let c = resource.reserve(50).unwrap();
        assert_eq!(resource.allocated(), 78);
        assert_eq!(resource.peak(), 128);

        drop(b);
        drop(c);
        assert_eq!(resource.allocated(), 0);
        assert_eq!(resource.peak(), 128);
    }

    #[test]
    fn test_tracking_resource_clones_share_usage() {
        let resource = TrackingMemoryResource::default();
        let clone = resource.clone();
        let _r = clone.reserve(10).unwrap();
        assert_eq!(resource.allocated(), 10);
    }

    #[test]
    fn test_limiting_resource() {
        let upstream = Arc::new(TrackingMemoryResource::default());
        let limited = LimitingMemoryResource::new(upstream.clone(), 64);
        assert_eq!(limited.limit(), 64);

        let a = limited.reserve(40).unwrap();
        let err = limited.reserve(40).unwrap_err();
        assert!(matches!(err, ArrowError::MemoryError(_)), "{err}");
        assert_eq!(limited.allocated(), 40);
        assert_eq!(upstream.allocated(), 40);

        let b = limited.reserve(24).unwrap();
        assert_eq!(limited.allocated(), 64);

        drop(a);
        drop(b);
        assert_eq!(limited.allocated(), 0);
        assert_eq!(upstream.allocated(), 0);
    }

    #[test]
    fn test_limiting_overflow() {
        let limited =
            LimitingMemoryResource::new(Arc::new(TrackingMemoryResource::default()), usize::MAX);
        let _a = limited.reserve(1).unwrap();
        assert!(limited.reserve(usize::MAX).is_err());
    }

    #[test]
    fn test_nested_limits() {
        let outer = Arc::new(LimitingMemoryResource::new(
            Arc::new(TrackingMemoryResource::default()),
            10,
        ));
        let inner = LimitingMemoryResource::new(outer.clone(), 100);

        let err = inner.reserve(20).unwrap_err();
        assert!(matches!(err, ArrowError::MemoryError(_)));
        // The failed upstream reservation must not leak into the inner usage
        assert_eq!(inner.allocated(), 0);
        assert_eq!(outer.allocated(), 0);
    }

    fn addr(resource: &Arc<dyn MemoryResource>) -> *const () {
        Arc::as_ptr(resource).cast()
    }

    #[test]
    fn test_set_default_resource() {
        let custom: Arc<dyn MemoryResource> = Arc::new(TrackingMemoryResource::default());
        let previous = set_default_resource(Arc::clone(&custom));
        assert_eq!(addr(&default_resource()), addr(&custom));

        let restored = set_default_resource(previous);
        assert_eq!(addr(&restored), addr(&custom));
    }
}
