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

//! Defines [`IndexColumn`], the owned row index column returned by
//! [`sorted_order`](crate::sort::sorted_order)

use crate::memory::MemoryReservation;
use arrow_array::{Array, ArrayRef, Int32Array};
use arrow_schema::ArrowError;
use std::ops::Deref;
use std::sync::Arc;

/// A non-nullable column of `Int32` row indices
///
/// Dereferences to the underlying [`Int32Array`]. The bytes of the column stay
/// reserved on the [`MemoryResource`](crate::memory::MemoryResource) it was
/// allocated from until the column is dropped or detached with
/// [`IndexColumn::into_array`].
#[derive(Debug)]
pub struct IndexColumn {
    indices: Int32Array,
    reservation: Box<dyn MemoryReservation>,
}

impl IndexColumn {
    pub(crate) fn new(indices: Vec<i32>, reservation: Box<dyn MemoryReservation>) -> Self {
        Self {
            indices: Int32Array::from(indices),
            reservation,
        }
    }

    /// Returns the number of bytes reserved for this column
    pub fn reserved(&self) -> usize {
        self.reservation.size()
    }

    /// Returns a copy of this column as an [`ArrayRef`]
    ///
    /// The reservation stays with this `IndexColumn`, so the returned array is
    /// not accounted for once this column is dropped.
    pub fn as_array_ref(&self) -> ArrayRef {
        Arc::new(self.indices.clone())
    }

    /// Consumes this column, releasing its reservation
    pub fn into_array(self) -> Int32Array {
        self.indices
    }
}

impl Deref for IndexColumn {
    type Target = Int32Array;

    fn deref(&self) -> &Self::Target {
        &self.indices
    }
}

impl AsRef<dyn Array> for IndexColumn {
    fn as_ref(&self) -> &(dyn Array + 'static) {
        &self.indices
    }
}

/// Converts a row count into the `i32` index space of an [`IndexColumn`]
pub(crate) fn check_row_count(num_rows: usize) -> Result<i32, ArrowError> {
    i32::try_from(num_rows).map_err(|_| {
        ArrowError::InvalidArgumentError(format!(
            "Cannot index {num_rows} rows with Int32, the maximum is {}",
            i32::MAX
        ))
    })
}
