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

//! Defines [`TableView`], a borrowed list of equal length columns, and the
//! owned [`Table`] produced by [`gather`]

use crate::memory::{default_resource, MemoryReservation, MemoryResource};
use arrow_array::{Array, ArrayRef, RecordBatch};
use arrow_schema::ArrowError;
use arrow_select::take::{take, TakeOptions};

/// A read-only view of an ordered list of columns with the same length
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    columns: &'a [ArrayRef],
    num_rows: usize,
}

impl<'a> TableView<'a> {
    /// Create a view of `columns`, returning an error if their lengths differ
    ///
    /// A view of zero columns has zero rows.
    pub fn try_new(columns: &'a [ArrayRef]) -> Result<Self, ArrowError> {
        let num_rows = columns.first().map(|c| c.len()).unwrap_or_default();
        if let Some((i, c)) = columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != num_rows)
        {
            return Err(ArrowError::InvalidArgumentError(format!(
                "Table columns must have the same length, column 0 has {num_rows} rows but column {i} has {}",
                c.len()
            )));
        }
        Ok(Self { columns, num_rows })
    }

    /// Returns the columns of this view
    pub fn columns(&self) -> &'a [ArrayRef] {
        self.columns
    }

    /// Returns the column at `i`
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds
    pub fn column(&self, i: usize) -> &'a ArrayRef {
        &self.columns[i]
    }

    /// Returns the number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of rows
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns true if this view has no rows
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }
}

impl<'a> From<&'a RecordBatch> for TableView<'a> {
    fn from(batch: &'a RecordBatch) -> Self {
        Self {
            columns: batch.columns(),
            num_rows: batch.num_rows(),
        }
    }
}

/// An owned list of columns with the same length
///
/// Tables returned by the kernels of this crate hold a reservation on the
/// [`MemoryResource`] they were built with, released when the table is
/// dropped or converted with [`Table::into_columns`].
#[derive(Debug)]
pub struct Table {
    columns: Vec<ArrayRef>,
    num_rows: usize,
    reservation: Option<Box<dyn MemoryReservation>>,
}

impl Table {
    /// Create a table from `columns`, returning an error if their lengths differ
    pub fn try_new(columns: Vec<ArrayRef>) -> Result<Self, ArrowError> {
        let num_rows = TableView::try_new(&columns)?.num_rows();
        Ok(Self {
            columns,
            num_rows,
            reservation: None,
        })
    }

    /// Returns a [`TableView`] of this table
    pub fn view(&self) -> TableView<'_> {
        TableView {
            columns: &self.columns,
            num_rows: self.num_rows,
        }
    }

    /// Returns the columns of this table
    pub fn columns(&self) -> &[ArrayRef] {
        &self.columns
    }

    /// Returns the column at `i`
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds
    pub fn column(&self, i: usize) -> &ArrayRef {
        &self.columns[i]
    }

    /// Returns the number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of rows
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns the number of bytes reserved for this table, if any
    pub fn reserved(&self) -> usize {
        self.reservation.as_ref().map(|r| r.size()).unwrap_or_default()
    }

    /// Consumes this table, releasing its reservation
    pub fn into_columns(self) -> Vec<ArrayRef> {
        self.columns
    }
}

impl<'a> From<&'a Table> for TableView<'a> {
    fn from(table: &'a Table) -> Self {
        table.view()
    }
}

/// Gathers the rows of `input` at `indices` into a new [`Table`]
///
/// `indices` may be any integer array, such as the permutation returned by
/// [`sorted_order`](crate::sort::sorted_order). A null index produces a null
/// row, an out of bounds index an error. The buffers of the output are
/// reserved from `mr`, or the [default resource](crate::memory::default_resource)
/// if `None`. The reservation is taken once the columns are gathered, as their
/// size is only known then; if it is refused the gathered columns are dropped
/// and the error returned.
///
/// ```
/// # use std::sync::Arc;
/// # use arrow_array::{ArrayRef, Int32Array, StringArray};
/// # use arrow_array::cast::AsArray;
/// # use arrow_sorting::table::{gather, TableView};
/// let columns: Vec<ArrayRef> = vec![
///     Arc::new(Int32Array::from(vec![1, 2, 3])),
///     Arc::new(StringArray::from(vec!["a", "b", "c"])),
/// ];
/// let table = TableView::try_new(&columns).unwrap();
///
/// let gathered = gather(&table, &Int32Array::from(vec![2, 0]), None).unwrap();
/// assert_eq!(gathered.num_rows(), 2);
/// assert_eq!(gathered.column(1).as_string::<i32>().value(0), "c");
/// ```
pub fn gather(
    input: &TableView<'_>,
    indices: &dyn Array,
    mr: Option<&dyn MemoryResource>,
) -> Result<Table, ArrowError> {
    let options = TakeOptions { check_bounds: true };
    let columns = input
        .columns()
        .iter()
        .map(|c| take(c.as_ref(), indices, Some(options.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let size = columns.iter().map(|c| c.get_buffer_memory_size()).sum();
    let reservation = match mr {
        Some(mr) => mr.reserve(size)?,
        None => default_resource().reserve(size)?,
    };

    Ok(Table {
        columns,
        num_rows: indices.len(),
        reservation: Some(reservation),
    })
}
