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

//! Defines the lexicographical sort kernels for a [`TableView`]

use crate::column::{check_row_count, IndexColumn};
use crate::memory::{default_resource, MemoryResource};
use crate::ord::LexicographicalComparator;
use crate::order::{resolve_column_orders, ColumnOrder, NullOrder, Order};
use crate::table::{gather, Table, TableView};
use arrow_array::Array;
use arrow_ord::sort::sort_to_indices;
use arrow_schema::{ArrowError, DataType};
use log::{debug, trace};
use std::cmp::Ordering;

/// Computes the row indices that would place the rows of `input` in
/// lexicographical order
///
/// `column_order` and `null_precedence` give the rule for each column. Each
/// must be empty or contain exactly one entry per column; an empty
/// `column_order` sorts every column ascending and an empty `null_precedence`
/// treats nulls as smaller than all values ([`NullOrder::Before`]). Floats are
/// sorted using IEEE 754 totalOrder.
///
/// The returned column is reserved from `mr`, or from the
/// [default resource](crate::memory::default_resource) if `None`.
///
/// Note: this is an unstable sort, rows with equal keys may appear in any
/// order. See [`stable_sorted_order`].
///
/// ```
/// # use std::sync::Arc;
/// # use arrow_array::{ArrayRef, Int32Array, StringArray};
/// # use arrow_sorting::order::{NullOrder, Order};
/// # use arrow_sorting::sort::sorted_order;
/// # use arrow_sorting::table::TableView;
/// let columns: Vec<ArrayRef> = vec![
///     Arc::new(Int32Array::from(vec![Some(1), None, Some(1), Some(0)])),
///     Arc::new(StringArray::from(vec!["b", "c", "a", "d"])),
/// ];
/// let table = TableView::try_new(&columns).unwrap();
///
/// let order = sorted_order(&table, &[], &[], None).unwrap();
/// assert_eq!(order.values(), &[1, 3, 2, 0]);
///
/// let order = sorted_order(
///     &table,
///     &[Order::Descending, Order::Ascending],
///     &[NullOrder::Before, NullOrder::Before],
///     None,
/// )
/// .unwrap();
/// assert_eq!(order.values(), &[2, 0, 3, 1]);
/// ```
pub fn sorted_order(
    input: &TableView<'_>,
    column_order: &[Order],
    null_precedence: &[NullOrder],
    mr: Option<&dyn MemoryResource>,
) -> Result<IndexColumn, ArrowError> {
    sorted_order_impl(input, column_order, null_precedence, false, mr)
}

/// Computes the row indices that would place the rows of `input` in
/// lexicographical order, keeping rows with equal keys in their original order
///
/// See [`sorted_order`] for the meaning of the arguments.
pub fn stable_sorted_order(
    input: &TableView<'_>,
    column_order: &[Order],
    null_precedence: &[NullOrder],
    mr: Option<&dyn MemoryResource>,
) -> Result<IndexColumn, ArrowError> {
    sorted_order_impl(input, column_order, null_precedence, true, mr)
}

/// Checks whether the rows of `input` are in lexicographical order
///
/// `column_order` and `null_precedence` follow the same rules as for
/// [`sorted_order`]. Rows with equal keys are considered sorted, as are tables
/// with fewer than two rows.
///
/// ```
/// # use std::sync::Arc;
/// # use arrow_array::{ArrayRef, Int32Array};
/// # use arrow_sorting::order::{NullOrder, Order};
/// # use arrow_sorting::sort::is_sorted;
/// # use arrow_sorting::table::TableView;
/// let columns: Vec<ArrayRef> = vec![Arc::new(Int32Array::from(vec![Some(3), Some(1), None]))];
/// let table = TableView::try_new(&columns).unwrap();
///
/// assert!(!is_sorted(&table, &[], &[]).unwrap());
/// assert!(is_sorted(&table, &[Order::Descending], &[NullOrder::Before]).unwrap());
/// ```
pub fn is_sorted(
    input: &TableView<'_>,
    column_order: &[Order],
    null_precedence: &[NullOrder],
) -> Result<bool, ArrowError> {
    let orders = resolve_column_orders(input.num_columns(), column_order, null_precedence)?;
    let comparator = LexicographicalComparator::try_new(input, &orders)?;
    Ok((1..input.num_rows()).all(|i| comparator.compare(i - 1, i) != Ordering::Greater))
}

/// Returns `input` with its rows reordered by [`sorted_order`]
///
/// Both the temporary order and the output table are reserved from `mr`.
///
/// ```
/// # use std::sync::Arc;
/// # use arrow_array::{ArrayRef, Int32Array, StringArray};
/// # use arrow_array::cast::AsArray;
/// # use arrow_array::types::Int32Type;
/// # use arrow_sorting::order::Order;
/// # use arrow_sorting::sort::sort;
/// # use arrow_sorting::table::TableView;
/// let columns: Vec<ArrayRef> = vec![
///     Arc::new(Int32Array::from(vec![2, 3, 1])),
///     Arc::new(StringArray::from(vec!["b", "c", "a"])),
/// ];
/// let table = TableView::try_new(&columns).unwrap();
///
/// let sorted = sort(&table, &[Order::Descending, Order::Ascending], &[], None).unwrap();
/// assert_eq!(sorted.column(0).as_primitive::<Int32Type>().values(), &[3, 2, 1]);
/// ```
pub fn sort(
    input: &TableView<'_>,
    column_order: &[Order],
    null_precedence: &[NullOrder],
    mr: Option<&dyn MemoryResource>,
) -> Result<Table, ArrowError> {
    sort_by_key_impl(input, input, column_order, null_precedence, false, mr)
}

/// Returns `input` with its rows reordered by [`stable_sorted_order`]
pub fn stable_sort(
    input: &TableView<'_>,
    column_order: &[Order],
    null_precedence: &[NullOrder],
    mr: Option<&dyn MemoryResource>,
) -> Result<Table, ArrowError> {
    sort_by_key_impl(input, input, column_order, null_precedence, true, mr)
}

/// Returns `values` with its rows reordered by the [`sorted_order`] of `keys`
///
/// `values` and `keys` must have the same number of rows. `column_order` and
/// `null_precedence` apply to the columns of `keys`.
pub fn sort_by_key(
    values: &TableView<'_>,
    keys: &TableView<'_>,
    column_order: &[Order],
    null_precedence: &[NullOrder],
    mr: Option<&dyn MemoryResource>,
) -> Result<Table, ArrowError> {
    sort_by_key_impl(values, keys, column_order, null_precedence, false, mr)
}

/// Returns `values` with its rows reordered by the [`stable_sorted_order`] of `keys`
pub fn stable_sort_by_key(
    values: &TableView<'_>,
    keys: &TableView<'_>,
    column_order: &[Order],
    null_precedence: &[NullOrder],
    mr: Option<&dyn MemoryResource>,
) -> Result<Table, ArrowError> {
    sort_by_key_impl(values, keys, column_order, null_precedence, true, mr)
}

fn sort_by_key_impl(
    values: &TableView<'_>,
    keys: &TableView<'_>,
    column_order: &[Order],
    null_precedence: &[NullOrder],
    stable: bool,
    mr: Option<&dyn MemoryResource>,
) -> Result<Table, ArrowError> {
    if values.num_rows() != keys.num_rows() {
        return Err(ArrowError::InvalidArgumentError(format!(
            "Mismatch in number of rows for values ({}) and keys ({})",
            values.num_rows(),
            keys.num_rows()
        )));
    }
    let indices = sorted_order_impl(keys, column_order, null_precedence, stable, mr)?;
    gather(values, &*indices, mr)
}

fn sorted_order_impl(
    input: &TableView<'_>,
    column_order: &[Order],
    null_precedence: &[NullOrder],
    stable: bool,
    mr: Option<&dyn MemoryResource>,
) -> Result<IndexColumn, ArrowError> {
    let orders = resolve_column_orders(input.num_columns(), column_order, null_precedence)?;
    let num_rows = check_row_count(input.num_rows())?;

    let size = input.num_rows() * std::mem::size_of::<i32>();
    let reservation = match mr {
        Some(mr) => mr.reserve(size)?,
        None => default_resource().reserve(size)?,
    };

    debug!(
        "Computing {} sort order of {num_rows} rows by {} columns",
        if stable { "stable" } else { "unstable" },
        orders.len()
    );

    let indices = match (input.columns(), orders.as_slice()) {
        ([], _) => (0..num_rows).collect(),
        ([column], [order]) if !stable => match sort_single(column.as_ref(), *order)? {
            Some(indices) => indices,
            None => sort_lexicographical(input, &orders, num_rows, stable)?,
        },
        _ => sort_lexicographical(input, &orders, num_rows, stable)?,
    };
    Ok(IndexColumn::new(indices, reservation))
}

/// Sorts a single column with [`sort_to_indices`], if its type allows
fn sort_single(values: &dyn Array, order: ColumnOrder) -> Result<Option<Vec<i32>>, ArrowError> {
    let flat = values.data_type().is_primitive()
        || matches!(
            values.data_type(),
            DataType::Boolean
                | DataType::Utf8
                | DataType::LargeUtf8
                | DataType::Utf8View
                | DataType::Binary
                | DataType::LargeBinary
                | DataType::BinaryView
                | DataType::FixedSizeBinary(_)
        );
    if !flat {
        return Ok(None);
    }
    trace!("Sorting single {} column", values.data_type());
    let indices = sort_to_indices(values, Some(order.sort_options()), None)?;
    // Row counts were checked to fit in i32
    Ok(Some(indices.values().iter().map(|i| *i as i32).collect()))
}

fn sort_lexicographical(
    input: &TableView<'_>,
    orders: &[ColumnOrder],
    num_rows: i32,
    stable: bool,
) -> Result<Vec<i32>, ArrowError> {
    let comparator = LexicographicalComparator::try_new(input, orders)?;
    let mut indices = (0..num_rows).collect::<Vec<i32>>();
    let cmp = |a: &i32, b: &i32| comparator.compare(*a as usize, *b as usize);
    match stable {
        true => indices.sort_by(cmp),
        false => indices.sort_unstable_by(cmp),
    }
    Ok(indices)
}
