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

//! Element and row comparators
//!
//! [`make_comparator`] builds a comparator for one column, applying a
//! [`ColumnOrder`]. [`LexicographicalComparator`] chains one comparator per
//! column of a [`TableView`] to compare whole rows.

use crate::order::ColumnOrder;
use crate::table::TableView;
use arrow_array::Array;
use arrow_schema::{ArrowError, DataType};
use std::cmp::Ordering;

pub use arrow_ord::ord::DynComparator;

/// Returns a comparator of element `i` of `left` with element `j` of `right`
///
/// The comparison follows `order`: nulls compare as the smallest values with
/// [`NullOrder::Before`](crate::order::NullOrder::Before), before the direction
/// is applied. Children of nested types are compared ascending with the same
/// null order, and the direction of `order` applies to the whole value.
/// Floats are compared using IEEE 754 totalOrder. Two [`DataType::Null`]
/// arrays compare all rows equal. Dictionaries must share a key type.
///
/// ```
/// # use std::cmp::Ordering;
/// # use arrow_array::Int32Array;
/// # use arrow_sorting::ord::make_comparator;
/// # use arrow_sorting::order::ColumnOrder;
/// let array = Int32Array::from(vec![Some(1), None, Some(3)]);
///
/// let cmp = make_comparator(&array, &array, ColumnOrder::new().desc()).unwrap();
/// assert_eq!(cmp(0, 2), Ordering::Greater);
/// // A null is the smallest value, so it sorts last when descending
/// assert_eq!(cmp(1, 0), Ordering::Greater);
/// ```
pub fn make_comparator(
    left: &dyn Array,
    right: &dyn Array,
    order: ColumnOrder,
) -> Result<DynComparator, ArrowError> {
    match (left.data_type(), right.data_type()) {
        (DataType::Null, DataType::Null) => Ok(Box::new(|_, _| Ordering::Equal)),
        (DataType::Dictionary(l, _), DataType::Dictionary(r, _)) if l != r => {
            Err(ArrowError::InvalidArgumentError(format!(
                "Can't compare dictionaries with key types {l} and {r}"
            )))
        }
        _ => arrow_ord::ord::make_comparator(left, right, order.sort_options()),
    }
}

/// Compares the rows of a [`TableView`] column by column
///
/// Columns are compared in priority order until one differs; rows equal in
/// every column compare [`Ordering::Equal`].
pub struct LexicographicalComparator {
    compare_items: Vec<DynComparator>,
}

impl std::fmt::Debug for LexicographicalComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexicographicalComparator")
            .field("columns", &self.compare_items.len())
            .finish()
    }
}

impl LexicographicalComparator {
    /// Create a comparator over the rows of `input`, applying `orders[i]` to
    /// column `i`
    pub fn try_new(
        input: &TableView<'_>,
        orders: &[ColumnOrder],
    ) -> Result<LexicographicalComparator, ArrowError> {
        if orders.len() != input.num_columns() {
            return Err(ArrowError::InvalidArgumentError(format!(
                "Expected {} column orders, got {}",
                input.num_columns(),
                orders.len()
            )));
        }
        let compare_items = input
            .columns()
            .iter()
            .zip(orders)
            .map(|(c, order)| make_comparator(c.as_ref(), c.as_ref(), *order))
            .collect::<Result<Vec<_>, ArrowError>>()?;
        Ok(LexicographicalComparator { compare_items })
    }

    /// Lexicographically compare row `a_idx` with row `b_idx`
    pub fn compare(&self, a_idx: usize, b_idx: usize) -> Ordering {
        for comparator in &self.compare_items {
            match comparator(a_idx, b_idx) {
                Ordering::Equal => continue,
                r => return r,
            }
        }
        Ordering::Equal
    }
}
