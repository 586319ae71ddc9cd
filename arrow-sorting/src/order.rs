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

//! Per-column ordering rules

use arrow_schema::{ArrowError, SortOptions};
use std::fmt::{Display, Formatter};

/// The direction in which the values of a column are sorted
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Order {
    /// Smallest value first
    #[default]
    Ascending,
    /// Largest value first
    Descending,
}

/// How null values compare against the non-null values of a column
///
/// The placement is relative to the column's [`Order`]: [`NullOrder::Before`]
/// treats nulls as smaller than every value, so they come first in an
/// ascending sort and last in a descending one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NullOrder {
    /// Nulls are greater than all other values
    After,
    /// Nulls are less than all other values
    #[default]
    Before,
}

/// The ordering rule applied to a single column
///
/// ```
/// # use arrow_sorting::order::{ColumnOrder, NullOrder, Order};
/// let order = ColumnOrder::new().desc().nulls_after();
/// assert_eq!(order.order, Order::Descending);
/// assert_eq!(order.null_order, NullOrder::After);
///
/// // nulls are greater than all values, so a descending sort places them first
/// assert!(order.sort_options().nulls_first);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnOrder {
    /// Sort direction
    pub order: Order,
    /// Null placement
    pub null_order: NullOrder,
}

impl ColumnOrder {
    /// Ascending with nulls before values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort in ascending order
    pub fn asc(mut self) -> Self {
        self.order = Order::Ascending;
        self
    }

    /// Sort in descending order
    pub fn desc(mut self) -> Self {
        self.order = Order::Descending;
        self
    }

    /// Treat nulls as smaller than every value
    pub fn nulls_before(mut self) -> Self {
        self.null_order = NullOrder::Before;
        self
    }

    /// Treat nulls as greater than every value
    pub fn nulls_after(mut self) -> Self {
        self.null_order = NullOrder::After;
        self
    }

    /// Returns true if this column sorts in descending order
    pub fn is_descending(&self) -> bool {
        self.order == Order::Descending
    }

    /// Returns true if nulls end up at the start of the sorted column
    pub fn nulls_first(&self) -> bool {
        (self.null_order == NullOrder::Before) != self.is_descending()
    }

    /// The equivalent [`SortOptions`], whose `nulls_first` is absolute
    pub fn sort_options(&self) -> SortOptions {
        SortOptions {
            descending: self.is_descending(),
            nulls_first: self.nulls_first(),
        }
    }
}

impl From<SortOptions> for ColumnOrder {
    fn from(value: SortOptions) -> Self {
        let order = match value.descending {
            true => Order::Descending,
            false => Order::Ascending,
        };
        let null_order = match value.nulls_first != value.descending {
            true => NullOrder::Before,
            false => NullOrder::After,
        };
        Self { order, null_order }
    }
}

impl Display for ColumnOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let order = match self.order {
            Order::Ascending => "ASC",
            Order::Descending => "DESC",
        };
        let nulls = match self.null_order {
            NullOrder::Before => "NULLS BEFORE",
            NullOrder::After => "NULLS AFTER",
        };
        write!(f, "{order} {nulls}")
    }
}

/// Combines the optional per-column lists into one [`ColumnOrder`] per column
///
/// Each list must either be empty, in which case its default applies to every
/// column, or contain exactly `num_columns` entries.
pub fn resolve_column_orders(
    num_columns: usize,
    column_order: &[Order],
    null_precedence: &[NullOrder],
) -> Result<Vec<ColumnOrder>, ArrowError> {
    check_len("column_order", column_order.len(), num_columns)?;
    check_len("null_precedence", null_precedence.len(), num_columns)?;

    Ok((0..num_columns)
        .map(|i| ColumnOrder {
            order: column_order.get(i).copied().unwrap_or_default(),
            null_order: null_precedence.get(i).copied().unwrap_or_default(),
        })
        .collect())
}

fn check_len(name: &str, len: usize, num_columns: usize) -> Result<(), ArrowError> {
    if len != 0 && len != num_columns {
        return Err(ArrowError::InvalidArgumentError(format!(
            "Size of {name} ({len}) must be empty or equal to the number of columns ({num_columns})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let resolved = resolve_column_orders(3, &[], &[]).unwrap();
        assert_eq!(resolved, vec![ColumnOrder::default(); 3]);
        assert!(resolved.iter().all(|c| c.order == Order::Ascending));
        assert!(resolved.iter().all(|c| c.null_order == NullOrder::Before));
    }

    #[test]
    fn test_resolve_mixed() {
        let resolved =
            resolve_column_orders(2, &[Order::Descending, Order::Ascending], &[]).unwrap();
        assert_eq!(resolved[0], ColumnOrder::new().desc());
        assert_eq!(resolved[1], ColumnOrder::new());

        let resolved = resolve_column_orders(2, &[], &[NullOrder::After, NullOrder::Before]).unwrap();
        assert_eq!(resolved[0], ColumnOrder::new().nulls_after());
        assert_eq!(resolved[1], ColumnOrder::new());
    }

    #[test]
    fn test_resolve_size_mismatch() {
        let err = resolve_column_orders(2, &[Order::Descending], &[]).unwrap_err();
        assert!(matches!(err, ArrowError::InvalidArgumentError(_)));
        assert!(err.to_string().contains("column_order (1)"), "{err}");

        let err =
            resolve_column_orders(1, &[], &[NullOrder::After, NullOrder::After]).unwrap_err();
        assert!(err.to_string().contains("null_precedence (2)"), "{err}");
    }

    #[test]
    fn test_zero_columns() {
        assert!(resolve_column_orders(0, &[], &[]).unwrap().is_empty());
        assert!(resolve_column_orders(0, &[Order::Ascending], &[]).is_err());
    }

    #[test]
    fn test_nulls_first() {
        assert!(ColumnOrder::new().nulls_first());
        assert!(!ColumnOrder::new().nulls_after().nulls_first());
        assert!(!ColumnOrder::new().desc().nulls_first());
        assert!(ColumnOrder::new().desc().nulls_after().nulls_first());
    }

    #[test]
    fn test_sort_options_round_trip() {
        for order in [Order::Ascending, Order::Descending] {
            for null_order in [NullOrder::Before, NullOrder::After] {
                let c = ColumnOrder { order, null_order };
                assert_eq!(ColumnOrder::from(c.sort_options()), c);
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnOrder::new().to_string(), "ASC NULLS BEFORE");
        assert_eq!(
            ColumnOrder::new().desc().nulls_after().to_string(),
            "DESC NULLS AFTER"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        let order = ColumnOrder::new().desc();
        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(json, r#"{"order":"Descending","null_order":"Before"}"#);
        let back: ColumnOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }
}
