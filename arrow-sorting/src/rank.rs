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

//! Provides `rank` function to assign a rank to each value in an array

use crate::column::check_row_count;
use crate::ord::{make_comparator, DynComparator};
use crate::order::ColumnOrder;
use arrow_array::{Array, ArrayRef, Float64Array, UInt32Array};
use arrow_schema::ArrowError;
use std::cmp::Ordering;
use std::sync::Arc;

/// How ranks are assigned to a group of equal values
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RankMethod {
    /// Each value gets its position, ties broken by their order in the input
    First,
    /// The mean of the positions in the group
    #[default]
    Average,
    /// The lowest position in the group
    Min,
    /// The highest position in the group
    Max,
    /// Like `Min`, but groups are numbered consecutively without gaps
    Dense,
}

/// Whether null values take part in the ranking
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NullPolicy {
    /// Nulls are ranked as a group of equal values, placed by the null order
    Include,
    /// Nulls get a null rank and are skipped when ranking the other values
    #[default]
    Exclude,
}

/// Options for [`rank`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankOptions {
    /// How ties are ranked
    pub method: RankMethod,
    /// The order values are ranked in
    pub order: ColumnOrder,
    /// Whether nulls are ranked
    pub null_policy: NullPolicy,
}

impl RankOptions {
    /// Average ranks of ascending values, nulls excluded
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the [`RankMethod`]
    pub fn with_method(mut self, method: RankMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the [`ColumnOrder`]
    pub fn with_order(mut self, order: ColumnOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the [`NullPolicy`]
    pub fn with_null_policy(mut self, null_policy: NullPolicy) -> Self {
        self.null_policy = null_policy;
        self
    }
}

/// Assigns a rank, starting at 1, to each value in `array` based on its
/// position in the sorted order
///
/// Returns a [`Float64Array`] for [`RankMethod::Average`] and a
/// [`UInt32Array`] otherwise. With [`NullPolicy::Exclude`] null values have a
/// null rank.
///
/// ```
/// # use arrow_array::StringArray;
/// # use arrow_array::cast::AsArray;
/// # use arrow_array::types::UInt32Type;
/// # use arrow_sorting::rank::{rank, NullPolicy, RankMethod, RankOptions};
/// let array = StringArray::from(vec![Some("foo"), None, Some("foo"), None, Some("bar")]);
/// let options = RankOptions::new()
///     .with_method(RankMethod::Max)
///     .with_null_policy(NullPolicy::Include);
/// let ranks = rank(&array, Some(options)).unwrap();
/// assert_eq!(ranks.as_primitive::<UInt32Type>().values(), &[5, 2, 5, 2, 3]);
/// ```
pub fn rank(array: &dyn Array, options: Option<RankOptions>) -> Result<ArrayRef, ArrowError> {
    let options = options.unwrap_or_default();
    check_row_count(array.len())?;

    let cmp = make_comparator(array, array, options.order)?;
    let mut order = (0..array.len()).collect::<Vec<usize>>();
    // A stable sort keeps equal values in input order for RankMethod::First
    order.sort_by(|a, b| cmp(*a, *b));

    let nulls = match options.null_policy {
        NullPolicy::Include => None,
        NullPolicy::Exclude => array.logical_nulls().filter(|n| n.null_count() > 0),
    };
    if let Some(n) = &nulls {
        order.retain(|i| n.is_valid(*i));
    }

    Ok(match options.method {
        RankMethod::Average => {
            let mut out = vec![0_f64; array.len()];
            rank_groups(&order, &cmp, |row, _, start, end, _| {
                out[row] = (start + 1 + end) as f64 / 2.0
            });
            Arc::new(Float64Array::new(out.into(), nulls))
        }
        method => {
            let mut out = vec![0_u32; array.len()];
            rank_groups(&order, &cmp, |row, pos, start, end, group| {
                out[row] = match method {
                    RankMethod::First => pos + 1,
                    RankMethod::Min => start + 1,
                    RankMethod::Max => end,
                    _ => group + 1,
                } as u32
            });
            Arc::new(UInt32Array::new(out.into(), nulls))
        }
    })
}

/// Calls `f(row, position, group_start, group_end, group_index)` for each row
/// of the sorted `order`, where rows comparing equal form a group
fn rank_groups<F>(order: &[usize], cmp: &DynComparator, mut f: F)
where
    F: FnMut(usize, usize, usize, usize, usize),
{
    let mut start = 0;
    let mut group = 0;
    while start < order.len() {
        let end = order[start + 1..]
            .iter()
            .position(|row| cmp(order[start], *row) != Ordering::Equal)
            .map(|offset| start + 1 + offset)
            .unwrap_or(order.len());

        for (pos, row) in order.iter().enumerate().take(end).skip(start) {
            f(*row, pos, start, end, group);
        }
        group += 1;
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::cast::AsArray;
    use arrow_array::types::{Float64Type, Int32Type, UInt32Type};
    use arrow_array::*;

    fn ranks(array: &dyn Array, options: RankOptions) -> Vec<Option<u32>> {
        let ranks = rank(array, Some(options)).unwrap();
        ranks.as_primitive::<UInt32Type>().iter().collect()
    }

    fn include(method: RankMethod) -> RankOptions {
        RankOptions::new()
            .with_method(method)
            .with_null_policy(NullPolicy::Include)
    }

    #[test]
    fn test_methods_include_nulls() {
        let a = Int32Array::from(vec![Some(1), Some(1), None, Some(3), Some(3), Some(4)]);

        let expected = [
            (RankMethod::First, [2, 3, 1, 4, 5, 6]),
            (RankMethod::Min, [2, 2, 1, 4, 4, 6]),
            (RankMethod::Max, [3, 3, 1, 5, 5, 6]),
            (RankMethod::Dense, [2, 2, 1, 3, 3, 4]),
        ];
        for (method, expected) in expected {
            let expected = expected.map(Some).to_vec();
            assert_eq!(ranks(&a, include(method)), expected, "{method:?}");
        }

        let res = rank(&a, Some(include(RankMethod::Average))).unwrap();
        assert_eq!(
            res.as_primitive::<Float64Type>().values(),
            &[2.5, 2.5, 1.0, 4.5, 4.5, 6.0]
        );
    }

    #[test]
    fn test_orders() {
        let a = Int32Array::from(vec![Some(1), Some(1), None, Some(3), Some(3), Some(4)]);

        let options = include(RankMethod::Max).with_order(ColumnOrder::new().desc());
        let expected = [5, 5, 6, 3, 3, 1].map(Some).to_vec();
        assert_eq!(ranks(&a, options), expected);

        let options = include(RankMethod::Max).with_order(ColumnOrder::new().nulls_after());
        let expected = [2, 2, 6, 4, 4, 5].map(Some).to_vec();
        assert_eq!(ranks(&a, options), expected);

        let options = include(RankMethod::Max).with_order(ColumnOrder::new().desc().nulls_after());
        let expected = [6, 6, 1, 4, 4, 2].map(Some).to_vec();
        assert_eq!(ranks(&a, options), expected);
    }

    #[test]
    fn test_exclude_nulls() {
        let a = Int32Array::from(vec![Some(1), Some(1), None, Some(3), Some(3), Some(4)]);

        let options = RankOptions::new().with_method(RankMethod::Min);
        assert_eq!(
            ranks(&a, options),
            vec![Some(1), Some(1), None, Some(3), Some(3), Some(5)]
        );

        let options = RankOptions::new().with_method(RankMethod::Dense);
        assert_eq!(
            ranks(&a, options),
            vec![Some(1), Some(1), None, Some(2), Some(2), Some(3)]
        );

        // Excluded nulls stay null whatever their order
        let options = options.with_order(ColumnOrder::new().desc().nulls_after());
        assert_eq!(
            ranks(&a, options),
            vec![Some(3), Some(3), None, Some(2), Some(2), Some(1)]
        );

        let res = rank(&a, None).unwrap();
        let res = res.as_primitive::<Float64Type>();
        assert_eq!(res.null_count(), 1);
        assert!(res.is_null(2));
        assert_eq!(res.value(0), 1.5);
        assert_eq!(res.value(3), 3.5);
        assert_eq!(res.value(5), 5.0);
    }

    #[test]
    fn test_bytes() {
        let v = vec!["foo", "fo", "bar", "bar"];
        let values = StringArray::from(v.clone());
        let expected = [4, 3, 2, 2].map(Some).to_vec();
        assert_eq!(ranks(&values, include(RankMethod::Max)), expected);

        let values = LargeStringArray::from(v);
        let expected = [3, 2, 1, 1].map(Some).to_vec();
        assert_eq!(ranks(&values, include(RankMethod::Dense)), expected);

        let v: Vec<&[u8]> = vec![&[1, 2], &[0], &[1, 2, 3], &[1, 2]];
        let values = BinaryArray::from(v);
        let expected = [2, 1, 4, 3].map(Some).to_vec();
        assert_eq!(ranks(&values, include(RankMethod::First)), expected);
    }

    #[test]
    fn test_empty() {
        let a = Int32Array::from(Vec::<i32>::new());
        let res = rank(&a, Some(include(RankMethod::First))).unwrap();
        assert!(res.is_empty());
    }

    #[test]
    fn test_unsupported() {
        let a = vec!["a", "b"].into_iter().collect::<RunArray<Int32Type>>();
        assert!(rank(&a, None).is_err());
    }
}
