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

//! Lexicographical sorting of Arrow tables
//!
//! A table is an ordered list of equal length columns, borrowed as a
//! [`TableView`](table::TableView). Each column is sorted by a
//! [`Order`](order::Order) and a [`NullOrder`](order::NullOrder), given as
//! lists with either one entry per column or none at all, in which case every
//! column is ascending with nulls before other values.
//!
//! # Sort RecordBatch
//!
//! ```
//! # use std::sync::Arc;
//! # use arrow_array::*;
//! # use arrow_array::cast::AsArray;
//! # use arrow_array::types::Int32Type;
//! # use arrow_sorting::order::{NullOrder, Order};
//! # use arrow_sorting::sort::{is_sorted, sorted_order};
//! # use arrow_sorting::table::{gather, TableView};
//! #
//! let a: ArrayRef = Arc::new(Int32Array::from(vec![1, 2, 3, 4]));
//! let b: ArrayRef = Arc::new(StringArray::from(vec!["b", "a", "e", "a"]));
//! let batch = RecordBatch::try_from_iter(vec![("a", a), ("b", b)]).unwrap();
//! let table = TableView::from(&batch);
//!
//! // Sort by column 1, then by column 0 descending
//! let key_columns = vec![batch.column(1).clone(), batch.column(0).clone()];
//! let keys = TableView::try_new(&key_columns).unwrap();
//! let indices = sorted_order(&keys, &[Order::Ascending, Order::Descending], &[], None).unwrap();
//!
//! // Apply indices to the table
//! let sorted = gather(&table, &*indices, None).unwrap();
//! let col0 = sorted.column(0).as_primitive::<Int32Type>();
//! assert_eq!(col0.values(), &[4, 2, 1, 3]);
//!
//! let sorted_keys = gather(&keys, &*indices, None).unwrap();
//! let orders = [Order::Ascending, Order::Descending];
//! assert!(is_sorted(&sorted_keys.view(), &orders, &[NullOrder::Before; 2]).unwrap());
//! ```
//!
//! # Memory
//!
//! Kernels returning owned data reserve its bytes on a
//! [`MemoryResource`](memory::MemoryResource), see the [`memory`] module.

#![warn(missing_docs)]
pub mod column;
pub mod memory;
pub mod ord;
pub mod order;
pub mod rank;
pub mod sort;
pub mod table;
