/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

#![cfg_attr(feature = "fatal-warnings", deny(warnings))]

// Note: Keep this in sync with `README.md`.
//! # LLRB Map
//!
//! An ordered key-value map backed by a [left-leaning red-black tree][llrb].
//!
//! [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red%E2%80%93black_tree
//!
//! ## `OrderedMap`
//!
//! Keys are unique and kept in order.  Insertions keep the tree balanced, so after any sequence
//! of insertions the height of the tree is at most `2·log2(n + 1)`.  Removals splice nodes out
//! without rebalancing.
//!
//! ### Example
//!
//! ```rust
//! use llrb_map::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//!
//! map.add(20, "twenty");
//! map.add(10, "ten");
//! map.add(30, "thirty");
//!
//! assert_eq!(map.get(&10), Some(&"ten"));
//! assert!(map.set(&30, "THIRTY").is_ok());
//! assert_eq!(map[&30], "THIRTY");
//!
//! assert_eq!(map.remove(&20), Some("twenty"));
//! assert!(!map.contains(&20));
//! assert_eq!(map.size(), 2);
//! ```
//!
//! ## Logging
//!
//! Structural changes (rotations, color flips, removals) are logged at `trace` level through the
//! [`log`](https://docs.rs/log) facade.  No logger is installed by this crate.

pub mod error;
pub mod map;

pub use error::{InvariantViolation, MapError};
pub use map::ordered_map::{OrderedMap, Stats};
