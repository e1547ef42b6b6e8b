/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

pub type Result<T> = std::result::Result<T, MapError>;

/// Errors returned by [`OrderedMap`](crate::OrderedMap) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("key not found")]
    KeyNotFound,
}

/// A broken tree invariant, as reported by
/// [`OrderedMap::validate()`](crate::OrderedMap::validate).
///
/// Removal does not rebalance, so after a removal the color related variants can legitimately
/// show up.  `BinarySearch` and `SizeConsistency` never should.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("keys are not in strictly ascending order")]
    BinarySearch,

    #[error("red node linked as a right child")]
    RedRightLink,

    #[error("two consecutive red nodes on a path")]
    ConsecutiveReds,

    #[error("unbalanced black height: left {left}, right {right}")]
    BlackHeight { left: usize, right: usize },

    #[error("root is red")]
    RedRoot,

    #[error("size is {size} but {reachable} nodes are reachable")]
    SizeConsistency { size: usize, reachable: usize },
}
