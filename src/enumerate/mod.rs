//! Bijective enumeration of the geode search space
//!
//! Every geode over a word list is addressed by exactly one index in
//! `0..SpaceEnumerator::count()`. The mapping is pure arithmetic: nothing is
//! materialized, so any index can be unranked independently and in any order.
//! That is what lets the parallel search hand out contiguous index ranges to
//! workers that never talk to each other.
//!
//! ```text
//! index ──▶ subset size ──▶ combination ──▶ permutation ──▶ variant digits
//!           (segment)       (lexicographic)  (Lehmer code)    (base 90)
//! ```
//!
//! # Example
//!
//! ```rust
//! use amulets::enumerate::SpaceEnumerator;
//!
//! let space = SpaceEnumerator::new(&["ok", "go"]).unwrap();
//! assert_eq!(space.count(), 16380);
//!
//! let geode = space.unrank(271).unwrap();
//! assert_eq!(space.rank(&geode).unwrap(), 271);
//! ```

pub mod combinatorics;
pub mod space;
pub mod variant;

pub use space::{Geode, Segment, SpaceEnumerator};
pub use variant::{CaseTransform, Punctuation, Variant, VariantEnumerator, Word};
