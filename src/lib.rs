//! # divquery
//!
//! Data structures that store monomials and answer divisor queries: does any
//! stored monomial divide `q`, which ones do, and remove every stored multiple
//! of `q`. These are the inner loop of Gröbner basis and related algorithms.
//!
//! - [`KDTree`]: a KD-tree over exponent vectors with div masks on entries
//!   and, optionally, aggregated on nodes.
//! - [`DivList`]: a flat list, the baseline.
//!
//! Both implement [`DivFinder`].
//!
//! ## Example
//!
//! ```rust
//! use divquery::{BasicConfig, DivFinder, KDTree, KDTreeOptions};
//!
//! // Three variables, div masks on entries and tree nodes.
//! let conf: BasicConfig<u32, true, true> = BasicConfig::new(3);
//! let mut tree = KDTree::new(conf, KDTreeOptions::default());
//!
//! tree.insert(vec![2, 0, 1]);
//! tree.insert(vec![0, 3, 0]);
//! assert_eq!(tree.find_divisor(&[2, 1, 1]), Some(&vec![2, 0, 1]));
//! assert_eq!(tree.find_divisor(&[1, 1, 1]), None);
//!
//! // Keep only minimal monomials.
//! assert!(tree.insert_reduce(vec![0, 1, 0]));
//! assert_eq!(tree.len(), 2);
//! ```

mod arena;
mod config;
mod div_list;
mod error;
mod finder;
mod kdtree;
mod leaf;
mod mask;
mod node;
mod walker;

pub use config::{
    BasicConfig, DivListOptions, DivisorConfig, Exponent, KDTreeOptions, RebuildPolicy,
};
pub use div_list::DivList;
pub use error::ConfigError;
pub use finder::{DivFinder, EntryOf, MonomialOf};
pub use kdtree::{Iter, KDTree};
pub use mask::{DivMask, DivMaskCalculator};

#[cfg(test)]
mod proptests;
