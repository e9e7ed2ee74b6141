//! Configuration: how monomials are represented, and how a structure behaves.
//!
//! A structure is parameterized on a [`DivisorConfig`], which tells it how to
//! read exponents out of monomials and entries, and which mask features are
//! compiled in. Behaviour that may change per instance (leaf size, sorting,
//! caching, rebuild policy) lives in plain option structs.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use crate::error::ConfigError;

// =============================================================================
// Exponents
// =============================================================================

/// An exponent of a variable in a monomial.
///
/// Besides a total order, the structures need a little arithmetic to place
/// cuts and mask thresholds. All of it is computed without overflow.
pub trait Exponent: Copy + Ord + fmt::Debug {
    /// `lo + (hi - lo) / 2`. Requires `lo <= hi`.
    fn cut_midpoint(lo: Self, hi: Self) -> Self;

    /// The `index`-th of `count` evenly spaced thresholds starting at `min`.
    ///
    /// The spacing is `(max - min) / count`, but at least one. Saturates at
    /// the largest value of the type.
    fn spaced(min: Self, max: Self, index: usize, count: usize) -> Self;

    /// `0` for `index == 0`, otherwise `2^(index - 1)`, saturating.
    fn doubling(index: usize) -> Self;
}

macro_rules! impl_exponent {
    ($($t:ty),* $(,)?) => {$(
        impl Exponent for $t {
            #[inline]
            fn cut_midpoint(lo: Self, hi: Self) -> Self {
                debug_assert!(lo <= hi);
                (lo as i128 + (hi as i128 - lo as i128) / 2) as $t
            }

            fn spaced(min: Self, max: Self, index: usize, count: usize) -> Self {
                debug_assert!(min <= max);
                debug_assert!(count > 0);
                let step = ((max as i128 - min as i128) / count as i128).max(1);
                let at = (min as i128).saturating_add(step.saturating_mul(index as i128));
                <$t>::try_from(at).unwrap_or(<$t>::MAX)
            }

            fn doubling(index: usize) -> Self {
                if index == 0 {
                    return 0;
                }
                u32::try_from(index - 1)
                    .ok()
                    .and_then(|shift| 1i128.checked_shl(shift))
                    .filter(|v| *v > 0)
                    .and_then(|v| <$t>::try_from(v).ok())
                    .unwrap_or(<$t>::MAX)
            }
        }
    )*};
}

impl_exponent!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

// =============================================================================
// Monomial representation
// =============================================================================

/// Teaches a structure how to work with a monomial representation.
///
/// Variables are indexed `0..var_count()`. The mask consts are read at
/// compile time, so a configuration without masks pays nothing for them.
pub trait DivisorConfig {
    type Exponent: Exponent;

    /// A query monomial. May be unsized, e.g. `[u32]`.
    type Monomial: ?Sized;

    /// What is stored. The monomial of an entry is recovered with
    /// [`DivisorConfig::monomial`], the rest is client data.
    type Entry;

    /// Compute a [`DivMask`](crate::DivMask) per entry and use it to reject
    /// non-divisors before the exact check.
    const USE_DIV_MASK: bool = true;

    /// Also keep AND-aggregated masks on leaves and interior nodes and prune
    /// whole subtrees with them. Requires `USE_DIV_MASK`.
    const USE_TREE_DIV_MASK: bool = false;

    fn var_count(&self) -> usize;

    fn exponent(&self, monomial: &Self::Monomial, var: usize) -> Self::Exponent;

    fn monomial<'a>(&self, entry: &'a Self::Entry) -> &'a Self::Monomial;

    /// Whether `a` divides `b`.
    fn divides(&self, a: &Self::Monomial, b: &Self::Monomial) -> bool {
        (0..self.var_count()).all(|var| self.exponent(a, var) <= self.exponent(b, var))
    }

    /// Total order used to keep leaves sorted. Must be compatible with
    /// divisibility: if `a` divides `b` then `a <= b`. The default is
    /// lexicographic.
    fn compare(&self, a: &Self::Monomial, b: &Self::Monomial) -> Ordering {
        for var in 0..self.var_count() {
            match self.exponent(a, var).cmp(&self.exponent(b, var)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

/// Monomials as exponent slices, entries as `Vec`s.
///
/// ```rust
/// use divquery::{BasicConfig, DivisorConfig};
///
/// let conf: BasicConfig<u32> = BasicConfig::new(3);
/// assert!(conf.divides(&[1, 0, 2], &[1, 4, 2]));
/// assert!(!conf.divides(&[1, 5, 2], &[1, 4, 2]));
/// ```
pub struct BasicConfig<X, const MASK: bool = true, const TREE_MASK: bool = false> {
    var_count: usize,
    _marker: PhantomData<fn() -> X>,
}

impl<X, const MASK: bool, const TREE_MASK: bool> BasicConfig<X, MASK, TREE_MASK> {
    pub fn new(var_count: usize) -> Self {
        Self {
            var_count,
            _marker: PhantomData,
        }
    }
}

impl<X, const MASK: bool, const TREE_MASK: bool> Clone for BasicConfig<X, MASK, TREE_MASK> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<X, const MASK: bool, const TREE_MASK: bool> Copy for BasicConfig<X, MASK, TREE_MASK> {}

impl<X, const MASK: bool, const TREE_MASK: bool> fmt::Debug for BasicConfig<X, MASK, TREE_MASK> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicConfig")
            .field("var_count", &self.var_count)
            .field("mask", &MASK)
            .field("tree_mask", &TREE_MASK)
            .finish()
    }
}

impl<X: Exponent, const MASK: bool, const TREE_MASK: bool> DivisorConfig
    for BasicConfig<X, MASK, TREE_MASK>
{
    type Exponent = X;
    type Monomial = [X];
    type Entry = Vec<X>;

    const USE_DIV_MASK: bool = MASK;
    const USE_TREE_DIV_MASK: bool = TREE_MASK;

    #[inline]
    fn var_count(&self) -> usize {
        self.var_count
    }

    #[inline]
    fn exponent(&self, monomial: &[X], var: usize) -> X {
        debug_assert!(var < monomial.len());
        monomial[var]
    }

    #[inline]
    fn monomial<'a>(&self, entry: &'a Vec<X>) -> &'a [X] {
        entry
    }

    #[inline]
    fn divides(&self, a: &[X], b: &[X]) -> bool {
        debug_assert_eq!(a.len(), self.var_count);
        debug_assert_eq!(b.len(), self.var_count);
        a.iter().zip(b).all(|(x, y)| x <= y)
    }

    #[inline]
    fn compare(&self, a: &[X], b: &[X]) -> Ordering {
        a.cmp(b)
    }
}

// =============================================================================
// Options
// =============================================================================

/// Rebuild the structure after `max(len * ratio, min)` entries have been
/// inserted or removed since the last rebuild.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebuildPolicy {
    pub ratio: f64,
    pub min: usize,
}

impl RebuildPolicy {
    /// Number of changes allowed before the next rebuild of a structure
    /// holding `len` entries.
    pub fn budget(&self, len: usize) -> usize {
        ((len as f64 * self.ratio) as usize).max(self.min)
    }
}

impl Default for RebuildPolicy {
    fn default() -> Self {
        Self {
            ratio: 0.5,
            min: 50,
        }
    }
}

/// Per-instance options of a [`KDTree`](crate::KDTree).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KDTreeOptions {
    /// Nominal capacity of a leaf. At least 2.
    pub leaf_size: usize,
    /// Keep leaves sorted by [`DivisorConfig::compare`].
    pub sort_on_insert: bool,
    /// Remember the last divisor found and try it first on the next query.
    pub use_divisor_cache: bool,
    /// Automatic rebuild schedule. `None` disables automatic rebuilds.
    pub rebuild: Option<RebuildPolicy>,
}

impl Default for KDTreeOptions {
    fn default() -> Self {
        Self {
            leaf_size: 10,
            sort_on_insert: false,
            use_divisor_cache: true,
            rebuild: Some(RebuildPolicy::default()),
        }
    }
}

impl KDTreeOptions {
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    pub fn with_sort_on_insert(mut self, sort_on_insert: bool) -> Self {
        self.sort_on_insert = sort_on_insert;
        self
    }

    pub fn with_divisor_cache(mut self, use_divisor_cache: bool) -> Self {
        self.use_divisor_cache = use_divisor_cache;
        self
    }

    pub fn with_rebuild(mut self, rebuild: Option<RebuildPolicy>) -> Self {
        self.rebuild = rebuild;
        self
    }

    /// Checks the options against a configuration.
    pub fn validate<C: DivisorConfig>(&self, conf: &C) -> Result<(), ConfigError> {
        validate_config(conf)?;
        if self.leaf_size < 2 {
            return Err(ConfigError::LeafSizeTooSmall(self.leaf_size));
        }
        validate_rebuild(self.rebuild)
    }
}

/// Per-instance options of a [`DivList`](crate::DivList).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DivListOptions {
    pub sort_on_insert: bool,
    /// Schedule for recomputing the mask bit assignment. Only has an effect
    /// when the configuration uses div masks.
    pub rebuild: Option<RebuildPolicy>,
}

impl Default for DivListOptions {
    fn default() -> Self {
        Self {
            sort_on_insert: false,
            rebuild: Some(RebuildPolicy::default()),
        }
    }
}

impl DivListOptions {
    pub fn validate<C: DivisorConfig>(&self, conf: &C) -> Result<(), ConfigError> {
        validate_config(conf)?;
        validate_rebuild(self.rebuild)
    }
}

fn validate_config<C: DivisorConfig>(conf: &C) -> Result<(), ConfigError> {
    if conf.var_count() == 0 {
        return Err(ConfigError::NoVariables);
    }
    if C::USE_TREE_DIV_MASK && !C::USE_DIV_MASK {
        return Err(ConfigError::TreeMaskWithoutEntryMask);
    }
    Ok(())
}

fn validate_rebuild(rebuild: Option<RebuildPolicy>) -> Result<(), ConfigError> {
    match rebuild {
        Some(policy) if !(policy.ratio > 0.0 && policy.ratio.is_finite()) => {
            Err(ConfigError::InvalidRebuildRatio(policy.ratio))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_does_not_overflow() {
        assert_eq!(u8::cut_midpoint(250, 255), 252);
        assert_eq!(i64::cut_midpoint(i64::MIN, i64::MAX), -1);
        assert_eq!(u64::cut_midpoint(0, u64::MAX), u64::MAX / 2);
        assert_eq!(i32::cut_midpoint(-7, -7), -7);
        // Rounds toward the lower end, also for negative ranges.
        assert_eq!(i32::cut_midpoint(-3, 0), -2);
        assert_eq!(i8::cut_midpoint(i8::MIN, i8::MIN + 1), i8::MIN);
    }

    #[test]
    fn test_spaced_thresholds() {
        let ts: Vec<u32> = (0..4).map(|i| u32::spaced(10, 30, i, 4)).collect();
        assert_eq!(ts, vec![10, 15, 20, 25]);
        // Narrow ranges still advance by one.
        let ts: Vec<u32> = (0..3).map(|i| u32::spaced(5, 6, i, 3)).collect();
        assert_eq!(ts, vec![5, 6, 7]);
        assert_eq!(u8::spaced(200, 255, 100, 1), u8::MAX);
    }

    #[test]
    fn test_doubling_saturates() {
        let ts: Vec<u8> = (0..12).map(u8::doubling).collect();
        assert_eq!(ts, vec![0, 1, 2, 4, 8, 16, 32, 64, 128, 255, 255, 255]);
        assert_eq!(i8::doubling(8), i8::MAX);
        assert_eq!(u64::doubling(64), 1u64 << 63);
        assert_eq!(u64::doubling(200), u64::MAX);
    }

    #[test]
    fn test_basic_config_order_is_compatible_with_divisibility() {
        let conf: BasicConfig<i32> = BasicConfig::new(3);
        let a = [1, 2, 3];
        let b = [1, 5, 3];
        assert!(conf.divides(&a, &b));
        assert_eq!(conf.compare(&a, &b), Ordering::Less);
        assert_eq!(conf.compare(&a, &a), Ordering::Equal);
    }

    #[test]
    fn test_validate() {
        let conf: BasicConfig<u32> = BasicConfig::new(2);
        assert!(KDTreeOptions::default().validate(&conf).is_ok());
        assert_eq!(
            KDTreeOptions::default().with_leaf_size(1).validate(&conf),
            Err(ConfigError::LeafSizeTooSmall(1))
        );
        assert_eq!(
            KDTreeOptions::default()
                .with_rebuild(Some(RebuildPolicy { ratio: 0.0, min: 1 }))
                .validate(&conf),
            Err(ConfigError::InvalidRebuildRatio(0.0))
        );
        assert_eq!(
            DivListOptions {
                sort_on_insert: false,
                rebuild: Some(RebuildPolicy { ratio: f64::INFINITY, min: 1 }),
            }
            .validate(&conf),
            Err(ConfigError::InvalidRebuildRatio(f64::INFINITY))
        );
        assert!(matches!(
            KDTreeOptions::default()
                .with_rebuild(Some(RebuildPolicy { ratio: f64::NAN, min: 1 }))
                .validate(&conf),
            Err(ConfigError::InvalidRebuildRatio(r)) if r.is_nan()
        ));

        let empty: BasicConfig<u32> = BasicConfig::new(0);
        assert_eq!(
            KDTreeOptions::default().validate(&empty),
            Err(ConfigError::NoVariables)
        );

        let bad: BasicConfig<u32, false, true> = BasicConfig::new(2);
        assert_eq!(
            DivListOptions::default().validate(&bad),
            Err(ConfigError::TreeMaskWithoutEntryMask)
        );
    }

    #[test]
    fn test_rebuild_budget() {
        let policy = RebuildPolicy { ratio: 0.5, min: 50 };
        assert_eq!(policy.budget(0), 50);
        assert_eq!(policy.budget(1000), 500);
    }
}
