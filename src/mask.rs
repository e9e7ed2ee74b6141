//! Div masks: a 64-bit summary of a monomial used to rule out divisibility
//! cheaply.
//!
//! Each bit of a mask stands for a predicate `exponent(var) > threshold`. If
//! `a` divides `b` then every predicate true for `a` is true for `b`, so the
//! mask of `a` is a sub-mask of the mask of `b`. The converse does not hold:
//! a sub-mask only means "might divide".

use crate::config::{DivisorConfig, Exponent};

const MASK_BITS: usize = u64::BITS as usize;

/// A set of bits computed by a [`DivMaskCalculator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DivMask(u64);

impl DivMask {
    /// All bits set. The identity of [`DivMask::combine_and`], used as the
    /// aggregate of an empty set.
    pub const FULL: DivMask = DivMask(u64::MAX);

    #[inline]
    pub const fn from_raw(bits: u64) -> Self {
        Self(bits)
    }

    /// `false` proves that a monomial with this mask does not divide one with
    /// `other`'s mask. `true` proves nothing.
    #[inline]
    pub const fn can_divide(self, other: DivMask) -> bool {
        self.0 & !other.0 == 0
    }

    /// Narrows an aggregate so that it still can divide `other`.
    #[inline]
    pub fn combine_and(&mut self, other: DivMask) {
        self.0 &= other.0;
    }
}

/// Assigns a `(var, threshold)` predicate to each mask bit and computes masks.
///
/// Masks computed before a rebuild are meaningless afterwards; every stored
/// mask has to be recomputed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DivMaskCalculator<X> {
    /// Bit `i` is set iff the exponent of `bits[i].0` is greater than `bits[i].1`.
    bits: Vec<(usize, X)>,
}

impl<X: Exponent> DivMaskCalculator<X> {
    /// A calculator with the data-independent default assignment.
    pub fn new<C: DivisorConfig<Exponent = X>>(conf: &C) -> Self {
        let mut calc = Self { bits: Vec::new() };
        calc.rebuild_default(conf);
        calc
    }

    pub fn bit_count(&self) -> usize {
        self.bits.len()
    }

    /// The `(var, threshold)` predicate behind each bit, lowest bit first.
    pub fn predicates(&self) -> &[(usize, X)] {
        &self.bits
    }

    /// Thresholds `0, 1, 2, 4, 8, ...` for every variable.
    pub fn rebuild_default<C: DivisorConfig<Exponent = X>>(&mut self, conf: &C) {
        self.bits.clear();
        let var_count = conf.var_count();
        for var in 0..var_count {
            for i in 0..bits_for_var(var, var_count) {
                self.bits.push((var, X::doubling(i)));
            }
        }
    }

    /// Spreads each variable's bits evenly over the exponent range seen in
    /// `sample`. An empty sample gives the default assignment.
    pub fn rebuild<'a, C, I>(&mut self, conf: &C, sample: I)
    where
        C: DivisorConfig<Exponent = X>,
        C::Monomial: 'a,
        I: Iterator<Item = &'a C::Monomial> + Clone,
    {
        if sample.clone().next().is_none() {
            self.rebuild_default(conf);
            return;
        }

        self.bits.clear();
        let var_count = conf.var_count();
        for var in 0..var_count {
            let count = bits_for_var(var, var_count);
            if count == 0 {
                continue;
            }
            let Some((min, max)) = exponent_range(conf, var, sample.clone()) else {
                continue;
            };
            for i in 0..count {
                self.bits.push((var, X::spaced(min, max, i, count)));
            }
        }
    }

    /// The mask of `monomial` under the current assignment.
    #[inline]
    pub fn compute<C>(&self, conf: &C, monomial: &C::Monomial) -> DivMask
    where
        C: DivisorConfig<Exponent = X>,
    {
        let mut mask = 0u64;
        for (i, &(var, threshold)) in self.bits.iter().enumerate() {
            if conf.exponent(monomial, var) > threshold {
                mask |= 1u64 << i;
            }
        }
        DivMask(mask)
    }

    /// Approximate heap bytes held by the bit assignment.
    pub fn memory_usage(&self) -> usize {
        self.bits.capacity() * std::mem::size_of::<(usize, X)>()
    }
}

/// The first `MASK_BITS % var_count` variables get one extra bit. With more
/// variables than bits, the tail gets none.
fn bits_for_var(var: usize, var_count: usize) -> usize {
    MASK_BITS / var_count + usize::from(var < MASK_BITS % var_count)
}

/// Smallest and largest exponent of `var` over `monomials`.
pub(crate) fn exponent_range<'a, C, I>(
    conf: &C,
    var: usize,
    monomials: I,
) -> Option<(C::Exponent, C::Exponent)>
where
    C: DivisorConfig,
    C::Monomial: 'a,
    I: Iterator<Item = &'a C::Monomial>,
{
    monomials.fold(None, |range, m| {
        let e = conf.exponent(m, var);
        Some(match range {
            None => (e, e),
            Some((min, max)) => (min.min(e), max.max(e)),
        })
    })
}
