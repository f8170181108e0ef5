use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor};

use itertools::Itertools;
use tracing::{trace, warn};

use crate::error::Error;
use crate::extract::{extract_tuple, FactorTuple};
use crate::math::OrderedSet;

/// A k-TSS descriptor `(P, S, I, T, k)`: the four factor sets that
/// summarize the language accepted by a k-local acceptor built from some
/// (possibly merged) set of example strings.
///
/// Descriptors are immutable once constructed. All combinators
/// ([`Descriptor::union`], [`Descriptor::intersection`],
/// [`Descriptor::symmetric_difference`]) produce a new descriptor and
/// re-check the validity invariant below.
///
/// Validity invariant:
/// - (V1) every element of `prefixes`/`suffixes` has length `k - 1`; every
///   element of `infixes` has length `k`; every element of `shorts` has
///   length strictly less than `k`.
/// - (V2) `{t in shorts : |t| = k - 1} == prefixes ∩ suffixes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    prefixes: OrderedSet<String>,
    suffixes: OrderedSet<String>,
    infixes: OrderedSet<String>,
    shorts: OrderedSet<String>,
    k: usize,
}

impl Descriptor {
    /// Constructs a descriptor from its four factor sets. If `k` is `None`,
    /// it is inferred from any element of `infixes`; fails with
    /// [`Error::EmptyInfixesForInference`] if `infixes` is empty in that
    /// case. Verifies the validity invariant, collecting every violated
    /// clause before returning [`Error::InvalidDescriptor`].
    pub fn new(
        prefixes: OrderedSet<String>,
        suffixes: OrderedSet<String>,
        infixes: OrderedSet<String>,
        shorts: OrderedSet<String>,
        k: Option<usize>,
    ) -> Result<Self, Error> {
        let k = match k {
            Some(k) => k,
            None => infixes
                .iter()
                .next()
                .map(|inf| inf.chars().count())
                .ok_or(Error::EmptyInfixesForInference)?,
        };

        let descriptor = Self {
            prefixes,
            suffixes,
            infixes,
            shorts,
            k,
        };
        descriptor.check_invariant()?;
        Ok(descriptor)
    }

    /// Builds the descriptor of a single example string, as defined in
    /// `extract(w, k)`.
    pub fn from_example(w: &str, k: usize) -> Result<Self, Error> {
        let (prefixes, suffixes, infixes, shorts) = extract_tuple(w, k);
        Self::new(prefixes, suffixes, infixes, shorts, Some(k))
    }

    /// Convenience constructor bypassing extraction; primarily used by
    /// combinators that have already computed valid factor sets.
    fn from_raw(
        prefixes: OrderedSet<String>,
        suffixes: OrderedSet<String>,
        infixes: OrderedSet<String>,
        shorts: OrderedSet<String>,
        k: usize,
    ) -> Result<Self, Error> {
        Self::new(prefixes, suffixes, infixes, shorts, Some(k))
    }

    fn check_invariant(&self) -> Result<(), Error> {
        let mut violations = Vec::new();

        let same_length = |set: &OrderedSet<String>, expected: usize| {
            set.iter().all(|s| s.chars().count() == expected)
        };

        if !same_length(&self.prefixes, self.k.saturating_sub(1)) {
            violations.push("incorrect prefix length".to_string());
        }
        if !same_length(&self.suffixes, self.k.saturating_sub(1)) {
            violations.push("incorrect suffix length".to_string());
        }
        if !same_length(&self.infixes, self.k) {
            violations.push("incorrect infix length".to_string());
        }
        if !self.shorts.iter().all(|s| s.chars().count() < self.k) {
            violations.push("incorrect short string length".to_string());
        }

        let presuffixes: OrderedSet<String> = self
            .prefixes
            .intersection(&self.suffixes)
            .cloned()
            .collect();
        let shorts_len_k_minus_1: OrderedSet<String> = self
            .shorts
            .iter()
            .filter(|s| s.chars().count() == self.k.saturating_sub(1))
            .cloned()
            .collect();
        if presuffixes != shorts_len_k_minus_1 {
            violations.push("short strings conditions not satisfied".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            warn!(k = self.k, ?violations, "descriptor failed the validity invariant");
            Err(Error::InvalidDescriptor { violations })
        }
    }

    fn ensure_compatible(&self, other: &Self) -> Result<(), Error> {
        if self.k != other.k {
            return Err(Error::IncompatibleK {
                left: self.k,
                right: other.k,
            });
        }
        Ok(())
    }

    /// The window size this descriptor was built with.
    pub fn k(&self) -> usize {
        self.k
    }

    /// The prefix factor set `P`.
    pub fn prefixes(&self) -> &OrderedSet<String> {
        &self.prefixes
    }

    /// The suffix factor set `S`.
    pub fn suffixes(&self) -> &OrderedSet<String> {
        &self.suffixes
    }

    /// The infix factor set `I`.
    pub fn infixes(&self) -> &OrderedSet<String> {
        &self.infixes
    }

    /// The short-string factor set `T`.
    pub fn shorts(&self) -> &OrderedSet<String> {
        &self.shorts
    }

    /// Exposes the raw factor tuple, e.g. for serialization.
    pub fn as_tuple(&self) -> FactorTuple {
        (
            self.prefixes.clone(),
            self.suffixes.clone(),
            self.infixes.clone(),
            self.shorts.clone(),
        )
    }

    /// `A ∪ B`. Prefixes, suffixes and infixes union plainly; shorts also absorb any string
    /// that is a prefix of one operand and a suffix of the other, to keep
    /// invariant (V2) satisfied.
    pub fn union(&self, other: &Self) -> Result<Self, Error> {
        self.ensure_compatible(other)?;
        trace!(k = self.k, "union of descriptors of cardinality {} and {}", self.cardinality(), other.cardinality());
        let prefixes = union(&self.prefixes, &other.prefixes);
        let suffixes = union(&self.suffixes, &other.suffixes);
        let infixes = union(&self.infixes, &other.infixes);
        let mut shorts = union(&self.shorts, &other.shorts);
        shorts.extend(self.prefixes.intersection(&other.suffixes).cloned());
        shorts.extend(self.suffixes.intersection(&other.prefixes).cloned());
        Self::from_raw(prefixes, suffixes, infixes, shorts, self.k)
    }

    /// `A ∩ B`.
    pub fn intersection(&self, other: &Self) -> Result<Self, Error> {
        self.ensure_compatible(other)?;
        let prefixes = self.prefixes.intersection(&other.prefixes).cloned().collect();
        let suffixes = self.suffixes.intersection(&other.suffixes).cloned().collect();
        let infixes = self.infixes.intersection(&other.infixes).cloned().collect();
        let shorts = self.shorts.intersection(&other.shorts).cloned().collect();
        Self::from_raw(prefixes, suffixes, infixes, shorts, self.k)
    }

    /// `A △ B`.
    pub fn symmetric_difference(&self, other: &Self) -> Result<Self, Error> {
        self.ensure_compatible(other)?;
        let prefixes = sym_diff(&self.prefixes, &other.prefixes);
        let suffixes = sym_diff(&self.suffixes, &other.suffixes);
        let infixes = sym_diff(&self.infixes, &other.infixes);
        let mut shorts = sym_diff(&self.shorts, &other.shorts);
        shorts = sym_diff(
            &shorts,
            &self.prefixes.intersection(&other.suffixes).cloned().collect(),
        );
        shorts = sym_diff(
            &shorts,
            &self.suffixes.intersection(&other.prefixes).cloned().collect(),
        );
        Self::from_raw(prefixes, suffixes, infixes, shorts, self.k)
    }

    /// `|D| = |P| + |S| + |I| + card_short_strict(T)`, where
    /// `card_short_strict` only counts elements of `T` strictly shorter than
    /// `k - 1` (length-`k-1` elements are already counted via `P ∩ S`).
    pub fn cardinality(&self) -> usize {
        let short_strict = self
            .shorts
            .iter()
            .filter(|s| s.chars().count() < self.k.saturating_sub(1))
            .count();
        self.prefixes.len() + self.suffixes.len() + self.infixes.len() + short_strict
    }

    /// `d(A, B) = |A △ B|`.
    pub fn distance(&self, other: &Self) -> Result<usize, Error> {
        Ok(self.symmetric_difference(other)?.cardinality())
    }
}

fn union(a: &OrderedSet<String>, b: &OrderedSet<String>) -> OrderedSet<String> {
    a.union(b).cloned().collect()
}

fn sym_diff(a: &OrderedSet<String>, b: &OrderedSet<String>) -> OrderedSet<String> {
    a.symmetric_difference(b).cloned().collect()
}

impl BitOr for &Descriptor {
    type Output = Result<Descriptor, Error>;
    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitAnd for &Descriptor {
    type Output = Result<Descriptor, Error>;
    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}

impl BitXor for &Descriptor {
    type Output = Result<Descriptor, Error>;
    fn bitxor(self, rhs: Self) -> Self::Output {
        self.symmetric_difference(rhs)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "k={} P={{{}}} S={{{}}} I={{{}}} T={{{}}}",
            self.k,
            self.prefixes.iter().join(","),
            self.suffixes.iter().join(","),
            self.infixes.iter().join(","),
            self.shorts.iter().join(",")
        )
    }
}
