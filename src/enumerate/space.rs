use anyhow::{Context, Result, bail};
use std::fmt;

use super::combinatorics::{self, Binomials};
use super::variant::{Variant, VariantEnumerator, Word};

/// An ordered, duplicate-free sequence of word variants
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Geode {
    variants: Vec<Variant>,
}

impl Geode {
    pub fn new(variants: Vec<Variant>) -> Self {
        Self { variants }
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Input positions of the words used, in geode order
    pub fn word_positions(&self) -> Vec<usize> {
        self.variants.iter().map(|v| v.word).collect()
    }

    /// Concatenated variant texts, no separator
    pub fn text(&self) -> String {
        self.variants.iter().map(Variant::text).collect()
    }
}

impl fmt::Display for Geode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for variant in &self.variants {
            f.write_str(variant.text())?;
        }
        Ok(())
    }
}

/// The slice of the index space holding every geode with `subset_size` words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub subset_size: usize,
    /// C(n, k)
    pub combinations: u128,
    /// k!
    pub permutations: u128,
    /// 90^k
    pub variant_space: u128,
    pub start: u128,
    pub len: u128,
}

impl Segment {
    /// Indices spanned by one combination: k! * 90^k
    pub fn block(&self) -> u128 {
        self.permutations * self.variant_space
    }

    pub fn end(&self) -> u128 {
        self.start + self.len
    }
}

/// Bijection between `0..count()` and every geode over a word list.
///
/// Geodes are ordered by subset size, then by combination of input positions
/// (lexicographic), then by permutation of that combination (Lehmer order),
/// then by per-position variant indices read as a base-90 number with the
/// first geode position most significant.
#[derive(Debug, Clone)]
pub struct SpaceEnumerator {
    words: Vec<Word>,
    variants: VariantEnumerator,
    binomials: Binomials,
    segments: Vec<Segment>,
    size: u128,
}

impl SpaceEnumerator {
    pub fn new<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        if words.is_empty() {
            bail!("At least one word is required to build a search space");
        }

        let words: Vec<Word> = words
            .iter()
            .enumerate()
            .map(|(position, text)| Word::new(position, text.as_ref()))
            .collect();
        let variants = VariantEnumerator;
        let n = words.len();
        let overflow = || format!("Search space over {n} words does not fit in 128-bit indices");

        // The full-length segment alone must fit before anything is tabulated
        combinatorics::factorial(n)
            .and_then(|f| combinatorics::mul(f, combinatorics::power(variants.count() as u128, n)?, "segment size"))
            .with_context(overflow)?;
        let binomials = Binomials::new(n).with_context(overflow)?;

        let mut segments = Vec::with_capacity(n);
        let mut start = 0u128;
        for k in 1..=n {
            let segment = Self::segment(n, k, start, &binomials, variants).with_context(overflow)?;
            start = segment.end();
            segments.push(segment);
        }

        Ok(Self {
            words,
            variants,
            binomials,
            segments,
            size: start,
        })
    }

    fn segment(
        n: usize,
        k: usize,
        start: u128,
        binomials: &Binomials,
        variants: VariantEnumerator,
    ) -> Result<Segment> {
        let combinations = binomials.get(n, k);
        let permutations = combinatorics::factorial(k)?;
        let variant_space = combinatorics::power(variants.count() as u128, k)?;
        let len = combinatorics::mul(
            combinations,
            combinatorics::mul(permutations, variant_space, "segment size")?,
            "segment size",
        )?;
        combinatorics::add(start, len, "space size")?;

        Ok(Segment {
            subset_size: k,
            combinations,
            permutations,
            variant_space,
            start,
            len,
        })
    }

    /// Build from whitespace-delimited text
    pub fn from_text(text: &str) -> Result<Self> {
        let words: Vec<&str> = text.split_whitespace().collect();
        Self::new(&words)
    }

    /// Total number of geodes, N
    pub fn count(&self) -> u128 {
        self.size
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn unrank(&self, index: u128) -> Result<Geode> {
        if index >= self.size {
            bail!("Index {index} out of range for a space of {} geodes", self.size);
        }

        let segment = self
            .segments
            .iter()
            .find(|s| index < s.end())
            .context("Index not covered by any segment")?;

        let offset = index - segment.start;
        let block = segment.block();
        let combination_rank = offset / block;
        let within = offset % block;
        let permutation_rank = within / segment.variant_space;
        let mut variant_rank = within % segment.variant_space;

        let k = segment.subset_size;
        let combination =
            combinatorics::unrank_combination(self.words.len(), k, combination_rank, &self.binomials)?;
        let order = combinatorics::unrank_permutation(&combination, permutation_rank)?;

        let radix = self.variants.count() as u128;
        let mut digits = vec![0usize; k];
        for digit in digits.iter_mut().rev() {
            *digit = (variant_rank % radix) as usize;
            variant_rank /= radix;
        }

        let variants = order
            .iter()
            .zip(digits)
            .map(|(&position, digit)| self.variants.unrank(&self.words[position], digit))
            .collect::<Result<Vec<_>>>()?;
        Ok(Geode::new(variants))
    }

    pub fn rank(&self, geode: &Geode) -> Result<u128> {
        let k = geode.len();
        let Some(segment) = k.checked_sub(1).and_then(|i| self.segments.get(i)) else {
            bail!("Geode of {k} variants does not fit a list of {} words", self.words.len());
        };

        let order = geode.word_positions();
        let mut combination = order.clone();
        combination.sort_unstable();
        combination.dedup();
        if combination.len() != k {
            bail!("Geode repeats a word: {order:?}");
        }

        let combination_rank = combinatorics::rank_combination(self.words.len(), &combination, &self.binomials)?;
        let permutation_rank = combinatorics::rank_permutation(&order)?;

        let radix = self.variants.count() as u128;
        let mut variant_rank = 0u128;
        for variant in geode.variants() {
            let word = &self.words[variant.word];
            let digit = self.variants.rank(variant)?;
            if self.variants.unrank(word, digit)? != *variant {
                bail!("Variant {:?} was not rendered from word {:?}", variant.text(), word.text);
            }
            variant_rank = combinatorics::add(
                combinatorics::mul(variant_rank, radix, "variant rank")?,
                digit as u128,
                "variant rank",
            )?;
        }

        let offset = combinatorics::add(
            combinatorics::mul(combination_rank, segment.block(), "geode rank")?,
            combinatorics::add(
                combinatorics::mul(permutation_rank, segment.variant_space, "geode rank")?,
                variant_rank,
                "geode rank",
            )?,
            "geode rank",
        )?;
        combinatorics::add(segment.start, offset, "geode rank")
    }
}
