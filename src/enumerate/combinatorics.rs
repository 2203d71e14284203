//! Checked 128-bit combinatorial arithmetic for ranking and unranking
//! combinations and permutations.
//!
//! Every operation that can overflow goes through `checked_*` and surfaces an
//! error instead of wrapping. Nothing here touches floating point.

use anyhow::{Context, Result, anyhow, bail};

/// Multiply with an overflow error naming what was being computed
pub fn mul(a: u128, b: u128, what: &str) -> Result<u128> {
    a.checked_mul(b)
        .ok_or_else(|| anyhow!("Index arithmetic overflow while computing {what}"))
}

/// Add with an overflow error naming what was being computed
pub fn add(a: u128, b: u128, what: &str) -> Result<u128> {
    a.checked_add(b)
        .ok_or_else(|| anyhow!("Index arithmetic overflow while computing {what}"))
}

pub fn factorial(n: usize) -> Result<u128> {
    (1..=n as u128).try_fold(1u128, |acc, i| mul(acc, i, "factorial"))
}

pub fn power(base: u128, exp: usize) -> Result<u128> {
    (0..exp).try_fold(1u128, |acc, _| mul(acc, base, "power"))
}

/// Pascal's triangle up to row `n`, so `table[m][j] == C(m, j)` for `j <= m`
/// and zero above the diagonal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binomials {
    table: Vec<Vec<u128>>,
}

impl Binomials {
    pub fn new(n: usize) -> Result<Self> {
        let mut table = vec![vec![0u128; n + 1]; n + 1];
        for m in 0..=n {
            table[m][0] = 1;
            for j in 1..=m {
                table[m][j] = add(table[m - 1][j - 1], table[m - 1][j], "binomial")?;
            }
        }
        Ok(Self { table })
    }

    pub fn get(&self, m: usize, j: usize) -> u128 {
        if j > m {
            return 0;
        }
        self.table
            .get(m)
            .and_then(|row| row.get(j))
            .copied()
            .unwrap_or(0)
    }
}

/// Lexicographic unranking of a `k`-subset of `0..n`.
pub fn unrank_combination(n: usize, k: usize, mut rank: u128, binomials: &Binomials) -> Result<Vec<usize>> {
    if rank >= binomials.get(n, k) {
        bail!("Combination rank {rank} out of range for C({n}, {k})");
    }

    let mut combination = Vec::with_capacity(k);
    let mut candidate = 0;
    while combination.len() < k {
        let remaining = k - combination.len() - 1;
        // Number of combinations whose next element is `candidate`
        let starting_here = binomials.get(n - candidate - 1, remaining);
        if rank < starting_here {
            combination.push(candidate);
        } else {
            rank -= starting_here;
        }
        candidate += 1;
    }
    Ok(combination)
}

/// Inverse of [`unrank_combination`]; `combination` must be strictly ascending.
pub fn rank_combination(n: usize, combination: &[usize], binomials: &Binomials) -> Result<u128> {
    let k = combination.len();
    let mut rank = 0u128;
    let mut candidate = 0;
    for (i, &element) in combination.iter().enumerate() {
        if element >= n || (i > 0 && element <= combination[i - 1]) {
            bail!("Combination {combination:?} is not an ascending subset of 0..{n}");
        }
        let remaining = k - i - 1;
        while candidate < element {
            rank = add(rank, binomials.get(n - candidate - 1, remaining), "combination rank")?;
            candidate += 1;
        }
        candidate += 1;
    }
    Ok(rank)
}

/// Lehmer-code unranking: the `rank`-th permutation of `items` in
/// lexicographic order of the sorted items.
pub fn unrank_permutation(items: &[usize], mut rank: u128) -> Result<Vec<usize>> {
    let total = factorial(items.len())?;
    if rank >= total {
        bail!("Permutation rank {rank} out of range for {} items", items.len());
    }

    let mut pool = items.to_vec();
    pool.sort_unstable();
    let mut permutation = Vec::with_capacity(pool.len());
    while !pool.is_empty() {
        let block = factorial(pool.len() - 1)?;
        let pick = (rank / block) as usize;
        rank %= block;
        permutation.push(pool.remove(pick));
    }
    Ok(permutation)
}

/// Inverse of [`unrank_permutation`].
pub fn rank_permutation(permutation: &[usize]) -> Result<u128> {
    let mut pool = permutation.to_vec();
    pool.sort_unstable();
    pool.dedup();
    if pool.len() != permutation.len() {
        bail!("Permutation {permutation:?} repeats an element");
    }
    let mut rank = 0u128;
    for &item in permutation {
        let pick = pool
            .iter()
            .position(|&p| p == item)
            .context("Permutation element missing from its pool")?;
        pool.remove(pick);
        let block = factorial(pool.len())?;
        rank = add(rank, mul(pick as u128, block, "permutation rank")?, "permutation rank")?;
    }
    Ok(rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial_and_power() {
        assert_eq!(factorial(0).unwrap(), 1);
        assert_eq!(factorial(5).unwrap(), 120);
        assert_eq!(power(90, 2).unwrap(), 8100);
        assert!(factorial(40).is_err());
        assert!(power(90, 30).is_err());
    }

    #[test]
    fn test_binomials() {
        let b = Binomials::new(6).unwrap();
        assert_eq!(b.get(6, 3), 20);
        assert_eq!(b.get(5, 0), 1);
        assert_eq!(b.get(4, 5), 0);
    }

    #[test]
    fn test_combinations_lexicographic() {
        let b = Binomials::new(4).unwrap();
        let all: Vec<_> = (0..6).map(|r| unrank_combination(4, 2, r, &b).unwrap()).collect();
        assert_eq!(
            all,
            vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2], vec![1, 3], vec![2, 3]]
        );
        for (rank, combination) in all.iter().enumerate() {
            assert_eq!(rank_combination(4, combination, &b).unwrap(), rank as u128);
        }
        assert!(unrank_combination(4, 2, 6, &b).is_err());
        assert!(rank_combination(4, &[2, 1], &b).is_err());
    }

    #[test]
    fn test_permutations_lexicographic() {
        let items = [3, 7, 5];
        let all: Vec<_> = (0..6).map(|r| unrank_permutation(&items, r).unwrap()).collect();
        assert_eq!(all[0], vec![3, 5, 7]);
        assert_eq!(all[1], vec![3, 7, 5]);
        assert_eq!(all[5], vec![7, 5, 3]);
        for (rank, permutation) in all.iter().enumerate() {
            assert_eq!(rank_permutation(permutation).unwrap(), rank as u128);
        }
        assert!(unrank_permutation(&items, 6).is_err());
        assert!(rank_permutation(&[1, 1]).is_err());
        assert!(rank_permutation(&[4, 2, 4]).is_err());
    }
}
