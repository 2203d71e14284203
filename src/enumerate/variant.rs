use anyhow::{Result, bail};
use std::fmt;

/// Trailing punctuation appended to a word before case transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punctuation {
    None,
    Comma,
    Period,
    Newline,
    Bang,
    Question,
}

impl Punctuation {
    pub const ALL: [Punctuation; 6] = [
        Punctuation::None,
        Punctuation::Comma,
        Punctuation::Period,
        Punctuation::Newline,
        Punctuation::Bang,
        Punctuation::Question,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Punctuation::None => "",
            Punctuation::Comma => ",",
            Punctuation::Period => ".",
            Punctuation::Newline => "\n",
            Punctuation::Bang => "!",
            Punctuation::Question => "?",
        }
    }

    fn ordinal(self) -> usize {
        self as usize
    }
}

/// Case transformation applied to `word + punctuation`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseTransform {
    Identity,
    Upper,
    Title,
}

impl CaseTransform {
    pub const ALL: [CaseTransform; 3] = [CaseTransform::Identity, CaseTransform::Upper, CaseTransform::Title];

    pub fn apply(self, text: &str) -> String {
        match self {
            CaseTransform::Identity => text.to_string(),
            CaseTransform::Upper => text.to_uppercase(),
            CaseTransform::Title => title_case(text),
        }
    }

    fn ordinal(self) -> usize {
        self as usize
    }
}

/// Title casing per whitespace-separated token: the first letter of the token
/// is upper-cased and every later letter lower-cased.
fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut seen_letter = false;
    for c in text.chars() {
        if c.is_whitespace() {
            titled.push(c);
            seen_letter = false;
        } else if !c.is_alphabetic() {
            titled.push(c);
        } else if seen_letter {
            titled.extend(c.to_lowercase());
        } else {
            titled.extend(c.to_uppercase());
            seen_letter = true;
        }
    }
    titled
}

pub const LEADING_SPACE_OPTIONS: usize = 5;

/// One input word. Identity is its position in the word list, so duplicate
/// texts are distinct words.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word {
    pub position: usize,
    pub text: String,
}

impl Word {
    pub fn new(position: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

/// A single rendering of a word
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant {
    pub word: usize,
    pub punctuation: Punctuation,
    pub transform: CaseTransform,
    pub spaces: usize,
    text: String,
}

impl Variant {
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Bijection between `0..90` and the (punctuation, transform, spaces) triples
/// of a word.
///
/// Mixed-radix layout, punctuation slowest and spaces fastest:
/// `index = (punctuation * 3 + transform) * 5 + spaces`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantEnumerator;

impl VariantEnumerator {
    pub const COUNT: usize = Punctuation::ALL.len() * CaseTransform::ALL.len() * LEADING_SPACE_OPTIONS;

    pub fn count(&self) -> usize {
        Self::COUNT
    }

    pub fn unrank(&self, word: &Word, index: usize) -> Result<Variant> {
        if index >= Self::COUNT {
            bail!("Variant index {index} out of range 0..{}", Self::COUNT);
        }

        let spaces = index % LEADING_SPACE_OPTIONS;
        let rest = index / LEADING_SPACE_OPTIONS;
        let transform = CaseTransform::ALL[rest % CaseTransform::ALL.len()];
        let punctuation = Punctuation::ALL[rest / CaseTransform::ALL.len()];

        let mut text = " ".repeat(spaces);
        text.push_str(&transform.apply(&format!("{}{}", word.text, punctuation.as_str())));

        Ok(Variant {
            word: word.position,
            punctuation,
            transform,
            spaces,
            text,
        })
    }

    pub fn rank(&self, variant: &Variant) -> Result<usize> {
        if variant.spaces >= LEADING_SPACE_OPTIONS {
            bail!("Variant has {} leading spaces, at most {} allowed", variant.spaces, LEADING_SPACE_OPTIONS - 1);
        }
        Ok((variant.punctuation.ordinal() * CaseTransform::ALL.len() + variant.transform.ordinal())
            * LEADING_SPACE_OPTIONS
            + variant.spaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_count() {
        assert_eq!(VariantEnumerator.count(), 90);
    }

    #[test]
    fn test_rank_inverts_unrank() {
        let enumerator = VariantEnumerator;
        for text in ["ok", "hello world", "Ünïcode", ""] {
            let word = Word::new(3, text);
            let mut triples = HashSet::new();
            for i in 0..enumerator.count() {
                let variant = enumerator.unrank(&word, i).unwrap();
                assert_eq!(variant.word, 3);
                assert_eq!(enumerator.rank(&variant).unwrap(), i);
                triples.insert((variant.punctuation, variant.transform, variant.spaces));
            }
            assert_eq!(triples.len(), 90, "every triple reachable exactly once");
        }
    }

    #[test]
    fn test_rendering() {
        let enumerator = VariantEnumerator;
        let word = Word::new(0, "ok");
        assert_eq!(enumerator.unrank(&word, 0).unwrap().text(), "ok");
        assert_eq!(enumerator.unrank(&word, 4).unwrap().text(), "    ok");
        assert_eq!(enumerator.unrank(&word, 5).unwrap().text(), "OK");
        assert_eq!(enumerator.unrank(&word, 89).unwrap().text(), "    Ok?");
        assert_eq!(enumerator.unrank(&word, 45 + 10).unwrap().text(), "Ok\n");

        let phrase = Word::new(0, "hello wORLD");
        assert_eq!(enumerator.unrank(&phrase, 35).unwrap().text(), "HELLO WORLD.");
        assert_eq!(enumerator.unrank(&phrase, 25).unwrap().text(), "Hello World,");

        let contraction = Word::new(0, "don't");
        let titled = enumerator.unrank(&contraction, 10).unwrap();
        assert_eq!(titled.text(), "Don't");
        assert_eq!(enumerator.rank(&titled).unwrap(), 10);
        assert_eq!(enumerator.unrank(&Word::new(0, "well-known"), 10).unwrap().text(), "Well-known");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("they're here"), "They're Here");
        assert_eq!(title_case("don't"), "Don't");
        assert_eq!(title_case("well-known"), "Well-known");
        assert_eq!(title_case("'tis"), "'Tis");
        assert_eq!(title_case("ÉCOLE"), "École");
        assert_eq!(title_case("a1b"), "A1b");
    }

    #[test]
    fn test_out_of_range() {
        assert!(VariantEnumerator.unrank(&Word::new(0, "ok"), 90).is_err());
    }
}
