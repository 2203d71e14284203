use anyhow::{Result, bail};
use sha2::{Digest, Sha256};

use super::quality::Quality;
use crate::config::AmuletSettings;

/// Outcome of a qualifying candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub run_length: usize,
    pub run: String,
    pub digest: String,
    pub quality: Quality,
}

/// The amulet test: SHA-256 the UTF-8 text and look for a long run of the
/// marker digit in its lowercase hex form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmuletTest {
    marker: u8,
    min_run: usize,
    max_bytes: usize,
}

impl Default for AmuletTest {
    fn default() -> Self {
        Self {
            marker: b'8',
            min_run: 6,
            max_bytes: 64,
        }
    }
}

impl AmuletTest {
    pub fn new(marker: char, min_run: usize, max_bytes: usize) -> Result<Self> {
        if !marker.is_ascii_hexdigit() || marker.is_ascii_uppercase() {
            bail!("Marker must be a lowercase hex digit, got {marker:?}");
        }
        if min_run == 0 {
            bail!("Minimum run length must be at least 1");
        }
        Ok(Self {
            marker: marker as u8,
            min_run,
            max_bytes,
        })
    }

    pub fn from_settings(settings: &AmuletSettings) -> Result<Self> {
        Self::new(settings.marker_char()?, settings.min_run, settings.max_bytes)
    }

    pub fn marker(&self) -> char {
        self.marker as char
    }

    pub fn min_run(&self) -> usize {
        self.min_run
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Returns a verdict when `text` qualifies. Oversized texts never qualify.
    pub fn check(&self, text: &str) -> Option<Verdict> {
        if text.len() > self.max_bytes {
            return None;
        }

        let digest = digest_hex(text);
        let (start, run_length) = longest_run(&digest, self.marker);
        if run_length < self.min_run {
            return None;
        }

        Some(Verdict {
            run_length,
            run: digest[start..start + run_length].to_string(),
            quality: Quality::from_run(run_length),
            digest,
        })
    }
}

/// Lowercase hex SHA-256 of the UTF-8 bytes of `text`
pub fn digest_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Start and length of the first longest maximal run of `marker`
pub fn longest_run(hex: &str, marker: u8) -> (usize, usize) {
    let mut best = (0, 0);
    let mut current_start = 0;
    let mut current_len = 0;
    for (i, &b) in hex.as_bytes().iter().enumerate() {
        if b == marker {
            if current_len == 0 {
                current_start = i;
            }
            current_len += 1;
            if current_len > best.1 {
                best = (current_start, current_len);
            }
        } else {
            current_len = 0;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_hex() {
        assert_eq!(
            digest_hex("geode-5"),
            "20c16d623e4ea7c1790c0ccced9dabac51313c1cdbadf144ab13ccfae637d936"
        );
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(longest_run("a88b888c8", b'8'), (4, 3));
        assert_eq!(longest_run("8888", b'8'), (0, 4));
        assert_eq!(longest_run("abc", b'8'), (0, 0));
        assert_eq!(longest_run("88x88", b'8'), (0, 2));
    }

    #[test]
    fn test_rare_amulet() {
        // e9f694d9bc6a47f7efe7f795a7ca839888888fb7a225ec27ca908e9505e28277
        let verdict = AmuletTest::default().check("geode-378375").unwrap();
        assert_eq!(verdict.run_length, 6);
        assert_eq!(verdict.run, "888888");
        assert_eq!(verdict.quality, Quality::Rare);
        assert_eq!(
            verdict.digest,
            "e9f694d9bc6a47f7efe7f795a7ca839888888fb7a225ec27ca908e9505e28277"
        );
    }

    #[test]
    fn test_epic_amulet() {
        let verdict = AmuletTest::default().check("geode-7150301").unwrap();
        assert_eq!(verdict.quality, Quality::Epic);
    }

    #[test]
    fn test_short_run_does_not_qualify() {
        // Longest run in this digest is 888
        assert!(AmuletTest::default().check("geode-224").is_none());
        assert!(AmuletTest::default().check("geode-5").is_none());

        let lenient = AmuletTest::new('8', 3, 64).unwrap();
        let verdict = lenient.check("geode-224").unwrap();
        assert_eq!(verdict.quality, Quality::Unclassified(3));
    }

    #[test]
    fn test_oversize_never_qualifies() {
        let text = "oversized geode text padding oversized geode text padding oversized geode text padding -346232";
        assert!(text.len() > 64);
        // The digest does carry a six-run of eights
        assert_eq!(longest_run(&digest_hex(text), b'8').1, 6);
        assert!(AmuletTest::default().check(text).is_none());

        let roomy = AmuletTest::new('8', 6, 128).unwrap();
        assert!(roomy.check(text).is_some());
    }

    #[test]
    fn test_marker_validation() {
        assert!(AmuletTest::new('g', 6, 64).is_err());
        assert!(AmuletTest::new('A', 6, 64).is_err());
        assert!(AmuletTest::new('8', 0, 64).is_err());
        assert_eq!(AmuletTest::new('f', 4, 64).unwrap().marker(), 'f');
    }
}
