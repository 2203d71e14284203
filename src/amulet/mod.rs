//! The amulet test and the results it produces
//!
//! A geode is an amulet when the SHA-256 of its text, written as lowercase
//! hex, contains a long enough run of the marker digit. The run length picks
//! the [`Quality`] tier.

pub mod predicate;
pub mod quality;

pub use predicate::{AmuletTest, Verdict, digest_hex, longest_run};
pub use quality::Quality;

use crate::enumerate::Geode;

/// A qualifying geode, as emitted by the worker that found it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amulet {
    pub index: u128,
    pub worker: usize,
    pub geode: Geode,
    pub verdict: Verdict,
}

impl Amulet {
    pub fn quality(&self) -> Quality {
        self.verdict.quality
    }

    pub fn text(&self) -> String {
        self.geode.text()
    }
}
