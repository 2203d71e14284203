//! Console output for amulets
//!
//! Styled status lines in the same family as other modern CLI tools, plus the
//! formatting of found amulets.

use console::{StyledObject, style};

use crate::amulet::{Amulet, Quality};

/// Output handler for consistent CLI formatting
#[derive(Debug, Clone, Copy)]
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), message);
        }
    }

    /// Errors are always shown, even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✖").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    /// Only shown with `-v`
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn key_value(&self, key: &str, value: &str, highlight: bool) {
        if !self.quiet {
            let styled_value = if highlight {
                style(value).green().bold()
            } else {
                style(value).white()
            };
            println!("  {:<14} {}", style(key).dim(), styled_value);
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// One-line rendering of a found amulet
    pub fn amulet_line(amulet: &Amulet) -> String {
        format!(
            "{} {:<20} {} {} {}",
            quality_style(amulet.quality(), "✦"),
            quality_style(amulet.quality(), &quality_label(amulet.quality())),
            style(format!("[worker {}]", amulet.worker)).dim(),
            style(format!("{:?}", amulet.text())).bold(),
            style(&amulet.verdict.digest).dim(),
        )
    }
}

fn quality_label(quality: Quality) -> String {
    match quality {
        Quality::Unclassified(run) => format!("{quality} ({run})"),
        classified => classified.to_string(),
    }
}

fn quality_style<D>(quality: Quality, value: D) -> StyledObject<D> {
    match quality {
        Quality::Common => style(value).white(),
        Quality::Uncommon => style(value).green(),
        Quality::Rare => style(value).blue().bold(),
        Quality::Epic => style(value).magenta().bold(),
        Quality::Legendary => style(value).yellow().bold(),
        Quality::Mythic => style(value).red().bold(),
        Quality::Unclassified(_) => style(value).cyan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amulet::AmuletTest;
    use crate::enumerate::SpaceEnumerator;

    #[test]
    fn test_amulet_line_mentions_quality_worker_and_text() {
        console::set_colors_enabled(false);
        let space = SpaceEnumerator::new(&["ok"]).unwrap();
        let geode = space.unrank(13).unwrap();
        let verdict = AmuletTest::new('8', 1, 64).unwrap().check("geode-378375").unwrap();
        let amulet = Amulet {
            index: 13,
            worker: 2,
            geode,
            verdict,
        };

        let line = Output::amulet_line(&amulet);
        assert!(line.contains("rare"));
        assert!(line.contains("[worker 2]"));
        assert!(line.contains(&format!("{:?}", amulet.text())));
    }

    #[test]
    fn test_unclassified_label_carries_run_length() {
        assert_eq!(quality_label(Quality::Unclassified(11)), "unclassified-quality (11)");
        assert_eq!(quality_label(Quality::Epic), "epic");
    }
}
