use anyhow::Result;
use clap::Args;

use super::WordArgs;
use crate::amulet::{AmuletTest, digest_hex, longest_run};
use crate::cli::output::Output;
use crate::config::AmuletsConfig;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Index into the geode space
    #[arg(value_name = "INDEX")]
    pub index: u128,

    #[command(flatten)]
    pub words: WordArgs,
}

pub fn execute(args: InspectArgs, config_path: Option<&str>) -> Result<()> {
    let settings = AmuletsConfig::load(config_path, None::<&()>)?.settings()?;
    let test = AmuletTest::from_settings(&settings.amulet)?;
    let space = args.words.space()?;
    let output = Output::new(false, false);

    let geode = space.unrank(args.index)?;
    let text = geode.text();
    let digest = digest_hex(&text);
    let (_, run) = longest_run(&digest, test.marker() as u8);
    let words: Vec<&str> = geode
        .word_positions()
        .iter()
        .map(|&p| space.words()[p].text.as_str())
        .collect();

    output.header(&format!("Geode #{}", args.index));
    output.key_value("Words", &words.join(" "), false);
    output.key_value("Text", &format!("{text:?}"), false);
    output.key_value("Bytes", &text.len().to_string(), false);
    output.key_value("SHA-256", &digest, false);
    output.key_value("Longest run", &format!("{run} x '{}'", test.marker()), false);

    match test.check(&text) {
        Some(verdict) => output.success(&format!("Amulet: {}", verdict.quality)),
        None if text.len() > test.max_bytes() => output.info(&format!(
            "Not an amulet: text is {} bytes, limit is {}",
            text.len(),
            test.max_bytes()
        )),
        None => output.info(&format!(
            "Not an amulet: run of {run} is below {}",
            test.min_run()
        )),
    }
    Ok(())
}
