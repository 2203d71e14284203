use anyhow::Result;
use clap::Args;

use super::WordArgs;
use crate::config::{AmuletsConfig, OutputFormat};

#[derive(Args, Debug)]
pub struct CountArgs {
    #[command(flatten)]
    pub words: WordArgs,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

pub fn execute(args: CountArgs, config_path: Option<&str>) -> Result<()> {
    let settings = AmuletsConfig::load(config_path, None::<&()>)?.settings()?;
    let space = args.words.space()?;

    match args.format.unwrap_or(settings.output.format) {
        OutputFormat::Json => {
            let segments: Vec<_> = space
                .segments()
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "subset_size": s.subset_size,
                        "combinations": s.combinations.to_string(),
                        "permutations": s.permutations.to_string(),
                        "variants": s.variant_space.to_string(),
                        "start": s.start.to_string(),
                        "len": s.len.to_string(),
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "words": space.words().len(),
                    "count": space.count().to_string(),
                    "segments": segments,
                })
            );
        }
        OutputFormat::Text => {
            println!("{}", space.count());
            for s in space.segments() {
                println!(
                    "  {} word(s): {} combinations x {} orderings x {} variants = {}",
                    s.subset_size, s.combinations, s.permutations, s.variant_space, s.len
                );
            }
        }
    }
    Ok(())
}
