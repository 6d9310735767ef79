//! Questions command - list the question catalogue.

use clap::Args;
use console::style;

use super::load_config;

/// Arguments for the questions command.
#[derive(Args)]
pub struct QuestionsArgs {
    /// Print the catalogue as JSON, in the format accepted by `questions_file`
    #[arg(long)]
    json: bool,
}

pub fn run(args: QuestionsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registry = config.registry()?;

    if args.json {
        println!("{}", registry.to_json()?);
        return Ok(());
    }

    println!("{}", style("Questions").bold());
    println!();
    for spec in registry.specs() {
        let scope = if spec.per_page() { "per page" } else { "document" };
        println!(
            "  {} {:<11} {:<9} {}",
            style(format!("{:<6}", spec.id)).cyan(),
            spec.matcher.kind().to_string(),
            scope,
            spec.description.as_deref().unwrap_or("")
        );
    }
    println!();
    println!("{} questions", registry.len());

    Ok(())
}
