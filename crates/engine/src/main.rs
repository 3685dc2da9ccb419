//! Rollwright Engine - demo entry point.
//!
//! Seeds a sample character into the in-memory store and evaluates the
//! formulas given on the command line against it.
//!
//! ```text
//! rollwright-engine [--advantage N] [--crits] [--fumbles] [--vicious] FORMULA...
//! ```

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rollwright_domain::{Attribute, AttributeSet, Character, FormulaOptions};
use rollwright_engine::{CharacterRepo, InMemoryCharacterRepo, RollService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollwright_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (options, formulas) = parse_args(std::env::args().skip(1))?;
    if formulas.is_empty() {
        anyhow::bail!(
            "usage: rollwright-engine [--advantage N] [--crits] [--fumbles] [--vicious] FORMULA..."
        );
    }

    let repo = Arc::new(InMemoryCharacterRepo::new());
    let character = Character::new("Brakka")?
        .with_attributes(AttributeSet::new(3, 1, 0, 2))
        .with_class("Berserker", vec![Attribute::Strength])
        .with_level(2);
    let character_id = character.id;
    repo.save(&character).await?;
    tracing::info!(name = %character.name, "Seeded demo character");

    let service = RollService::new(repo);
    for formula in &formulas {
        match service
            .roll_for_character(character_id, formula, &options)
            .await
        {
            Ok(report) => {
                println!("{} => {}  (total {})", formula, report.display_string, report.total);
            }
            Err(e) => {
                eprintln!("{}", e);
            }
        }
    }

    Ok(())
}

fn parse_args(
    mut args: impl Iterator<Item = String>,
) -> anyhow::Result<(FormulaOptions, Vec<String>)> {
    let mut options = FormulaOptions::default();
    let mut formulas = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--advantage" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--advantage requires a value"))?;
                options.advantage_level = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid advantage level: {value}"))?;
            }
            "--crits" => options.allow_criticals = true,
            "--fumbles" => options.allow_fumbles = true,
            "--vicious" => options.vicious = true,
            _ => formulas.push(arg),
        }
    }

    Ok((options, formulas))
}
