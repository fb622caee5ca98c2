use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use sql_coach_core::tools::{analyze_query, describe_table, list_tables, suggest_optimizations};
use sql_coach_core::{ChallengeSession, CoreConfig, Schema};

mod practice;
mod settings;

#[derive(Parser, Debug)]
#[clap(author, version, about = "SQL Coach - schema-driven SQL practice challenges")]
struct Args {
    /// Config file path (JSON)
    #[clap(short, long, env = "SQL_COACH_CONFIG")]
    config: Option<PathBuf>,

    /// Schema file (YAML or JSON)
    #[clap(short, long, env = "SQL_COACH_SCHEMA")]
    schema: Option<PathBuf>,

    /// Seed for reproducible challenges
    #[clap(long, env = "SQL_COACH_SEED")]
    seed: Option<u64>,

    /// Print machine-readable JSON instead of text
    #[clap(long)]
    json: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the tables in the schema
    Tables,

    /// Show the columns, keys and indexes of a table
    Describe {
        /// Table name
        table: String,
    },

    /// Summarize the structure of a query
    Analyze {
        /// SQL query
        sql: String,
    },

    /// Suggest optimizations for a query
    Optimize {
        /// SQL query
        sql: String,
    },

    /// Print one challenge
    Challenge {
        /// beginner, intermediate or advanced
        #[clap(default_value = "beginner")]
        difficulty: String,
    },

    /// Work through challenges interactively
    Practice {
        /// Starting difficulty
        #[clap(default_value = "beginner")]
        difficulty: String,
    },
}

fn main() -> Result<()> {
    // Pick up SQL_COACH_* variables from .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = settings::load(args.config.as_deref())?;

    // Initialize logging; RUST_LOG wins over the configured level
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_filter(&config)),
    );

    // Override config with command-line arguments
    if let Some(schema) = &args.schema {
        config.schema_path = Some(schema.clone());
    }
    if let Some(seed) = args.seed {
        config.challenge.rng_seed = Some(seed);
    }

    let schema_path = match &config.schema_path {
        Some(path) => path.clone(),
        None => bail!("No schema file given; pass --schema or set schema_path in the config file"),
    };
    let schema = Schema::from_file(&schema_path)
        .with_context(|| format!("Failed to load schema from {}", schema_path.display()))?;
    info!("Loaded {} tables from {}", schema.table_count(), schema_path.display());

    let session = ChallengeSession::new(Arc::new(schema), &config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Tables => {
            let schema = session.schema()?;
            let tables = list_tables(schema.as_ref());
            if args.json {
                print_json(&mut out, &tables)?;
            } else {
                for table in tables {
                    write!(out, "{}", table.name)?;
                    if let Some(description) = &table.description {
                        write!(out, " - {}", description)?;
                    }
                    writeln!(out)?;
                }
            }
        }
        Command::Describe { table } => {
            let schema = session.schema()?;
            match describe_table(schema.as_ref(), &table) {
                Some(text) => write!(out, "{}", text)?,
                None => bail!("Unknown table '{}'", table),
            }
        }
        Command::Analyze { sql } => {
            let report = analyze_query(session.inspector(), &sql);
            if args.json {
                print_json(&mut out, &report)?;
            } else {
                write!(out, "{}", report.render())?;
            }
        }
        Command::Optimize { sql } => {
            let schema = session.schema()?;
            let hints = suggest_optimizations(session.inspector(), &sql, schema.as_ref());
            if args.json {
                print_json(&mut out, &hints)?;
            } else if hints.is_empty() {
                writeln!(out, "No suggestions.")?;
            } else {
                for hint in hints {
                    writeln!(out, "{}", hint)?;
                }
            }
        }
        Command::Challenge { difficulty } => {
            let challenge = session.generate_challenge(&difficulty)?;
            if args.json {
                print_json(&mut out, &challenge)?;
            } else {
                write!(out, "{}", challenge.render())?;
            }
        }
        Command::Practice { difficulty } => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            practice::run(&session, &difficulty, &mut input, &mut out)?;
        }
    }

    Ok(())
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn log_filter(config: &CoreConfig) -> &str {
    if config.debug_mode {
        "debug"
    } else {
        &config.log_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let args = Args::try_parse_from(["sql-coach", "--schema", "shop.yaml", "--seed", "3", "challenge", "advanced"]).unwrap();

        assert_eq!(args.schema, Some(PathBuf::from("shop.yaml")));
        assert_eq!(args.seed, Some(3));
        assert!(matches!(args.command, Command::Challenge { difficulty } if difficulty == "advanced"));

        let args = Args::try_parse_from(["sql-coach", "practice"]).unwrap();
        assert!(matches!(args.command, Command::Practice { difficulty } if difficulty == "beginner"));

        let args = Args::try_parse_from(["sql-coach", "--json", "analyze", "SELECT 1"]).unwrap();
        assert!(args.json);
        assert!(matches!(args.command, Command::Analyze { sql } if sql == "SELECT 1"));
    }

    #[test]
    fn test_demo_schema_supports_every_tier() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../demos/shop.yaml");
        let schema = Schema::from_file(&path).unwrap();
        assert_eq!(schema.table_count(), 4);

        let session = ChallengeSession::new(Arc::new(schema), &CoreConfig::testing());
        for difficulty in ["beginner", "intermediate", "advanced"] {
            let challenge = session.generate_challenge(difficulty).unwrap();
            assert!(challenge.sample_data.is_some());
        }
    }

    #[test]
    fn test_log_filter() {
        let mut config = CoreConfig::default();
        assert_eq!(log_filter(&config), "info");

        config.debug_mode = true;
        assert_eq!(log_filter(&config), "debug");
    }
}
