use anyhow::Result;
use clap::{Parser, Subcommand};
use solrkit_core::{compile_with, CompileOptions, QuerySpec};
use tracing::Level;

#[derive(Parser)]
#[command(name = "solrkit")]
#[command(about="Solr query-parameter compiler", long_about=None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Compile a JSON QuerySpec into wire parameters.
    Compile {
        /// Path to the spec file, or "-" for stdin.
        input: String,
        /// Print flat key=value lines instead of JSON.
        #[arg(long)]
        wire: bool,
        /// Keep untagged KNN filters on fq instead of the implicit
        /// candidate pre-filter.
        #[arg(long)]
        no_implicit_pre_filter: bool,
    },
}

fn read_spec(path: &str) -> Result<QuerySpec> {
    let text = if path == "-" {
        let mut s = String::new();
        use std::io::Read;
        std::io::stdin().read_to_string(&mut s)?;
        s
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter("info")
        .init();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Compile {
            input,
            wire,
            no_implicit_pre_filter,
        } => {
            let spec = read_spec(&input)?;
            let opts = CompileOptions {
                implicit_pre_filter: !no_implicit_pre_filter,
            };
            let map = compile_with(&spec, &opts)?;
            if wire {
                for (key, value) in map.to_pairs() {
                    println!("{}={}", key, value);
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&map)?);
            }
        }
    }
    Ok(())
}
