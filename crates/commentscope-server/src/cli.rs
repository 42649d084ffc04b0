//! Command-line interface

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "commentscope-server")]
#[command(about = "CommentScope comment sentiment and topic analysis", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,

    /// Sentiment model to try (HuggingFace repo id); repeat for fallbacks.
    /// Replaces the configured model list.
    #[arg(
        short,
        long = "model",
        global = true,
        env = "COMMENTSCOPE_MODELS",
        value_delimiter = ','
    )]
    pub models: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP analysis service
    Serve(ServeArgs),

    /// Analyze a JSON file of comments and print the result
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input file: an array of comments or an object with a `comments` field
    #[arg(short, long)]
    pub input: PathBuf,

    /// Post URL echoed into the result
    #[arg(long)]
    pub post_url: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}
