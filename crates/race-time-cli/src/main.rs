use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use race_time::{
    duration_to_input, format_duration, instant_to_duration, parse_instant, parse_race_time,
};

#[derive(Parser)]
#[command(name = "race-time")]
#[command(about = "Parse and format race-relative times")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a time expression against the race start
    Parse {
        /// Expression such as "33", "33:30", "Day 2 08:00", "Fri 14:00", "30/8 14:00"
        input: String,

        /// Race start (e.g. 2024-04-13T06:00)
        #[arg(long, env = "RACE_START")]
        start: String,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a duration in minutes as display text and editable input
    Format {
        /// Elapsed minutes
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Minutes elapsed from the race start to an instant
    Elapsed {
        /// The instant to measure to (e.g. 2024-04-14T08:00)
        instant: String,

        /// Race start (e.g. 2024-04-13T06:00)
        #[arg(long, env = "RACE_START")]
        start: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Parse { input, start, json } => {
            let start = read_instant(&start, "race start")?;
            run_parse(&input, start, json)
        }
        Commands::Format { minutes } => {
            println!("{}", format_duration(minutes));
            println!("{}", duration_to_input(minutes));
            Ok(())
        }
        Commands::Elapsed { instant, start } => {
            let start = read_instant(&start, "race start")?;
            let instant = read_instant(&instant, "instant")?;
            let minutes = instant_to_duration(instant, start);
            println!("{minutes}");
            println!("{}", format_duration(minutes));
            Ok(())
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("invalid log level '{level}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn read_instant(text: &str, what: &str) -> Result<NaiveDateTime> {
    parse_instant(text).with_context(|| format!("failed to read {what}"))
}

fn run_parse(input: &str, start: NaiveDateTime, json: bool) -> Result<()> {
    let parsed = parse_race_time(input, start);

    if json {
        let out = serde_json::to_string_pretty(&parsed).context("failed to serialize result")?;
        println!("{out}");
        parsed.into_result()?;
        return Ok(());
    }

    let parsed = parsed.into_result()?;
    tracing::info!(grammar = %parsed.matched_grammar(), "parsed");

    // Valid results always carry both displays and the minutes
    let (Some(minutes), Some(duration), Some(instant)) = (
        parsed.duration_minutes(),
        parsed.display_duration(),
        parsed.display_instant(),
    ) else {
        bail!("incomplete result for '{input}'");
    };

    println!("grammar:  {}", parsed.matched_grammar());
    println!("kind:     {:?}", parsed.kind());
    println!("minutes:  {minutes}");
    println!("duration: {duration}");
    println!("instant:  {instant}");
    Ok(())
}
