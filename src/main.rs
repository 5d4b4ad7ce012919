use clap::{Parser as ClapParser, Subcommand};
use eql_front::cli::{self, CheckOptions, CliError};
use eql_front::config::EqlConfig;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "eql")]
#[command(about = "EQL - parse, validate and normalize Event Query Language queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a query and print it back normalized
    Check {
        /// The EQL query (reads from stdin if not provided)
        query: Option<String>,

        /// One term and one pipe per line, or indented JSON
        #[arg(short, long)]
        pretty: bool,

        /// Print the AST as JSON
        #[arg(long)]
        json: bool,

        /// Parse a standalone expression instead of a statement
        #[arg(short, long)]
        expression: bool,

        /// TOML file with parser settings
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the token stream of a query
    Tokens {
        /// The EQL query (reads from stdin if not provided)
        query: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            query,
            pretty,
            json,
            expression,
            config,
        } => run_check(query, pretty, json, expression, config),
        Commands::Tokens { query } => run_tokens(query),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_query(query: Option<String>) -> Result<String, CliError> {
    match query {
        Some(q) => Ok(q),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoQuery),
    }
}

fn run_check(
    query: Option<String>,
    pretty: bool,
    json: bool,
    expression: bool,
    config: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = match config {
        Some(path) => EqlConfig::load(path)?,
        None => EqlConfig::default(),
    };

    let options = CheckOptions {
        query: read_query(query)?,
        pretty,
        json,
        expression,
        parser: config.parser,
    };

    let result = cli::execute_check(&options)?;
    println!("{}", result.render(&options)?);
    Ok(())
}

fn run_tokens(query: Option<String>) -> Result<(), CliError> {
    let query = read_query(query)?;
    let tokens = cli::execute_tokens(&query)?;
    println!("{}", cli::render_tokens(&tokens));
    Ok(())
}
