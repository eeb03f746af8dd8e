//! `x-quote` command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use x_quote::{QuotePoster, Result, TweetUrl};

/// Quote a tweet on X through a local Chrome.
///
/// Without --submit the quote is composed and left open for review.
#[derive(Debug, Parser)]
#[command(name = "x-quote", version, about)]
struct Cli {
    /// Tweet URL followed by the quote text, in any order.
    #[arg(value_name = "TWEET_URL | TEXT")]
    args: Vec<String>,

    /// Post the quote instead of only previewing it.
    #[arg(long)]
    submit: bool,

    /// Chrome profile directory.
    #[arg(long, value_name = "DIR")]
    profile: Option<PathBuf>,

    /// Verbose logging.
    #[arg(long)]
    debug: bool,
}

/// Flags that take a separate value.
const VALUE_FLAGS: &[&str] = &["--profile"];

/// Flags the parser knows, besides [`VALUE_FLAGS`].
const KNOWN_FLAGS: &[&str] = &["--submit", "--debug", "--help", "-h", "--version", "-V"];

/// Drops unknown dash-prefixed arguments such as a stray `-5%` in the
/// comment, so they neither abort parsing nor end up in the text.
fn retain_known_args(argv: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut kept = Vec::new();
    let mut expecting_value = false;
    for (index, arg) in argv.into_iter().enumerate() {
        let keep = index == 0
            || expecting_value
            || !arg.starts_with('-')
            || KNOWN_FLAGS.contains(&arg.as_str())
            || VALUE_FLAGS
                .iter()
                .any(|flag| arg == *flag || arg.starts_with(&format!("{flag}=")));
        expecting_value = !expecting_value && VALUE_FLAGS.contains(&arg.as_str());
        if keep {
            kept.push(arg);
        }
    }
    kept
}

/// Splits positional arguments into the tweet URL and the comment.
///
/// The first argument that looks like a tweet URL is the tweet; all other
/// arguments are joined with spaces into the comment.
fn split_args(args: &[String]) -> (Option<&str>, String) {
    let mut tweet = None;
    let mut words = Vec::new();
    for arg in args {
        if tweet.is_none() && TweetUrl::matches(arg) {
            tweet = Some(arg.as_str());
        } else {
            words.push(arg.as_str());
        }
    }
    (tweet, words.join(" "))
}

fn init_logging(debug: bool) {
    let default = if debug { "x_quote=debug" } else { "x_quote=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let (tweet, comment) = split_args(&cli.args);
    let tweet = tweet.ok_or_else(|| x_quote::Error::config("Please provide a tweet URL"))?;

    let mut builder = QuotePoster::builder()
        .tweet_url(tweet)
        .comment(comment)
        .submit(cli.submit);
    if let Some(profile) = cli.profile {
        builder = builder.profile_dir(profile);
    }

    let outcome = builder.build()?.run().await?;
    debug!(stages = ?outcome.stages, "Run finished");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(retain_known_args(std::env::args())) {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
            let _ = e.print();
            return code;
        }
    };

    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
