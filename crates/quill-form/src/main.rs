//! # Quill Form
//!
//! Terminal front end: read text, pass the CAPTCHA, paraphrase through the relay.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use quill_common::constants::DEFAULT_RELAY_URL;
use quill_common::{Language, LengthPreference, Tone};
use quill_form::{FormController, HttpRelayClient, Submission};

/// Quill Form - paraphrase text through a Quill relay
#[derive(Parser, Debug)]
#[command(name = "quill-form")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay base URL
    #[arg(long, env = "QUILL_RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    relay_url: String,

    /// professional, casual, academic, or creative
    #[arg(long, default_value_t = Tone::default())]
    tone: Tone,

    /// Target language code: en, es, fr
    #[arg(long, default_value_t = Language::default())]
    language: Language,

    /// shorter, similar, or longer
    #[arg(long, default_value_t = LengthPreference::default())]
    length: LengthPreference,

    /// Text to paraphrase
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the text from a file (stdin when neither is given)
    #[arg(long)]
    file: Option<PathBuf>,

    /// CAPTCHA attempts before giving up
    #[arg(long, default_value = "3")]
    attempts: u32,

    /// Request timeout in seconds (0 disables)
    #[arg(long, default_value = "130")]
    timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_logging(&args.log_level)?;

    let text = read_text(&args)?;

    let mut form = FormController::new();
    form.set_input(text);
    form.set_tone(args.tone);
    form.set_language(args.language);
    form.set_length(args.length);
    if let Some(banner) = form.error() {
        bail!("{banner}");
    }

    solve_captcha(&mut form, args.attempts)?;

    let timeout = (args.timeout > 0).then(|| Duration::from_secs(args.timeout));
    let relay = HttpRelayClient::new(&args.relay_url, timeout)?;
    tracing::info!(endpoint = relay.endpoint(), "Submitting paraphrase");

    match form.submit(&relay).await {
        Submission::Paraphrased(text) => {
            println!("{text}");
            eprintln!("{} words", form.output_words());
            Ok(())
        }
        Submission::Blocked(reason) | Submission::Failed(reason) => bail!("{reason}"),
    }
}

fn read_text(args: &Args) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read text from stdin")?;
    Ok(text)
}

/// The controlling terminal, or stdin when there is none
fn terminal() -> Box<dyn BufRead> {
    match std::fs::File::open("/dev/tty") {
        Ok(tty) => Box::new(BufReader::new(tty)),
        Err(_) => Box::new(BufReader::new(std::io::stdin())),
    }
}

fn solve_captcha(form: &mut FormController, attempts: u32) -> Result<()> {
    let mut input = terminal();
    let mut remaining = attempts;

    while remaining > 0 {
        eprint!("CAPTCHA: {}  (type it, or 'r' for a new one): ", form.captcha().code());
        std::io::stderr().flush().ok();

        let mut line = String::new();
        if input.read_line(&mut line).context("Failed to read CAPTCHA entry")? == 0 {
            bail!("No CAPTCHA entry");
        }

        let entry = line.trim();
        if entry.eq_ignore_ascii_case("r") {
            form.refresh_captcha();
            continue;
        }

        match form.enter_captcha(entry) {
            Some(true) => return Ok(()),
            Some(false) => {
                remaining -= 1;
                eprintln!("Incorrect, {remaining} attempt(s) left");
            }
            None => {}
        }
    }

    bail!("Please complete the CAPTCHA verification")
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    Ok(())
}
