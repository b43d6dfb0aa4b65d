#![forbid(unsafe_code)]

//! samlvakt CLI: validate SAML responses and print SP metadata.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use samlvakt::{AssertionDocument, Error, TrustSettings, ValidationOutcome, ValidationPipeline};
use samlvakt_c14n::C14nMode;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "samlvakt",
    about = "samlvakt: SAML 2.0 response validation (XML-DSig, C14N, assertion policy)",
    version
)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a SAML response
    Validate {
        /// Response file (XML, or base64 with --base64)
        file: PathBuf,

        /// Trust settings (YAML)
        #[arg(short, long)]
        settings: PathBuf,

        /// Validation instant, RFC 3339 (default: now)
        #[arg(long)]
        now: Option<String>,

        /// Input is a base64 HTTP-POST `SAMLResponse` value
        #[arg(long)]
        base64: bool,
    },

    /// Print service-provider metadata
    Metadata {
        /// Trust settings (YAML)
        #[arg(short, long)]
        settings: PathBuf,

        /// Generation instant, RFC 3339 (default: now)
        #[arg(long)]
        now: Option<String>,
    },

    /// List supported algorithms
    Info,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Validate {
            file,
            settings,
            now,
            base64,
        } => cmd_validate(&file, &settings, now.as_deref(), base64),
        Commands::Metadata { settings, now } => cmd_metadata(&settings, now.as_deref()),
        Commands::Info => cmd_info(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_validate(
    file: &Path,
    settings_path: &Path,
    now: Option<&str>,
    base64: bool,
) -> Result<(), Error> {
    let now = parse_now(now)?;
    let settings = TrustSettings::load(settings_path)?;
    let pipeline = ValidationPipeline::new(&settings)?;

    let data = std::fs::read(file)?;
    let document = if base64 {
        let text = std::str::from_utf8(&data)
            .map_err(|e| Error::Base64(format!("{}: {e}", file.display())))?;
        AssertionDocument::parse_bytes(&samlvakt_keys::loader::decode_base64(text)?)?
    } else {
        AssertionDocument::parse_bytes(&data)?
    };

    tracing::debug!(file = %file.display(), now = %now.to_rfc3339(), "validating");
    let outcome = pipeline.validate(&document, now);
    match outcome {
        ValidationOutcome::Valid => {
            println!("{outcome}");
            Ok(())
        }
        ValidationOutcome::Invalid { .. } => {
            eprintln!("{outcome}");
            process::exit(1);
        }
    }
}

fn cmd_metadata(settings_path: &Path, now: Option<&str>) -> Result<(), Error> {
    let now = parse_now(now)?;
    let settings = TrustSettings::load(settings_path)?;
    print!("{}", samlvakt_saml::metadata::sp_metadata(&settings, now));
    Ok(())
}

fn cmd_info() -> Result<(), Error> {
    println!("samlvakt: SAML 2.0 response validation");
    println!();
    println!("Supported canonicalization:");
    for mode in [
        C14nMode::Inclusive,
        C14nMode::InclusiveWithComments,
        C14nMode::Exclusive,
        C14nMode::ExclusiveWithComments,
    ] {
        println!("  {}", mode.uri());
    }
    println!();
    println!("Supported digest algorithms:");
    for uri in samlvakt_crypto::digest::supported_uris() {
        println!("  {uri}");
    }
    println!();
    println!("Supported signature algorithms:");
    for uri in samlvakt_crypto::verify::supported_uris() {
        println!("  {uri}");
    }
    println!();
    println!("Supported transforms:");
    println!("  {}", samlvakt_core::algorithm::ENVELOPED_SIGNATURE);
    println!("  (and the canonicalization methods above)");
    println!();
    println!("Supported key formats:");
    println!("  X.509 certificate (PEM, DER, bare base64)");
    println!("  SubjectPublicKeyInfo, PKCS#1 RSA public key");
    Ok(())
}

// ── Utility functions ────────────────────────────────────────────────

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>, Error> {
    match now {
        None => Ok(Utc::now()),
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Config(format!("--now {text}: {e}"))),
    }
}
