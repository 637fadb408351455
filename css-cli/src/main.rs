//! Command-line interface for css-scanner
//! This binary dumps the token stream of a CSS file, for debugging the scanner and
//! anything built on it.
//!
//! Usage:
//!   csstok `<path>` [--format `<format>`] [--config `<file>`]   - Dump the tokens of a file
//!   csstok - [--raw] [--skip-whitespace] [--skip-comments]     - Read the source from stdin
//!
//! A `csstok.toml` in the working directory is layered over the built-in defaults when
//! present; `--config` and the flags go on top of it.
//!
//! Set `RUST_LOG=css_scanner=trace` to log every scanned token to stderr.

use clap::{Arg, ArgAction, ArgMatches, Command};
use css_config::{ConfigError, CssConfig, Loader, TokenFormat};
use css_scanner::css::lexing::ScanError;
use css_scanner::css::token::detokenize;
use css_scanner::css::{RawToken, Scanner, Token, TokenKind};
use std::io::Read;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Settings picked up from the working directory when the file exists.
const LOCAL_CONFIG: &str = "csstok.toml";

/// Install a stderr subscriber, filtered by `RUST_LOG`. Nothing is logged unless it is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

fn main() {
    init_tracing();

    let matches = Command::new("csstok")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dump the token stream of a CSS file")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the CSS file, or - for stdin")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format (default: from configuration)")
                .value_parser(["json", "text", "css"]),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Output lexemes as scanned instead of decoded values")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("skip-whitespace")
                .long("skip-whitespace")
                .help("Drop whitespace tokens (not allowed with css output)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("skip-comments")
                .long("skip-comments")
                .help("Drop comment tokens; css output joins the tokens around them as-is")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });
    if let Err(e) = check_config(&config) {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }
    tracing::debug!(
        format = ?config.output.format,
        normalize = config.output.normalize,
        "loaded configuration"
    );
    let path = matches
        .get_one::<String>("path")
        .expect("path is a required argument");
    let source = read_source(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    });

    let tokens = scan(&source, &config).unwrap_or_else(|e| {
        eprintln!("Scan error: {}", e);
        std::process::exit(1);
    });
    let formatted = format_tokens(tokens, &config).unwrap_or_else(|e| {
        eprintln!("Error formatting tokens: {}", e);
        std::process::exit(1);
    });

    print!("{}", formatted);
}

/// Layer the local config, the `--config` file and the command-line flags over the
/// defaults.
fn load_config(matches: &ArgMatches) -> Result<CssConfig, ConfigError> {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(format) = matches.get_one::<String>("format") {
        loader = loader.set_override("output.format", format.as_str())?;
    }
    if matches.get_flag("raw") {
        loader = loader.set_override("output.normalize", false)?;
    }
    if matches.get_flag("skip-whitespace") {
        loader = loader.set_override("filter.skip_whitespace", true)?;
    }
    if matches.get_flag("skip-comments") {
        loader = loader.set_override("filter.skip_comments", true)?;
    }
    loader.build()
}

/// Rejects settings whose output would not scan back the same way.
fn check_config(config: &CssConfig) -> Result<(), String> {
    if config.output.format == TokenFormat::Css && config.filter.skip_whitespace {
        return Err("css output can not skip whitespace: adjacent tokens would run together".into());
    }
    Ok(())
}

fn read_source(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Scanned tokens, in the form the output asks for.
enum Tokens {
    Raw(Vec<RawToken>),
    Normalized(Vec<Token>),
}

fn scan(source: &str, config: &CssConfig) -> Result<Tokens, ScanError> {
    let keep = |kind: TokenKind| {
        !((config.filter.skip_whitespace && kind == TokenKind::Whitespace)
            || (config.filter.skip_comments && kind == TokenKind::Comment))
    };

    let mut raw = Vec::new();
    for scanned in Scanner::new(source) {
        let token = scanned?;
        if keep(token.kind) {
            raw.push(token);
        }
    }

    if config.output.normalize {
        Ok(Tokens::Normalized(
            raw.into_iter().map(RawToken::normalize).collect(),
        ))
    } else {
        Ok(Tokens::Raw(raw))
    }
}

fn format_tokens(tokens: Tokens, config: &CssConfig) -> Result<String, String> {
    match (config.output.format, tokens) {
        (TokenFormat::Json, Tokens::Raw(tokens)) => to_json(&tokens),
        (TokenFormat::Json, Tokens::Normalized(tokens)) => to_json(&tokens),
        (TokenFormat::Text, Tokens::Raw(tokens)) => Ok(to_lines(&tokens)),
        (TokenFormat::Text, Tokens::Normalized(tokens)) => Ok(to_lines(&tokens)),
        // Lexemes are the source text already.
        (TokenFormat::Css, Tokens::Raw(tokens)) => {
            Ok(tokens.iter().map(|t| t.lexeme.as_str()).collect())
        }
        (TokenFormat::Css, Tokens::Normalized(tokens)) => {
            detokenize(&tokens).map_err(|e| e.to_string())
        }
    }
}

fn to_json<T: serde::Serialize>(tokens: &[T]) -> Result<String, String> {
    serde_json::to_string_pretty(tokens)
        .map(|json| json + "\n")
        .map_err(|e| e.to_string())
}

fn to_lines<T: std::fmt::Display>(tokens: &[T]) -> String {
    tokens.iter().map(|t| format!("{}\n", t)).collect()
}
