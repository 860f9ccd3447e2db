use std::io::Read;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::debug;

use errkit::logging::{init_logging, LoggingConfig};
use errkit::{join, Attr, Classifier, ErrKind, ErrorX, Leaf, Settings};

/// Output format for the classified error
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Rendered single line
    #[default]
    Text,
    /// Structured JSON object
    Json,
    /// One leaf per line
    Leaves,
}

#[derive(Parser, Debug)]
#[command(name = "errkit")]
#[command(version)]
#[command(about = "Reconstruct and classify joined or wrapped error messages")]
struct Cli {
    /// Error messages to classify; read from stdin when omitted.
    /// Several messages are classified together as one joined error.
    messages: Vec<String>,

    /// Kind to attach (e.g. network-temporary-error)
    #[arg(long, short)]
    kind: Option<ErrKind>,

    /// Attribute to attach, as key=value (repeatable)
    #[arg(long = "attr", short, value_name = "KEY=VALUE", value_parser = parse_attr)]
    attrs: Vec<Attr>,

    /// Infer the kind from the messages when none is given
    #[arg(long)]
    detect: bool,

    /// Output format
    #[arg(long, short, default_value = "text", value_enum)]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_attr(s: &str) -> Result<Attr, String> {
    Attr::parse_pair(s).ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
}

/// Exit codes
mod exit_codes {
    use std::process::ExitCode;

    /// Invalid input or environment
    pub fn usage() -> ExitCode {
        ExitCode::from(2)
    }

    /// Output could not be produced
    pub fn failed() -> ExitCode {
        ExitCode::from(1)
    }
}

fn read_messages(cli: &Cli) -> std::io::Result<Vec<String>> {
    if !cli.messages.is_empty() {
        return Ok(cli.messages.clone());
    }
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(vec![input])
}

fn classify(classifier: &Classifier, messages: Vec<String>) -> ErrorX {
    if let [single] = messages.as_slice() {
        return classifier.classify(&Leaf::new(single.as_str()));
    }
    classifier.classify(&join(messages.into_iter().map(Leaf::new)))
}

fn render(x: &ErrorX, format: OutputFormat) -> Result<String, serde_json::Error> {
    Ok(match format {
        OutputFormat::Text => x.to_string(),
        OutputFormat::Json => x.to_json()?,
        OutputFormat::Leaves => x
            .errors()
            .iter()
            .map(|leaf| leaf.message())
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(LoggingConfig::from_verbosity(cli.verbose));

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_codes::usage();
        }
    };
    debug!(?settings, "loaded settings");
    let classifier = Classifier::new(settings);

    let messages = match read_messages(&cli) {
        Ok(messages) => messages,
        Err(e) => {
            eprintln!("error: failed to read stdin: {e}");
            return exit_codes::usage();
        }
    };

    if messages.iter().all(|m| m.trim().is_empty()) {
        eprintln!("error: no error message given");
        return exit_codes::usage();
    }
    let mut x = classify(&classifier, messages);

    if let Some(kind) = cli.kind {
        x.set_kind(kind);
    } else if cli.detect {
        let detected = classifier.detector().detect(&x);
        if detected != ErrKind::Unknown {
            x.set_kind(detected);
        }
    }
    x.set_attrs(cli.attrs.iter().cloned());

    match render(&x, cli.format) {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            exit_codes::failed()
        }
    }
}
