//! urlconvert CLI - convert URLs in a document into titled links

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use urlconvert::{
    apply_to_string, Command, ConvertRequest, Converter, LinkFormat, Settings, Span,
    STATUS_MESSAGE,
};

/// Link format argument
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum FormatArg {
    /// <a href="url">title</a>
    Html,
    /// [title](url)
    #[default]
    Markdown,
    /// `title <url>`_
    Rst,
    /// Path, query and fragment of the URL
    Path,
    /// Template given with --template, or the configured fallback
    Custom,
}

impl From<FormatArg> for LinkFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => LinkFormat::Html,
            FormatArg::Markdown => LinkFormat::Markdown,
            FormatArg::Rst => LinkFormat::Rst,
            FormatArg::Path => LinkFormat::Path,
            FormatArg::Custom => LinkFormat::Custom,
        }
    }
}

/// Output for the convert subcommand
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// The rewritten document
    #[default]
    Text,
    /// The computed replacements as JSON
    Json,
}

/// urlconvert - turn URLs into links titled with the page title
#[derive(Parser, Debug)]
#[command(name = "urlconvert")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Timeout for the whole title fetch, in seconds
    #[arg(long, global = true)]
    timeout: Option<f64>,

    /// Maximum number of pages fetched at once
    #[arg(long, global = true)]
    max_concurrency: Option<usize>,

    /// Custom User-Agent
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Log debug output to stderr
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert URLs in a file (or stdin) and print the result
    Convert {
        /// Input file; stdin when omitted
        file: Option<PathBuf>,

        /// Link format
        #[arg(long, short, default_value = "markdown")]
        format: FormatArg,

        /// Template for the custom format, e.g. "{title} - {url}"
        #[arg(long)]
        template: Option<String>,

        /// Byte range to treat as a selection (START..END); repeatable.
        /// Every whitespace-delimited word is a selection when omitted
        #[arg(long = "range", value_parser = parse_range)]
        ranges: Vec<Span>,

        /// Write the result back to the input file
        #[arg(long, requires = "file")]
        in_place: bool,

        /// Output format
        #[arg(long, short, default_value = "text")]
        output: OutputFormat,
    },
    /// Read a JSON conversion request from stdin and print a JSON response
    Request {
        /// Print the request JSON Schema instead
        #[arg(long)]
        schema: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = load_settings(&cli).unwrap_or_else(|e| fail(&e));
    let converter = Converter::new(settings);

    match cli.command {
        Commands::Convert {
            file,
            format,
            template,
            ranges,
            in_place,
            output,
        } => {
            let command = Command::new(format.into(), template);
            run_convert(&converter, file.as_deref(), &command, &ranges, in_place, output).await;
        }
        Commands::Request { schema } => {
            if schema {
                print_json(&Converter::input_schema());
            } else {
                run_request(&converter).await;
            }
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = if verbose > 0 { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Settings file, then command line overrides
fn load_settings(cli: &Cli) -> Result<Settings, String> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path).map_err(|e| format!("{}: {}", e, path.display()))?,
        None => Settings::default(),
    };

    if let Some(timeout) = cli.timeout {
        settings.timeout_seconds = serde_json::Value::from(timeout);
    }
    if let Some(max) = cli.max_concurrency {
        settings.max_concurrency = max;
    }
    if let Some(ref ua) = cli.user_agent {
        settings.user_agent = Some(ua.clone());
    }

    // Surface bad numbers here rather than as a silent no-op
    settings.fetch_options().map_err(|e| e.to_string())?;
    Ok(settings)
}

async fn run_convert(
    converter: &Converter,
    file: Option<&Path>,
    command: &Command,
    ranges: &[Span],
    in_place: bool,
    output: OutputFormat,
) {
    let text = read_input(file).unwrap_or_else(|e| fail(&e));

    let selections = if ranges.is_empty() {
        word_selections(&text)
    } else {
        range_selections(&text, ranges)
    };

    let conversion = converter.convert(&selections, command).await;

    if let OutputFormat::Json = output {
        print_json(&conversion);
        eprintln!("{}", STATUS_MESSAGE);
        return;
    }

    let mut document = text;
    if let Err(e) = apply_to_string(&mut document, conversion.replacements) {
        fail(&e);
    }

    match file {
        Some(path) if in_place => {
            if let Err(e) = std::fs::write(path, &document) {
                fail(&format!("Failed to write {}: {}", path.display(), e));
            }
        }
        _ => write_safe(&document),
    }
    eprintln!("{}", STATUS_MESSAGE);
}

async fn run_request(converter: &Converter) {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        fail(&format!("Failed to read stdin: {}", e));
    }

    let request: ConvertRequest = match serde_json::from_str(&input) {
        Ok(request) => request,
        Err(e) => fail(&format!("Invalid request: {}", e)),
    };

    match converter.execute(request).await {
        Ok(response) => print_json(&response),
        Err(e) => fail(&e),
    }
}

fn read_input(file: Option<&Path>) -> Result<String, String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e)),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(input)
        }
    }
}

/// Parse `START..END` into a span
fn parse_range(s: &str) -> Result<Span, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("Invalid range '{}': expected START..END", s))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("Invalid range start in '{}'", s))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| format!("Invalid range end in '{}'", s))?;
    Ok(Span::new(start, end))
}

/// Every whitespace-delimited word of `text`, with its span
fn word_selections(text: &str) -> Vec<(Span, String)> {
    let mut selections = Vec::new();
    let mut word_start = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(start) = word_start.take() {
                selections.push((Span::new(start, i), text[start..i].to_string()));
            }
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }
    if let Some(start) = word_start {
        selections.push((Span::new(start, text.len()), text[start..].to_string()));
    }

    selections
}

/// The given spans with their text; unreadable spans get empty text
fn range_selections(text: &str, ranges: &[Span]) -> Vec<(Span, String)> {
    ranges
        .iter()
        .map(|span| {
            let selected = text.get(span.start..span.end).unwrap_or_default();
            (*span, selected.to_string())
        })
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| fail(&format!("Error serializing response: {}", e)));
    write_safe(&json);
    write_safe("\n");
}

fn fail(message: &dyn std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

/// Write to stdout, exit silently on broken pipe
fn write_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = write!(handle, "{}", s).and_then(|_| handle.flush()) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
