//! The `mdhtml` binary.

use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mdhtml::nodes::AstNode;
use mdhtml::{format_html, try_parse_document, Arena, Options};

const EXIT_PARSE_CONFIG: i32 = 2;
const EXIT_READ_INPUT: i32 = 3;
const EXIT_LIMIT_EXCEEDED: i32 = 4;
const EXIT_WRITE_OUTPUT: i32 = 5;

#[derive(Debug, Parser)]
#[command(about, author, version)]
#[command(
    after_help = "By default, mdhtml reads command-line options from the config file given by --config-file.  Pass --config-file none to disable this.  It is not an error if the file does not exist."
)]
struct Cli {
    /// Markdown file(s) to convert; or standard input if none passed
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to a config file of command-line arguments, or 'none'
    #[arg(short, long, value_name = "PATH", default_value = default_config_path())]
    config_file: String,

    /// Enable every GFM extension
    #[arg(long)]
    gfm: bool,

    /// Specify extension name(s) to use
    ///
    /// Multiple extensions can be delimited with ",", e.g. --extension table,strikethrough
    #[arg(short, long = "extension", value_name = "EXTENSION", value_delimiter = ',')]
    extensions: Vec<Extension>,

    /// Treat newlines as hard line breaks
    #[arg(long)]
    hardbreaks: bool,

    /// Use GitHub-style <pre lang> for code blocks
    #[arg(long)]
    github_pre_lang: bool,

    /// Escape raw HTML instead of passing it through
    #[arg(long)]
    escape: bool,

    /// Annotate block elements with their source positions
    #[arg(long)]
    sourcepos: bool,

    /// Default value for fenced code block's info strings if none is given
    #[arg(long, value_name = "INFO")]
    default_info_string: Option<String>,

    /// Refuse inputs longer than this many bytes
    #[arg(long, value_name = "BYTES")]
    max_input_size: Option<usize>,

    /// Refuse documents nested deeper than this
    #[arg(long, value_name = "DEPTH")]
    max_nesting_depth: Option<usize>,

    /// Write the output to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log parser progress to stderr; RUST_LOG takes precedence
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Extension {
    Table,
    Strikethrough,
    Tasklist,
    Tagfilter,
}

fn main() {
    let cli = cli_with_config();

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if cli.verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let options = options_from(&cli);
    debug!(?options, "resolved options");

    let input = match read_input(&cli.files) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("failed to read input: {}", err);
            process::exit(EXIT_READ_INPUT);
        }
    };

    let arena = Arena::new();
    let root = match try_parse_document(&arena, &input, &options) {
        Ok(root) => root,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(EXIT_LIMIT_EXCEEDED);
        }
    };

    if let Err(err) = write_output(root, &options, cli.output.as_deref()) {
        match cli.output {
            Some(ref path) => eprintln!("failed to write {}: {}", path.display(), err),
            None => eprintln!("failed to write output: {}", err),
        }
        process::exit(EXIT_WRITE_OUTPUT);
    }
}

fn write_output<'a>(
    root: &'a AstNode<'a>,
    options: &Options,
    output: Option<&Path>,
) -> io::Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(fs::File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    fmt2io::write(&mut writer, |w| format_html(root, options, w))?;
    writer.flush()
}

fn options_from(cli: &Cli) -> Options {
    let mut options = if cli.gfm {
        Options::gfm()
    } else {
        Options::default()
    };

    for extension in &cli.extensions {
        match extension {
            Extension::Table => options.extension.table = true,
            Extension::Strikethrough => options.extension.strikethrough = true,
            Extension::Tasklist => options.extension.tasklist = true,
            Extension::Tagfilter => options.extension.tagfilter = true,
        }
    }

    options.parse.default_info_string = cli.default_info_string.clone();
    options.parse.limits.max_input_size = cli.max_input_size;
    options.parse.limits.max_nesting_depth = cli.max_nesting_depth;

    options.render.hardbreaks = cli.hardbreaks;
    options.render.github_pre_lang = cli.github_pre_lang;
    options.render.escape = cli.escape;
    options.render.sourcepos = cli.sourcepos;

    options
}

fn read_input(files: &[PathBuf]) -> Result<String, Box<dyn Error>> {
    let mut s: Vec<u8> = Vec::with_capacity(2048);

    if files.is_empty() {
        io::stdin().read_to_end(&mut s)?;
    } else {
        for file in files {
            let mut f = fs::File::open(file)
                .map_err(|err| format!("{}: {}", file.display(), err))?;
            f.read_to_end(&mut s)?;
        }
    }

    Ok(String::from_utf8(s)?)
}

// Arguments from the config file go first, so the command line overrides
// them.
fn cli_with_config() -> Cli {
    let cli = Cli::parse();
    if cli.config_file == "none" {
        return cli;
    }

    let Ok(config) = fs::read_to_string(&cli.config_file) else {
        return cli;
    };

    let config_args = match shell_words::split(&config) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("failed to parse {}: {}", cli.config_file, err);
            process::exit(EXIT_PARSE_CONFIG);
        }
    };

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "mdhtml".into());
    Cli::parse_from(std::iter::once(program).chain(config_args).chain(args))
}

#[cfg(all(not(windows), not(target_arch = "wasm32")))]
fn default_config_path() -> String {
    if let Ok(xdg_dirs) = xdg::BaseDirectories::with_prefix("mdhtml") {
        if let Some(path) = xdg_dirs.get_config_file("config").to_str() {
            return path.into();
        }
    }

    "mdhtml.config".into()
}

#[cfg(any(windows, target_arch = "wasm32"))]
fn default_config_path() -> String {
    "mdhtml.config".into()
}
