// src/main.rs
//
// reformaliquid: format HTML mixed with Liquid templates.
//
// - Line breaks are only added or removed where whitespace is not
//   significant, as decided by each element's CSS display.
// - `<!-- display: ... -->` before a node overrides its display.
// - `<!-- prettier-ignore -->` or `{% # prettier-ignore %}` keeps the next
//   node exactly as written.
// - Raw text (script, style, pre, textarea, `{% raw %}`, `{% comment %}`) is
//   copied verbatim.
//
// CLI flags:
//   --print-width N              : target line width (default 80)
//   --indent-width N             : spaces per indentation level (default 2)
//   --use-tabs                   : indent with tabs
//   --whitespace-sensitivity M   : css | strict | ignore (default css)
//   --check                      : report whether the file is formatted, write nothing
//
// Set RUST_LOG=reformaliquid=debug (or trace) for diagnostics on stderr.

use clap::{ArgAction, Parser};
use log::{debug, error, warn};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use reformaliquid::{format, FormatOptions, WhitespaceSensitivity};

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Target line width
    #[arg(long, default_value_t = 80)]
    print_width: usize,

    /// Spaces per indentation level
    #[arg(long, default_value_t = 2)]
    indent_width: usize,

    /// Indent with tabs instead of spaces
    #[arg(long, action = ArgAction::SetTrue)]
    use_tabs: bool,

    /// How much whitespace is significant: css, strict or ignore
    #[arg(long, default_value = "css", value_parser = WhitespaceSensitivity::from_str)]
    whitespace_sensitivity: WhitespaceSensitivity,

    /// Exit with status 1 when the input is not formatted; write nothing
    #[arg(long, action = ArgAction::SetTrue)]
    check: bool,

    /// Input file
    input: PathBuf,

    /// Output file (default: overwrite input)
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let src = match fs::read_to_string(&cli.input) {
        Ok(src) => src,
        Err(err) => {
            error!("{}: {err}", cli.input.display());
            return ExitCode::from(2);
        }
    };

    let options = FormatOptions {
        print_width: cli.print_width,
        indent_width: cli.indent_width,
        use_tabs: cli.use_tabs,
        whitespace_sensitivity: cli.whitespace_sensitivity,
    };

    let out = match format(&src, &options) {
        Ok(out) => out,
        Err(err) => {
            error!("{}: {err}", cli.input.display());
            return ExitCode::from(2);
        }
    };

    if cli.check {
        if out == src {
            debug!("{} is formatted", cli.input.display());
            return ExitCode::SUCCESS;
        }
        warn!("{} is not formatted", cli.input.display());
        return ExitCode::FAILURE;
    }

    let out_path = cli.output.as_ref().unwrap_or(&cli.input);
    if let Err(err) = fs::write(out_path, out) {
        error!("{}: {err}", out_path.display());
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}
