//! Runs an AVL tree command script.
//!
//! # Usage
//!
//! ```bash
//! # Trace to stdout, search results to ./output.txt
//! avl-script commands.txt
//!
//! # Custom results path, plus a Graphviz dump of the final tree
//! avl-script commands.txt --output results.txt --dot tree.dot
//! ```

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};

use avl_backtrace::script::{Interpreter, ScriptError, Summary};
use clap::Parser;
use thiserror::Error;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Executes Initialize/Insert/Delete/Search commands against an AVL tree
#[derive(Parser, Debug)]
#[command(name = "avl-script")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the command script
    input: PathBuf,

    /// File receiving one line per Search command
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,

    /// Write a Graphviz rendering of the final tree to this path
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Failures that end the run with a non-zero exit status.
#[derive(Debug, Error)]
enum Fatal {
    #[error("failed to open script {path:?}: {source}")]
    OpenInput { path: PathBuf, source: io::Error },

    #[error("failed to create results file {path:?}: {source}")]
    CreateOutput { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("failed to render tree")]
    Render,

    #[error("failed to write {path:?}: {source}")]
    WriteDot { path: PathBuf, source: io::Error },

    #[error("failed to write to console: {0}")]
    Console(io::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // Logs go to stderr; stdout carries the command trace.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {e}");
    }

    let stdout = io::stdout();
    match run(&args, stdout.lock()) {
        Ok(summary) => {
            info!(
                executed = summary.executed,
                skipped = summary.skipped,
                "script finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run<C: Write>(args: &Args, console: C) -> Result<Summary, Fatal> {
    let input = File::open(&args.input)
        .map(BufReader::new)
        .map_err(|source| Fatal::OpenInput {
            path: args.input.clone(),
            source,
        })?;

    let results = File::create(&args.output)
        .map(BufWriter::new)
        .map_err(|source| Fatal::CreateOutput {
            path: args.output.clone(),
            source,
        })?;

    info!("Running script {:?}, results to {:?}", args.input, args.output);

    let mut interpreter = Interpreter::new(console, results);
    let summary = interpreter.run(input)?;

    let (tree, mut console, _) = interpreter.into_parts();

    if let Some(path) = &args.dot {
        let mut graph = String::new();
        tree.dotgraph("tree", &mut graph)
            .map_err(|_| Fatal::Render)?;

        fs::write(path, graph).map_err(|source| Fatal::WriteDot {
            path: path.clone(),
            source,
        })?;
    }

    writeln!(
        console,
        "Done! Please check {} for results.",
        args.output.display()
    )
    .map_err(Fatal::Console)?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::{ffi::OsStr, path::Path};

    use super::*;

    // A fresh directory under the system temp dir, unique to this test.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("avl-script-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn args(input: &Path, output: &Path) -> Args {
        Args::try_parse_from([
            OsStr::new("avl-script"),
            input.as_os_str(),
            OsStr::new("--output"),
            output.as_os_str(),
        ])
        .unwrap()
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = scratch("missing-input");
        let args = args(&dir.join("nope.txt"), &dir.join("output.txt"));

        let err = run(&args, Vec::new()).unwrap_err();
        assert!(matches!(err, Fatal::OpenInput { .. }), "{err}");
    }

    #[test]
    fn unwritable_output_is_fatal() {
        let dir = scratch("unwritable-output");
        let input = dir.join("script.txt");
        fs::write(&input, "Insert(1)\n").unwrap();

        let args = args(&input, &dir.join("no-such-dir").join("output.txt"));

        let err = run(&args, Vec::new()).unwrap_err();
        assert!(matches!(err, Fatal::CreateOutput { .. }), "{err}");
    }

    #[test]
    fn writes_results_and_dot_file() {
        let dir = scratch("happy-path");
        let input = dir.join("script.txt");
        let output = dir.join("output.txt");
        let dot = dir.join("tree.dot");
        fs::write(&input, "Initialize()\nInsert(2)\nInsert(1)\nSearch(1)\nBogus(3)\n").unwrap();

        let mut args = args(&input, &output);
        args.dot = Some(dot.clone());

        let summary = run(&args, Vec::new()).unwrap();
        assert_eq!(summary.executed, 4);
        assert_eq!(summary.skipped, 1);

        assert_eq!(fs::read_to_string(&output).unwrap(), "1\n");
        assert!(fs::read_to_string(&dot).unwrap().starts_with("digraph \"graph-tree\""));

        fs::remove_dir_all(&dir).unwrap();
    }
}
