//! A line-oriented command language driving an [`AvlTree`].
//!
//! Every line holds one call:
//!
//! ```text
//! Initialize()
//! Insert(21)
//! Delete(21)
//! Search(8)
//! Search(2, 40)
//! ```
//!
//! The [`Interpreter`] writes a human-readable trace of every command, including the rotations
//! and deletion cases it triggered, to a console writer. Search results alone go to a separate
//! results writer, one line per `Search` call. Lines that fail to parse are reported on the
//! console and skipped.

use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};

use thiserror::Error;

use crate::{AvlTree, DeleteCase, Key, Rotated};

/// Written for a search that found nothing.
pub const NOT_FOUND: &str = "NULL";

/// A single parsed script line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Initialize,
    Insert(Key),
    Delete(Key),
    Search(Key),
    RangeSearch(Key, Key),
}

/// Why a script line could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unrecognized command `{0}`")]
    UnknownCommand(String),

    #[error("malformed call `{0}`")]
    Malformed(String),

    #[error("`{command}` does not take {found} argument(s)")]
    Arity { command: &'static str, found: usize },

    #[error("invalid integer argument `{0}`")]
    InvalidNumber(String),
}

/// Why a script could not be run to completion.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();

        let (name, args) = match line.split_once('(') {
            Some((name, rest)) => {
                let args = rest
                    .trim_end()
                    .strip_suffix(')')
                    .ok_or_else(|| ParseError::Malformed(line.to_owned()))?;

                (name.trim_end(), args)
            }
            None => (line, ""),
        };

        let command = match name {
            "Initialize" => "Initialize",
            "Insert" => "Insert",
            "Delete" => "Delete",
            "Search" => "Search",
            _ => return Err(ParseError::UnknownCommand(name.to_owned())),
        };

        let args = parse_args(args)?;

        match (command, args.as_slice()) {
            ("Initialize", []) => Ok(Command::Initialize),
            ("Insert", &[key]) => Ok(Command::Insert(key)),
            ("Delete", &[key]) => Ok(Command::Delete(key)),
            ("Search", &[key]) => Ok(Command::Search(key)),
            ("Search", &[low, high]) => Ok(Command::RangeSearch(low, high)),
            (command, args) => Err(ParseError::Arity {
                command,
                found: args.len(),
            }),
        }
    }
}

fn parse_args(args: &str) -> Result<Vec<Key>, ParseError> {
    if args.trim().is_empty() {
        return Ok(Vec::new());
    }

    args.split(',')
        .map(|arg| {
            let arg = arg.trim();
            arg.parse()
                .map_err(|_| ParseError::InvalidNumber(arg.to_owned()))
        })
        .collect()
}

/// Counts of the lines handled by [`Interpreter::run`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub executed: usize,
    pub skipped: usize,
}

/// Executes script commands against an owned [`AvlTree`].
pub struct Interpreter<C, R> {
    tree: AvlTree,
    console: C,
    results: R,
}

impl<C, R> Interpreter<C, R>
where
    C: Write,
    R: Write,
{
    /// Creates an interpreter over an empty tree.
    pub fn new(console: C, results: R) -> Self {
        Interpreter {
            tree: AvlTree::new(),
            console,
            results,
        }
    }

    pub fn tree(&self) -> &AvlTree {
        &self.tree
    }

    pub fn into_parts(self) -> (AvlTree, C, R) {
        (self.tree, self.console, self.results)
    }

    /// Runs every line of `input`.
    ///
    /// Blank lines are ignored. Lines that fail to parse are reported on the console and counted as
    /// skipped. Only I/O failures abort the run.
    pub fn run<B: BufRead>(&mut self, input: B) -> Result<Summary, ScriptError> {
        let mut summary = Summary::default();

        for (index, line) in input.lines().enumerate() {
            let line = line.map_err(ScriptError::Read)?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(command) => {
                    self.execute(command).map_err(ScriptError::Write)?;
                    summary.executed += 1;
                }

                Err(err) => {
                    tracing::warn!(line = index + 1, %err, "skipping script line");
                    writeln!(
                        self.console,
                        "Invalid command ({err}). Moving on to next command."
                    )
                    .map_err(ScriptError::Write)?;
                    summary.skipped += 1;
                }
            }
        }

        self.console.flush().map_err(ScriptError::Write)?;
        self.results.flush().map_err(ScriptError::Write)?;

        Ok(summary)
    }

    /// Executes a single command.
    pub fn execute(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::Initialize => {
                writeln!(self.console, "Initializing AVL Tree")?;
                self.tree.clear();
            }

            Command::Insert(key) => {
                writeln!(self.console, "Inserting {key}")?;

                match self.tree.insert(key) {
                    Ok(rotations) => self.report_rotations(&rotations)?,
                    Err(miss) => {
                        tracing::debug!(%miss, "insert skipped");
                        writeln!(self.console, "DUPLICATE {key}")?;
                    }
                }
            }

            Command::Delete(key) => {
                writeln!(self.console, "Deleting {key}")?;

                match self.tree.delete(key) {
                    Ok(deletion) => {
                        writeln!(self.console, "{key}")?;

                        match deletion.case {
                            DeleteCase::Leaf => writeln!(self.console, "TRIVIAL DELETE")?,
                            DeleteCase::OneChild => writeln!(self.console, "HAS 1 CHILD")?,
                            DeleteCase::TwoChildren { successor, direct } => {
                                writeln!(self.console, "HAS 2 CHILDREN")?;
                                writeln!(self.console, "MIN IN RIGHT IS {successor}")?;
                                // Whether the successor was the right child itself.
                                let relation = if direct { "EQUAL" } else { "NOT EQUAL" };
                                writeln!(self.console, "{relation}")?;
                            }
                        }

                        self.report_rotations(&deletion.rotations)?;
                    }

                    Err(missed) => {
                        tracing::debug!(miss = %missed.miss, "delete skipped");
                        writeln!(self.console, "{key} NOT FOUND")?;
                        self.report_rotations(&missed.rotations)?;
                    }
                }
            }

            Command::Search(key) => {
                writeln!(self.console, "Searching {key}")?;

                let found = match self.tree.search(key) {
                    Ok(found) => found.to_string(),
                    Err(_) => NOT_FOUND.to_owned(),
                };

                self.record(&found)?;
            }

            Command::RangeSearch(low, high) => {
                writeln!(self.console, "Searching within range {low} and {high}")?;

                let found = if self.tree.is_empty() {
                    NOT_FOUND.to_owned()
                } else {
                    self.tree
                        .range(low, high)
                        .map(|key| key.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };

                self.record(&found)?;
            }
        }

        Ok(())
    }

    fn report_rotations(&mut self, rotations: &[Rotated]) -> io::Result<()> {
        for Rotated { rotation, pivot } in rotations {
            writeln!(self.console, "{rotation} IMBALANCE ON {pivot}")?;
        }

        Ok(())
    }

    // Search results go to both channels.
    fn record(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.console, "{line}")?;
        writeln!(self.results, "{line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(script: &str) -> (Summary, String, String) {
        let mut interpreter = Interpreter::new(Vec::new(), Vec::new());
        let summary = interpreter.run(script.as_bytes()).unwrap();
        interpreter.tree().assert_invariants();

        let (_, console, results) = interpreter.into_parts();
        (
            summary,
            String::from_utf8(console).unwrap(),
            String::from_utf8(results).unwrap(),
        )
    }

    #[test]
    fn parses_every_command() {
        assert_eq!("Initialize()".parse(), Ok(Command::Initialize));
        assert_eq!("Initialize".parse(), Ok(Command::Initialize));
        assert_eq!("Insert(21)".parse(), Ok(Command::Insert(21)));
        assert_eq!("  Delete( -4 )  ".parse(), Ok(Command::Delete(-4)));
        assert_eq!("Search(8)".parse(), Ok(Command::Search(8)));
        assert_eq!("Search(2,40)".parse(), Ok(Command::RangeSearch(2, 40)));
        assert_eq!("Search (2, 40)".parse(), Ok(Command::RangeSearch(2, 40)));
    }

    #[test]
    fn rejects_bad_lines() {
        assert_eq!(
            "Frobnicate(3)".parse::<Command>(),
            Err(ParseError::UnknownCommand("Frobnicate".to_owned()))
        );
        assert_eq!(
            "Insert(3".parse::<Command>(),
            Err(ParseError::Malformed("Insert(3".to_owned()))
        );
        assert_eq!(
            "Insert(x)".parse::<Command>(),
            Err(ParseError::InvalidNumber("x".to_owned()))
        );
        assert_eq!(
            "Insert()".parse::<Command>(),
            Err(ParseError::Arity {
                command: "Insert",
                found: 0
            })
        );
        assert_eq!(
            "Search(1, 2, 3)".parse::<Command>(),
            Err(ParseError::Arity {
                command: "Search",
                found: 3
            })
        );
        assert_eq!(
            "Initialize(1)".parse::<Command>(),
            Err(ParseError::Arity {
                command: "Initialize",
                found: 1
            })
        );
    }

    #[test]
    fn results_hold_only_searches() {
        let script = "\
Initialize()
Insert(10)
Insert(20)
Insert(30)
Search(20)
Search(25)
Search(5, 25)
Search(40, 50)
Delete(20)
Search(20)
";

        let (summary, _, results) = run(script);

        assert_eq!(
            summary,
            Summary {
                executed: 10,
                skipped: 0
            }
        );
        assert_eq!(results, "20\nNULL\n10, 20\n\nNULL\n");
    }

    #[test]
    fn console_traces_rotations_and_deletions() {
        let script = "\
Initialize()
Insert(10)
Insert(20)
Insert(30)
Insert(30)
Delete(20)
Delete(99)
";

        let (_, console, _) = run(script);

        let expected = "\
Initializing AVL Tree
Inserting 10
Inserting 20
Inserting 30
RR IMBALANCE ON 10
Inserting 30
DUPLICATE 30
Deleting 20
20
HAS 2 CHILDREN
MIN IN RIGHT IS 30
EQUAL
Deleting 99
99 NOT FOUND
";
        assert_eq!(console, expected);
    }

    #[test]
    fn console_traces_deletion_cases() {
        let script = "\
Insert(10)
Insert(5)
Insert(20)
Insert(3)
Insert(7)
Insert(15)
Insert(25)
Insert(30)
Delete(10)
Delete(3)
Delete(22)
";

        let (_, console, _) = run(script);

        let deletes = &console[console.find("Deleting 10").unwrap()..];
        let expected = "\
Deleting 10
10
HAS 2 CHILDREN
MIN IN RIGHT IS 15
NOT EQUAL
Deleting 3
3
TRIVIAL DELETE
Deleting 22
22 NOT FOUND
RR IMBALANCE ON 20
";
        assert_eq!(deletes, expected);
    }

    #[test]
    fn searches_on_an_empty_tree() {
        let (_, _, results) = run("Initialize()\nSearch(1)\nSearch(1, 5)\n");

        assert_eq!(results, "NULL\nNULL\n");
    }

    #[test]
    fn bad_lines_are_skipped() {
        let script = "\
Initialize()
Insert(1)
Explode(2)

Insert(two)
Search(1)
";

        let (summary, console, results) = run(script);

        assert_eq!(
            summary,
            Summary {
                executed: 3,
                skipped: 2
            }
        );
        assert!(console.contains(
            "Invalid command (unrecognized command `Explode`). Moving on to next command."
        ));
        assert!(console.contains(
            "Invalid command (invalid integer argument `two`). Moving on to next command."
        ));
        assert_eq!(results, "1\n");
    }

    #[test]
    fn initialize_resets_the_tree() {
        let (_, _, results) = run("Insert(1)\nInsert(2)\nInitialize()\nSearch(1)\nSearch(0, 9)\n");

        assert_eq!(results, "NULL\nNULL\n");
    }
}
