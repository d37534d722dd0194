//! Interactive explorer for the Yul IR optimizer: parse an object, apply
//! one optimizer step at a time (or a scripted sequence) and watch how the
//! program changes.

use clap::{CommandFactory, Parser as ClapParser};
use itertools::Itertools;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;
use std::io::Read;
use std::process;

use yulopt::ast::{Block, Object, ObjectMember};
use yulopt::optimizer::{
    Disambiguator, OptimizerContext, OptimizerError, OptimizerSuite, StackCompressor,
    VarNameCleaner,
};
use yulopt::{analysis, parser, Dialect, Printer};

const SEPARATOR: &str = "----------------------";
const BANNER_COLUMNS: usize = 4;

#[derive(ClapParser)]
#[command(name = "yulopt", version, about = "Yul optimizer exploration tool")]
struct Cli {
    /// Input file, or `-` to read standard input.
    file: Option<String>,

    /// Optimizer steps to apply after parsing, one character per step.
    #[arg(long)]
    steps: Option<String>,

    /// Dotted path of the sub-object to operate on, e.g. `a.b.c`.
    #[arg(long)]
    object: Option<String>,

    /// Apply --steps and exit instead of starting the prompt.
    #[arg(short = 'n', long)]
    non_interactive: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(message) = run(cli) {
        eprintln!("{message}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let Some(path) = cli.file.as_deref() else {
        print_usage();
        return Err("error: no input file given".to_string());
    };
    let from_stdin = path == "-";
    let non_interactive = cli.non_interactive || from_stdin;
    if non_interactive && cli.steps.is_none() {
        print_usage();
        return Err("error: non-interactive mode requires --steps".to_string());
    }

    let source = read_input(path, from_stdin)?;
    let mut session = Session::load(&source, cli.object.as_deref())?;

    let interactive = !non_interactive;
    if interactive {
        println!("{}", session.render());
    }

    if let Some(sequence) = cli.steps.as_deref() {
        session.ensure_disambiguated();
        session.apply_sequence(sequence)?;
        if interactive {
            println!("{SEPARATOR}");
        }
        println!("{}", session.render());
    }

    if interactive {
        interactive_loop(&mut session)?;
    }
    Ok(())
}

fn print_usage() {
    eprintln!("{}", Cli::command().render_help());
}

fn read_input(path: &str, from_stdin: bool) -> Result<String, String> {
    if from_stdin {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("reading program from the terminal, end with ^D");
        }
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|error| format!("error: cannot read standard input: {error}"))?;
        return Ok(buffer);
    }
    let metadata =
        fs::metadata(path).map_err(|_| format!("error: file not found: {path}"))?;
    if !metadata.is_file() {
        return Err(format!("error: not a regular file: {path}"));
    }
    fs::read_to_string(path).map_err(|error| format!("error: cannot read {path}: {error}"))
}

/// One exploration session: the selected object and whether its names are
/// currently globally unique.
struct Session {
    dialect: Dialect,
    object: Object,
    input_was_block: bool,
    disambiguated: bool,
}

impl Session {
    fn load(source: &str, object_path: Option<&str>) -> Result<Session, String> {
        let dialect = Dialect::evm();
        let parsed = parser::parse(source).map_err(|error| error.to_string())?;
        let (object, input_was_block) = parsed.into_object();

        // Select first: a broken sibling object must not abort a run
        // targeting a clean sub-object.
        let object = match object_path {
            None => object,
            Some(path) => select_object(object, path)?,
        };
        analysis::analyze_object(&dialect, &object).map_err(|error| format!("error: {error}"))?;

        Ok(Session {
            dialect,
            object,
            input_was_block,
            disambiguated: false,
        })
    }

    fn ensure_disambiguated(&mut self) {
        if self.disambiguated {
            return;
        }
        let dialect = &self.dialect;
        let _ = self.object.for_each_mut::<()>(&mut |node| {
            let mut ctx = OptimizerContext::for_block(dialect, &node.code);
            Disambiguator::run(&mut ctx, &mut node.code);
            Ok(())
        });
        self.disambiguated = true;
    }

    /// Applies `step` to the code of the object and all its sub-objects,
    /// children first, then re-analyzes. On any failure the object is
    /// rolled back to its pre-step state.
    fn apply_each(
        &mut self,
        step: impl Fn(&mut OptimizerContext, &mut Block) -> Result<(), OptimizerError>,
    ) -> Result<(), String> {
        let backup = self.object.clone();
        let dialect = &self.dialect;
        let applied = self
            .object
            .for_each_mut::<OptimizerError>(&mut |node| {
                let mut ctx = OptimizerContext::for_block(dialect, &node.code);
                step(&mut ctx, &mut node.code)
            })
            .map_err(|error| format!("error: {error}"));
        let result = applied.and_then(|()| {
            analysis::analyze_object(&self.dialect, &self.object)
                .map_err(|error| format!("error: {error}"))
        });
        if let Err(message) = result {
            self.object = backup;
            return Err(message);
        }
        Ok(())
    }

    fn apply_sequence(&mut self, sequence: &str) -> Result<(), String> {
        self.apply_each(|ctx, block| OptimizerSuite::run_sequence(ctx, sequence, block))
    }

    fn render(&self) -> String {
        if self.input_was_block {
            Printer::print_block(&self.object.code)
        } else {
            Printer::print_object(&self.object)
        }
    }
}

/// Resolves a dotted object path against the parsed root object.
fn select_object(root: Object, path: &str) -> Result<Object, String> {
    if path.is_empty() || path == root.name {
        return Ok(root);
    }
    let mut segments = path.split('.');
    if segments.next() != Some(root.name.as_str()) {
        return Err(format!("error: object `{path}` not found"));
    }
    let mut node = root;
    for segment in segments {
        let found = node.members.into_iter().find_map(|member| match member {
            ObjectMember::Object(sub) if sub.name == segment => Some(sub),
            _ => None,
        });
        node = found.ok_or_else(|| format!("error: object `{path}` not found"))?;
    }
    Ok(node)
}

fn interactive_loop(session: &mut Session) -> Result<(), String> {
    let banner = build_banner()?;
    let mut editor =
        DefaultEditor::new().map_err(|error| format!("error: cannot start prompt: {error}"))?;
    loop {
        session.ensure_disambiguated();
        println!("{banner}");
        let line = match editor.readline("? ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(error) => return Err(format!("error: prompt failure: {error}")),
        };
        let Some(choice) = line.trim().chars().next() else {
            continue;
        };

        let result = match choice {
            '#' => break,
            ',' => {
                let cleaned = session.apply_each(|ctx, block| {
                    VarNameCleaner::run(ctx, block);
                    Ok(())
                });
                if cleaned.is_ok() {
                    session.disambiguated = false;
                }
                cleaned
            }
            ';' => session.apply_each(|ctx, block| {
                StackCompressor::run(ctx, block);
                Ok(())
            }),
            step => session.apply_sequence(&step.to_string()),
        };

        // Failed steps roll back; reprint the pre-step object so the view
        // always matches the session state.
        if let Err(message) = result {
            eprintln!("{message}");
        }
        println!("{SEPARATOR}");
        println!("{}", session.render());
    }
    Ok(())
}

/// Multi-column menu of step abbreviations plus the extra controls, sorted
/// by name and laid out column-major.
fn build_banner() -> Result<String, String> {
    let steps = OptimizerSuite::step_abbreviation_to_name_map();
    let extras = [
        ('#', ">>> QUIT <<<"),
        (',', "VarNameCleaner"),
        (';', "StackCompressor"),
    ];
    for (control, _) in &extras {
        if steps.contains_key(control) {
            return Err(format!(
                "error: control character `{control}` collides with a step abbreviation"
            ));
        }
    }

    let entries: Vec<(char, &str)> = extras
        .iter()
        .copied()
        .chain(steps.iter().map(|(abbreviation, name)| (*abbreviation, *name)))
        .sorted_by(|a, b| a.1.cmp(b.1))
        .collect();
    let rows = entries.len().div_ceil(BANNER_COLUMNS);

    let mut banner = String::new();
    for row in 0..rows {
        let mut line = String::new();
        for column in 0..BANNER_COLUMNS {
            if let Some((abbreviation, name)) = entries.get(column * rows + row) {
                line.push_str(&format!(" {}: {:<24}", abbreviation, name));
            }
        }
        banner.push_str(line.trim_end());
        banner.push('\n');
    }
    banner.pop();
    Ok(banner)
}
