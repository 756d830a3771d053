use std::{
    io::{stdin, stdout, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use ast::AstPrinter;
use clap::Parser;
use errors::{Diagnostic, ErrorReporter, Reporter};

#[derive(clap::Parser)]
struct Args {
    /// Script to run. Starts an interactive prompt if omitted.
    file: Option<PathBuf>,

    /// Print the parsed tree instead of evaluating it.
    #[arg(long)]
    print_ast: bool,
}

/// Prints diagnostics to stderr as soon as they're reported.
#[derive(Default)]
struct ConsoleReporter(Reporter);

impl ErrorReporter for ConsoleReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        eprintln!("{diagnostic}");
        self.0.report(diagnostic);
    }

    fn had_error(&self) -> bool {
        self.0.had_error()
    }

    fn had_runtime_error(&self) -> bool {
        self.0.had_runtime_error()
    }
}

fn run(source: &str, args: &Args, reporter: &mut ConsoleReporter) {
    let output = if args.print_ast {
        interpreter::parse_source(source, reporter).map(|expr| AstPrinter.print(&expr))
    } else {
        interpreter::run_source(source, reporter)
    };

    if let Some(output) = output {
        println!("{output}");
    }
}

fn run_file(path: &PathBuf, args: &Args) -> anyhow::Result<ExitCode> {
    let source = std::fs::read_to_string(path)?;
    let mut reporter = ConsoleReporter::default();

    run(&source, args, &mut reporter);

    Ok(ExitCode::from(exit_code(&reporter)))
}

/// Static errors take precedence, a script that failed to parse never ran.
fn exit_code(reporter: &impl ErrorReporter) -> u8 {
    if reporter.had_error() {
        60
    } else if reporter.had_runtime_error() {
        70
    } else {
        0
    }
}

fn run_prompt(args: &Args) -> anyhow::Result<ExitCode> {
    let mut reporter = ConsoleReporter::default();
    let mut lines = stdin().lock().lines();

    loop {
        print!("> ");
        stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(ExitCode::SUCCESS);
        };

        run(&line?, args, &mut reporter);
        reporter.0.reset();
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    match &args.file {
        Some(file) => run_file(file, &args),
        None => run_prompt(&args),
    }
}
