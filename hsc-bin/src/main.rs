use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use humanscript::{
    lexer,
    pipeline::{self, CompileError},
    util::fmt::tree,
};
use log::{info, LevelFilter};

const OUTPUT_SUFFIX: &str = "_hs_generated.cpp";

#[derive(Parser, Debug)]
#[command(name = "hsc", version, about = "HumanScript to C++ compiler")]
struct Cli {
    /// HumanScript source file.
    input: PathBuf,

    /// Where to write the generated C++. Defaults to `<stem>_hs_generated.cpp`
    /// next to the input.
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write the result to stdout instead of a file.
    #[arg(long)]
    stdout: bool,

    /// What to produce.
    #[arg(long, value_enum, default_value_t = Emit::Cpp)]
    emit: Emit,

    /// More logging (-v for notes, -vv for stage transitions).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "kebab-case")]
enum Emit {
    Tokens,
    Ast,
    TypedAst,
    Cpp,
}

impl Cli {
    fn level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Error,
            (false, 0) => LevelFilter::Warn,
            (false, 1) => LevelFilter::Info,
            (false, _) => LevelFilter::Debug,
        }
    }

    fn output_path(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        let stem = self
            .input
            .file_stem()
            .map_or_else(|| "out".into(), |stem| stem.to_string_lossy());
        self.input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns failure without an `Err` when the source itself doesn't compile;
/// that case is already reported.
fn run(cli: &Cli) -> Result<ExitCode> {
    let src = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let result = match cli.emit {
        Emit::Tokens => Ok(emit_tokens(&src)),
        Emit::Ast => pipeline::parse(&src, &mut Vec::new())
            .map(|program| tree::print_program_string(&program)),
        Emit::TypedAst => pipeline::check(&src, &mut Vec::new())
            .map(|checked| tree::print_program_string(&checked.program)),
        Emit::Cpp => pipeline::compile(&src).map(|compilation| compilation.code),
    };

    let out = match result {
        Ok(out) => out,
        Err(error) => {
            report(&cli.input, &src, &error);
            return Ok(ExitCode::FAILURE);
        }
    };

    if cli.stdout || cli.emit != Emit::Cpp {
        io::stdout()
            .lock()
            .write_all(out.as_bytes())
            .context("failed to write to stdout")?;
        return Ok(ExitCode::SUCCESS);
    }

    let path = cli.output_path();
    fs::write(&path, out).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn emit_tokens(src: &str) -> String {
    let (tokens, errors) = lexer::lex_in_new(src);
    for error in &errors {
        eprintln!("{error:#}");
    }
    tokens.iter().map(|token| format!("{token:?}\n")).collect()
}

/// Prints a compile error as `path:line:col: error: message`.
fn report(path: &Path, src: &str, error: &CompileError) {
    let location = error.span().map(|span| span.location(src));
    let message = match error {
        CompileError::Parse(error) => error.inner.to_string(),
        CompileError::Check(error) => error.inner.to_string(),
        CompileError::Generate(error) => error.to_string(),
    };
    match location {
        Some((line, column)) => {
            eprintln!("{}:{line}:{column}: error: {message}", path.display());
        }
        None => eprintln!("{}: error: {message}", path.display()),
    }
}
