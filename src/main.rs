use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use std::path::{Path, PathBuf};
use std::{fs::read_to_string, process::ExitCode};
use tracing_subscriber::EnvFilter;
use xper::interpreter::{context::StdioContext, InterpreterConfig, TreeWalkInterpreter};
use xper::parser::expression::Program;

const EXIT_DATA_ERROR: u8 = 65;
const EXIT_SOFTWARE_ERROR: u8 = 70;

#[derive(Debug, Parser)]
#[clap(name = "xper", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: XperCommand,
}

#[derive(Debug, Subcommand)]
pub enum XperCommand {
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "sexpr")]
        format: ExpressionFormat,
    },
    /// Runs the script and prints its final value.
    Evaluate(EvaluateArgs),
    Run(EvaluateArgs),
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    path: PathBuf,
    #[clap(long = "format", value_enum, default_value = "basic")]
    format: ErrorFormat,
    #[clap(long = "max-iterations", default_value_t = InterpreterConfig::DEFAULT_MAX_LOOP_ITERATIONS)]
    max_iterations: usize,
    #[clap(long = "max-call-depth", default_value_t = InterpreterConfig::DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
}

impl EvaluateArgs {
    fn config(&self) -> InterpreterConfig {
        InterpreterConfig {
            max_loop_iterations: self.max_iterations,
            max_call_depth: self.max_call_depth,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ExpressionFormat {
    Debug,
    #[clap(name = "sexpr")]
    SExpr,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ErrorFormat {
    Debug,
    Basic,
    Pretty,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let args = CLArgs::parse();
    let succeeded = match args.routine {
        XperCommand::Tokenize { path, format } => {
            let src = read_to_string(path)?;
            tokenize(&src, &format).then_some(()).ok_or(EXIT_DATA_ERROR)
        }
        XperCommand::Parse { path, format } => {
            let src = read_to_string(path)?;
            parse(&src, &format).then_some(()).ok_or(EXIT_DATA_ERROR)
        }
        XperCommand::Evaluate(args) => {
            let src = read_to_string(&args.path)?;
            execute(&src, &args, true)
        }
        XperCommand::Run(args) => {
            let src = read_to_string(&args.path)?;
            execute(&src, &args, false)
        }
    };
    Ok(match succeeded {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    })
}

fn tokenize(src: &str, format: &TokenFormat) -> bool {
    use xper::lexer::formatter::{BasicFormatter, DebugFormatter, ToFormatter, TokenFormatter};
    use xper::lexer::{Lexer, TokenKind};

    let mut scanner = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter> = match format {
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&scanner)),
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&scanner)),
    };
    let mut succeeded = true;
    loop {
        match scanner.next_token() {
            Ok(token) => {
                println!("{}", formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    return succeeded;
                }
            }
            Err(error) => {
                eprintln!("{}", formatter.format_lexical_error(&error));
                succeeded = false;
            }
        }
    }
}

fn parse(src: &str, format: &ExpressionFormat) -> bool {
    use xper::parser::formatter::{DebugFormatter, ExpressionFormatter, SExpressionFormatter};
    use xper::parser::Parser;

    let formatter: Box<dyn ExpressionFormatter> = match format {
        ExpressionFormat::Debug => Box::new(DebugFormatter),
        ExpressionFormat::SExpr => Box::new(SExpressionFormatter::new(src)),
    };
    match Parser::new(src).parse() {
        Ok(program) => {
            println!("{}", formatter.format_program(&program));
            true
        }
        Err(error) => {
            eprintln!("{}", formatter.format_error(&error));
            false
        }
    }
}

fn parse_program(src: &str, path: &Path, format: &ErrorFormat) -> Option<Program> {
    use xper::parser::formatter::{
        DebugFormatter, ExpressionFormatter, PrettyFormatter, SExpressionFormatter,
    };
    use xper::parser::Parser;

    let error = match Parser::new(src).parse() {
        Ok(program) => return Some(program),
        Err(error) => error,
    };
    let formatter: Box<dyn ExpressionFormatter> = match format {
        ErrorFormat::Debug => Box::new(DebugFormatter),
        ErrorFormat::Basic => Box::new(SExpressionFormatter::new(src)),
        ErrorFormat::Pretty => Box::new(PrettyFormatter::new(src, path)),
    };
    eprintln!("{}", formatter.format_error(&error));
    None
}

fn execute(src: &str, args: &EvaluateArgs, print_result: bool) -> Result<(), u8> {
    use xper::value::formatter::{BasicFormatter, DebugFormatter, PrettyFormatter, ValueFormatter};

    let program = parse_program(src, &args.path, &args.format).ok_or(EXIT_DATA_ERROR)?;
    let formatter: Box<dyn ValueFormatter> = match args.format {
        ErrorFormat::Debug => Box::new(DebugFormatter),
        ErrorFormat::Basic => Box::new(BasicFormatter::new(src)),
        ErrorFormat::Pretty => Box::new(PrettyFormatter::new(src, &args.path)),
    };

    let mut interpreter = TreeWalkInterpreter::with_config(StdioContext, args.config());
    match interpreter.run(&program) {
        Ok(value) => {
            if print_result {
                println!("{}", formatter.format(&value));
            }
            Ok(())
        }
        Err(error) => {
            eprintln!("{}", formatter.format_error(&error));
            Err(EXIT_SOFTWARE_ERROR)
        }
    }
}
