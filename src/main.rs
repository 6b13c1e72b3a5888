use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};
use std::{fs::read_to_string, process::ExitCode};

const EXIT_PARSE_ERROR: u8 = 65;
const EXIT_RUNTIME_ERROR: u8 = 70;
const EXIT_IO_ERROR: u8 = 74;

#[derive(Debug, Parser)]
#[clap(name = "monkey", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: Option<MonkeyCommand>,
}

#[derive(Debug, Subcommand)]
pub enum MonkeyCommand {
    /// Print the token stream of a source file.
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    /// Print the parsed program of a source file.
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "canonical")]
        format: ProgramFormat,
        #[clap(long = "errors", value_enum, default_value = "pretty")]
        errors: ErrorFormat,
    },
    /// Evaluate a source file and print its result.
    Run {
        path: PathBuf,
        #[clap(long = "errors", value_enum, default_value = "pretty")]
        errors: ErrorFormat,
    },
    /// Start an interactive session.
    Repl {
        #[clap(long = "prompt", default_value = monkey::repl::PROMPT)]
        prompt: String,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ProgramFormat {
    Debug,
    Canonical,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ErrorFormat {
    Basic,
    Pretty,
}

fn main() -> ExitCode {
    monkey_main().expect("Encountered an error!")
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn monkey_main() -> Result<ExitCode> {
    color_eyre::install().expect("Can't fail at first call!");
    init_tracing();

    let args = CLArgs::parse();
    let routine = args.routine.unwrap_or(MonkeyCommand::Repl {
        prompt: monkey::repl::PROMPT.into(),
    });

    let succeeded = match routine {
        MonkeyCommand::Tokenize { path, format } => {
            eprintln!("Tokenizing {:?}...", path);
            let Some(src) = read_source(&path) else {
                return Ok(ExitCode::from(EXIT_IO_ERROR));
            };
            tokenize(&src, &format)
        }
        MonkeyCommand::Parse {
            path,
            format,
            errors,
        } => {
            eprintln!("Parsing {:?}...", path);
            let Some(src) = read_source(&path) else {
                return Ok(ExitCode::from(EXIT_IO_ERROR));
            };
            parse(&src, &path, &format, &errors)
        }
        MonkeyCommand::Run { path, errors } => {
            eprintln!("Running {:?}...", path);
            let Some(src) = read_source(&path) else {
                return Ok(ExitCode::from(EXIT_IO_ERROR));
            };
            run(&src, &path, &errors)
        }
        MonkeyCommand::Repl { prompt } => {
            repl(&prompt)?;
            Ok(())
        }
    };

    match succeeded {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(code) => Ok(ExitCode::from(code)),
    }
}

fn read_source(path: &Path) -> Option<String> {
    match read_to_string(path).wrap_err_with(|| format!("Failed to read {}", path.display())) {
        Ok(src) => Some(src),
        Err(report) => {
            eprintln!("Error: {report:?}");
            None
        }
    }
}

fn tokenize(src: &str, format: &TokenFormat) -> Result<(), u8> {
    use monkey::lexer::Lexer;
    use monkey::token::formatter::{BasicFormatter, DebugFormatter, TokenFormatter};
    use monkey::token::TokenKind;

    let mut scanner = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter> = match format {
        TokenFormat::Debug => Box::new(DebugFormatter),
        TokenFormat::Basic => Box::new(BasicFormatter),
    };
    let mut succeeded = true;
    loop {
        let token = scanner.next_token();
        println!("{}", formatter.format(&token));
        match token.kind {
            TokenKind::Eof => break,
            TokenKind::Illegal => succeeded = false,
            _ => {}
        }
    }

    match succeeded {
        true => Ok(()),
        false => Err(EXIT_PARSE_ERROR),
    }
}

fn program_formatter<'src>(
    src: &'src str,
    path: &'src Path,
    format: &ProgramFormat,
    errors: &ErrorFormat,
) -> Box<dyn monkey::parser::formatter::ProgramFormatter + 'src> {
    use monkey::parser::formatter::{BasicFormatter, DebugFormatter, PrettyFormatter};

    match (format, errors) {
        (ProgramFormat::Debug, _) => Box::new(DebugFormatter),
        (ProgramFormat::Canonical, ErrorFormat::Basic) => Box::new(BasicFormatter),
        (ProgramFormat::Canonical, ErrorFormat::Pretty) => Box::new(PrettyFormatter::new(src, path)),
    }
}

fn parse(src: &str, path: &Path, format: &ProgramFormat, errors: &ErrorFormat) -> Result<(), u8> {
    use monkey::parser::Parser;

    let formatter = program_formatter(src, path, format, errors);
    let mut parser = Parser::new(src);
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        for error in parser.errors() {
            eprintln!("{}", formatter.format_error(error));
        }
        return Err(EXIT_PARSE_ERROR);
    }

    println!("{}", formatter.format(&program));
    Ok(())
}

fn run(src: &str, path: &Path, errors: &ErrorFormat) -> Result<(), u8> {
    use monkey::environment::SharedEnvironment;
    use monkey::interpreter::TreeWalkInterpreter;
    use monkey::parser::Parser;
    use monkey::value::formatter::{BasicFormatter, CodedFormatter, ValueFormatter};
    use monkey::value::Object;

    let mut parser = Parser::new(src);
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        let formatter = program_formatter(src, path, &ProgramFormat::Canonical, errors);
        for error in parser.errors() {
            eprintln!("{}", formatter.format_error(error));
        }
        return Err(EXIT_PARSE_ERROR);
    }

    let value_formatter: Box<dyn ValueFormatter> = match errors {
        ErrorFormat::Basic => Box::new(BasicFormatter),
        ErrorFormat::Pretty => Box::new(CodedFormatter),
    };
    let interpreter = TreeWalkInterpreter::new();
    let mut environment = SharedEnvironment::new();
    match interpreter.eval(&program, &mut environment) {
        Object::Error(error) => {
            eprintln!("{}", value_formatter.format_error(&error));
            Err(EXIT_RUNTIME_ERROR)
        }
        Object::Null => Ok(()),
        value => {
            println!("{}", value_formatter.format(&value));
            Ok(())
        }
    }
}

fn repl(prompt: &str) -> Result<()> {
    use monkey::repl::Repl;

    println!("This is the Monkey programming language!");
    println!("Feel free to type in commands");
    Repl::with_prompt(prompt)
        .run(std::io::stdin().lock(), std::io::stdout().lock())
        .wrap_err("REPL session failed")
}
