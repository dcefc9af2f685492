use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap::Subcommand;
use miette::IntoDiagnostic;
use miette::WrapErr;
use monkey_front::Lexer;
use monkey_front::logger::{self, LogLevel};

#[derive(Parser, Debug)]
struct Args {
    /// Verbosity of the parser's tracing output on stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print one token per line, ending with EOF.
    Tokenize { filename: PathBuf },
    /// Print each parsed statement in its canonical form.
    Parse { filename: PathBuf },
}

fn read(filename: &Path) -> miette::Result<String> {
    fs::read_to_string(filename)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading `{}` failed", filename.display()))
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    logger::init_with_level(args.log_level);

    match args.command {
        Commands::Tokenize { filename } => {
            let file_contents = read(&filename)?;
            let mut illegal = false;

            for token in Lexer::new(filename.to_str(), &file_contents) {
                if token.is(monkey_front::TokenKind::Illegal) {
                    eprintln!(
                        "[line {}] Error: Unexpected character: {}",
                        token.line(&file_contents),
                        token.literal
                    );
                    illegal = true;
                    continue;
                }
                println!("{token}");
            }

            if illegal {
                std::process::exit(65);
            }
        }
        Commands::Parse { filename } => {
            let file_contents = read(&filename)?;

            let lexer = Lexer::new(filename.to_str(), &file_contents);
            let mut parser = monkey_front::Parser::new(lexer);
            let program = parser.parse_program();

            if !parser.errors().is_empty() {
                for (error, report) in parser.errors().iter().zip(parser.diagnostics()) {
                    eprintln!("[line {}] Error: {error}", error.line(&file_contents));
                    eprintln!("{report:?}");
                }
                std::process::exit(65);
            }

            for statement in &program.statements {
                println!("{statement}");
            }
        }
    }
    Ok(())
}
