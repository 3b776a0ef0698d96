use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use pure::PureError;
use pure_codec::scanner::{Scanner, TokenKind};

#[derive(Parser)]
#[command(name = "purecfg")]
#[command(about = "Inspect and check Pure configuration documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of a `.pure` file
    Lex {
        /// Input `.pure` file
        #[arg(short, long)]
        input: PathBuf,

        /// Emit tokens as JSON instead of one token per line
        #[arg(long)]
        json: bool,
    },

    /// Scan a `.pure` file and report illegal tokens
    Check {
        /// Input `.pure` file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, PureError> {
    match &cli.command {
        Commands::Lex { input, json } => {
            let src = fs::read(input)?;
            let mut scanner = Scanner::new(&src);
            let mut tokens = Vec::new();
            loop {
                let tok = scanner.scan();
                let done = tok.kind == TokenKind::Eof;
                tokens.push(tok);
                if done {
                    break;
                }
            }
            if *json {
                println!("{}", serde_json::to_string_pretty(&tokens).unwrap());
            } else {
                for tok in &tokens {
                    println!("{:>5}..{:<5} {:?} {:?}", tok.start, tok.end, tok.kind, tok.text);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Check { input } => {
            let src = fs::read(input)?;
            let mut scanner = Scanner::new(&src);
            let mut illegal = 0;
            loop {
                let line = scanner.line();
                let col = scanner.col();
                let tok = scanner.scan();
                match tok.kind {
                    TokenKind::Eof => break,
                    TokenKind::Illegal => {
                        illegal += 1;
                        eprintln!(
                            "{}:{}:{}: illegal token {:?}",
                            input.display(),
                            line,
                            col,
                            tok.text
                        );
                    }
                    _ => {}
                }
            }
            if illegal > 0 {
                eprintln!("{}: {} illegal token(s)", input.display(), illegal);
                return Ok(ExitCode::FAILURE);
            }
            println!("{}: ok", input.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}
