//! Entrypoint for CLI
use std::{
    env,
    error::Error,
    fs,
    path::{Path, PathBuf},
    process,
};

use log::{error, info};
use mjc::{
    lex::{Lexer, TokenKind},
    prelude::*,
    IMPL_VERSION,
};

static USAGE: &str = r#"
usage: mjc CMD FILE [OPTIONS]

commands:
    build   Compile the source file into an object file
    lex     Print the tokens of the source file
    list    Compile the source file and print a listing

options:
    -o OUT          Object file to write (build only, default FILE.obj)
    --config CONF   YAML file with capacity limits

examples:
    mjc build sample.mj
    mjc build sample.mj -o out/sample.obj --config limits.yaml
    mjc list sample.mj
"#;

fn read_source(filepath: &Path) -> MjResult<String> {
    Ok(fs::read_to_string(filepath)?)
}

fn read_conf(filepath: Option<&Path>) -> MjResult<CompileConf> {
    match filepath {
        Some(filepath) => {
            let text = fs::read_to_string(filepath)?;
            let conf: CompileConf = serde_yaml::from_str(&text)
                .map_err(|err| MjError::Config(format!("{}: {err}", filepath.display())))?;
            conf.validate()?;
            Ok(conf)
        }
        None => Ok(CompileConf::default()),
    }
}

/// Compile, printing the diagnostics. Returns `None` when there were any.
fn compile(args: &Args) -> MjResult<Option<Code>> {
    let source = read_source(&args.filepath)?;
    let conf = read_conf(args.config.as_deref())?;

    info!("compiling {}", args.filepath.display());
    match mjc::compile_with(&source, conf) {
        Ok(code) => {
            println!("No errors.");
            Ok(Some(code))
        }
        Err(MjError::Compile(errors)) => {
            println!("{errors}");
            println!("{} errors.", errors.count());
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn run_build(args: Args) -> MjResult<bool> {
    let Some(code) = compile(&args)? else {
        return Ok(false);
    };

    let outpath = args
        .output
        .clone()
        .unwrap_or_else(|| args.filepath.with_extension("obj"));
    let mut outfile = fs::File::create(&outpath)?;
    code.write(&mut outfile)?;
    info!("wrote {}", outpath.display());

    Ok(true)
}

fn run_list(args: Args) -> MjResult<bool> {
    let Some(code) = compile(&args)? else {
        return Ok(false);
    };

    let mut listing = String::new();
    Disassembler::new(&code).write_listing(&mut listing)?;
    print!("{listing}");

    Ok(true)
}

fn run_lexer(args: Args) -> MjResult<bool> {
    use TokenKind as TK;

    let source = read_source(&args.filepath)?;
    let mut tokens = Lexer::new(source.as_str()).into_iter();

    println!(" line:col  | token          | value ");
    for token in tokens.by_ref() {
        let kind = format!("{:?}", token.kind); // cannot format debug print {:?} into columns
        match token.kind {
            TK::Ident => println!("{:5}:{:<4} {kind: <16} {}", token.line, token.col, token.name),
            TK::Number | TK::CharConst => {
                println!("{:5}:{:<4} {kind: <16} {}", token.line, token.col, token.val)
            }
            _ => println!("{:5}:{:<4} {kind: <16}", token.line, token.col),
        }
    }

    let errors = tokens.errors();
    if !errors.is_empty() {
        println!("{errors}");
    }
    Ok(errors.is_empty())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    let ok = match parse_args() {
        Some(Cmd::Build(args)) => run_build(args),
        Some(Cmd::Lex(args)) => run_lexer(args),
        Some(Cmd::List(args)) => run_list(args),
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            process::exit(64)
        }
    };

    match ok {
        Ok(true) => Ok(()),
        Ok(false) => process::exit(1),
        Err(err) => {
            error!("{err}");
            Err(err.into())
        }
    }
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    let cmd = args.next()?;
    match cmd.as_str() {
        "build" => Some(Cmd::Build(consume_args(args)?)),
        "lex" => Some(Cmd::Lex(consume_args(args)?)),
        "list" => Some(Cmd::List(consume_args(args)?)),
        _ => None,
    }
}

/// Consumes the file argument and options. `None` when the usage text
/// should be printed instead.
fn consume_args(mut args: impl Iterator<Item = String>) -> Option<Args> {
    let mut filepath = None;
    let mut output = None;
    let mut config = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" => output = Some(PathBuf::from(args.next()?)),
            "--config" => config = Some(PathBuf::from(args.next()?)),
            _ if filepath.is_none() && !arg.starts_with('-') => filepath = Some(PathBuf::from(&arg)),
            _ => return None,
        }
    }

    Some(Args {
        filepath: filepath?,
        output,
        config,
    })
}

fn print_usage() {
    println!("MicroJava compiler v{IMPL_VERSION}");
    println!("{USAGE}");
}

enum Cmd {
    /// Compile to an object file
    Build(Args),
    /// Print tokens
    Lex(Args),
    /// Print listing
    List(Args),
}

struct Args {
    filepath: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
}
