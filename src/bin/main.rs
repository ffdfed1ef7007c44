use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
    process,
    sync::Once,
};
use clap::Parser;
use teeton::{lex, parse, Config, Engine};

/// Interpreter for the Teeton scripting language. Without a file, starts an interactive console.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Program to run.
    file: Option<PathBuf>,

    /// Live heap values allowed before the program runs out of memory.
    #[arg(long, default_value_t = teeton::walker::DEFAULT_HEAP_LIMIT)]
    heap_limit: usize,

    /// Print the token stream before running.
    #[arg(long)]
    dump_tokens: bool,

    /// Print the syntax tree before running.
    #[arg(long)]
    dump_ast: bool,
}

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

/// Write the requested dumps. Code that does not lex or parse is skipped here; running it
/// reports the error.
fn dump(args: &Args, code: &str, out: &mut dyn Write) -> io::Result<()> {
    if args.dump_tokens {
        if let Ok(tokens) = lex::lex(code) {
            for token in tokens {
                writeln!(out, "{}", token)?;
            }
        }
    }
    if args.dump_ast {
        if let Ok(program) = parse(code) {
            writeln!(out, "{:#?}", program)?;
        }
    }
    Ok(())
}

fn run_file(args: &Args, path: &PathBuf, engine: &mut Engine) {
    let code = fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("Could not read '{}': {}", path.display(), err);
        process::exit(1);
    });

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = dump(args, &code, &mut out) {
        eprintln!("Could not write dump: {}", err);
        process::exit(1);
    }
    if let Err(err) = engine.execute(&code, &mut stdin.lock(), &mut out) {
        let _ = out.flush();
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn repl(args: &Args, engine: &mut Engine) -> io::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "TEETON console (v{})", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "Enter a blank line to run what you have typed. Ctrl-D exits.")?;

    loop {
        write!(out, "T> ")?;
        out.flush()?;

        let mut code = String::new();
        loop {
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                if !code.trim().is_empty() {
                    break;
                }
                writeln!(out)?;
                return Ok(());
            }
            if line.trim().is_empty() {
                break;
            }
            code.push_str(&line);
        }
        if code.trim().is_empty() {
            continue;
        }

        dump(args, &code, &mut out)?;
        match engine.execute(&code, &mut input, &mut out) {
            Ok(Some(value)) => writeln!(out, "{}", value)?,
            Ok(None) => {},
            Err(err) => writeln!(out, "{}", err)?,
        }
    }
}

fn main() {
    init_tracing();
    let args = Args::parse();
    let mut engine = Engine::new(Config {
        heap_limit: args.heap_limit,
    });

    match &args.file {
        Some(path) => run_file(&args, path, &mut engine),
        None => if let Err(err) = repl(&args, &mut engine) {
            eprintln!("{}", err);
            process::exit(1);
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn dump_failures_are_io_errors() {
        let args = Args::parse_from(["teeton", "--dump-tokens"]);
        let err = dump(&args, "x = 1", &mut Closed).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn dump_skips_code_that_does_not_parse() {
        let args = Args::parse_from(["teeton", "--dump-tokens", "--dump-ast"]);
        let mut out = Vec::new();
        dump(&args, "x = $", &mut out).unwrap();
        assert!(out.is_empty());

        dump(&args, "x", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("IDENTIFIER x"));
        assert!(text.contains("VariableReference"));
    }
}
