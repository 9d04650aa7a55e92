//! Entrypoint for CLI
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Instant,
};

use jack_compiler::{
    compile_bytes_with,
    lex::{debug_print_lexer, Lexer},
    parse_class, CompilerConf, JackError, JackResult, IMPL_VERSION,
};
use log::{debug, error, info};

static USAGE: &str = r#"
usage: jackc CMD [FLAGS] PATH

commands:
    compile   Compile a .jack file, or every .jack file in a directory,
              into a .vm file next to each source
    tokens    Print the tokens of the target .jack file
    ast       Print the syntax tree of the target .jack file

flags:
    --annotate  Interleave comments with the generated code (compile only)

examples:
    jackc compile Pong/
    jackc compile --annotate Main.jack
    jackc tokens Main.jack
"#;

/// Compile every source in the given path.
///
/// A failing file is reported and skipped. Returns the
/// number of files that failed.
fn run_compiler(path: &Path, conf: &CompilerConf) -> JackResult<usize> {
    let sources = collect_sources(path)?;
    if sources.is_empty() {
        error!("no .jack files found in {}", path.display());
        return Ok(1);
    }

    let mut failures = 0;
    let start = Instant::now();

    for source_path in &sources {
        if let Err(err) = compile_file(source_path, conf) {
            failures += 1;
            match fs::read_to_string(source_path) {
                Ok(source) => error!("{}\n{}", source_path.display(), err.report(&source)),
                Err(_) => error!("{}: {}", source_path.display(), err),
            }
        }
    }

    info!(
        "compiled {} of {} files in {}ms",
        sources.len() - failures,
        sources.len(),
        start.elapsed().as_nanos() as f64 / 1000000.0
    );

    Ok(failures)
}

fn compile_file(source_path: &Path, conf: &CompilerConf) -> JackResult<()> {
    debug!("compiling {}", source_path.display());

    let file_bytes = fs::read(source_path)?;
    let vm_code = compile_bytes_with(&file_bytes, conf.clone())?;

    let out_path = source_path.with_extension("vm");
    fs::write(&out_path, vm_code)?;
    info!("wrote {}", out_path.display());

    Ok(())
}

/// The file itself, or the `.jack` files directly inside a directory.
fn collect_sources(path: &Path) -> JackResult<Vec<PathBuf>> {
    if path.is_dir() {
        let mut sources = vec![];
        for entry in fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.is_file() && entry_path.extension().map_or(false, |ext| ext == "jack") {
                sources.push(entry_path);
            }
        }
        // Stable output order regardless of file system.
        sources.sort();
        Ok(sources)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

fn run_tokens(path: &Path) -> JackResult<()> {
    let source_code = fs::read_to_string(path)?;
    debug_print_lexer(Lexer::new(source_code.as_str()))?;
    Ok(())
}

fn run_ast(path: &Path) -> JackResult<()> {
    let source_code = fs::read_to_string(path)?;
    match parse_class(source_code.as_str()) {
        Ok(class) => {
            println!("{:#?}", class);
            Ok(())
        }
        Err(err) => {
            error!("{}\n{}", path.display(), err.report(&source_code));
            Err(err)
        }
    }
}

fn main() {
    simple_logger::SimpleLogger::new().env().init().unwrap();

    let result: Result<bool, JackError> = match parse_args() {
        Some(Cmd::Compile { path, conf }) => run_compiler(&path, &conf).map(|failures| failures == 0),
        Some(Cmd::Tokens { path }) => run_tokens(&path).map(|_| true),
        Some(Cmd::Ast { path }) => run_ast(&path).map(|_| true),
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            error!("{err}");
            std::process::exit(1)
        }
    }
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    match args.next() {
        Some(cmd) => match cmd.as_str() {
            "compile" => {
                let mut conf = CompilerConf::default();
                let mut path = None;
                for arg in args {
                    if arg == "--annotate" {
                        conf.annotate = true;
                    } else if path.is_none() {
                        path = Some(PathBuf::from(arg));
                    } else {
                        // Only one path allowed.
                        return None;
                    }
                }
                Some(Cmd::Compile { path: path?, conf })
            }
            "tokens" => Some(Cmd::Tokens {
                path: consume_arg(args)?,
            }),
            "ast" => Some(Cmd::Ast {
                path: consume_arg(args)?,
            }),
            _ => None,
        },
        None => None,
    }
}

/// Consumes the next argument as a path.
fn consume_arg(mut args: impl Iterator<Item = String>) -> Option<PathBuf> {
    args.next().map(PathBuf::from)
}

fn print_usage() {
    println!("Jack compiler v{IMPL_VERSION}");
    println!("{USAGE}");
}

enum Cmd {
    /// Compile file or directory
    Compile { path: PathBuf, conf: CompilerConf },
    /// Dump tokens
    Tokens { path: PathBuf },
    /// Dump syntax tree
    Ast { path: PathBuf },
}
