pub mod compile;
mod error;
pub mod lex;
pub mod parsing;
pub mod token_stream;
pub mod tokens;

pub use self::{
    compile::CompilerConf,
    error::{JackError, JackResult},
};

use parsing::Parse;

pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse the source of one class into its syntax tree.
pub fn parse_class(source: &str) -> JackResult<parsing::Class> {
    // Lexical analysis
    let lexer = lex::Lexer::new(source);
    let mut stream = token_stream::TokenStream::new(lexer);

    // Syntactic analysis
    Ok(parsing::Class::parse(&mut stream)?)
}

/// Compile the source of one class to VM code, with default settings.
pub fn compile_str(source: &str) -> JackResult<String> {
    compile_str_with(source, CompilerConf::default())
}

pub fn compile_str_with(source: &str, conf: CompilerConf) -> JackResult<String> {
    let class = parse_class(source)?;

    // Code generation
    let code = compile::CodeGen::new(conf).compile(&class)?;

    Ok(compile::render(&code))
}

/// Compile raw file contents, which must be UTF-8.
pub fn compile_bytes_with(source: &[u8], conf: CompilerConf) -> JackResult<String> {
    compile_str_with(std::str::from_utf8(source)?, conf)
}
