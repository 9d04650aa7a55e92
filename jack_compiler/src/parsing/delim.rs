//! Delimited list.
use super::ParseError;
use crate::{token_stream::TokenStream, tokens::Symbol};

/// Parse one or more items separated by commas.
///
/// Lists that may be empty check their closing token
/// before calling this.
pub fn comma_separated<T, F>(input: &mut TokenStream, mut item: F) -> Result<Vec<T>, ParseError>
where
    F: FnMut(&mut TokenStream) -> Result<T, ParseError>,
{
    let mut items = vec![item(input)?];

    while input.match_symbol(Symbol::Comma) {
        items.push(item(input)?);
    }

    Ok(items)
}
