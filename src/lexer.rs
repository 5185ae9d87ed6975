//! Lexical analysis: splitting a raw line into command-unit sources and
//! turning each source into a flat list of tokens.
//!
//! Nothing here fails. Malformed input is left for the parser to degrade
//! into "no redirection" or an empty unit.

/// Separator between command units on one line.
pub const UNIT_SEPARATOR: char = ';';

/// Marker that makes a unit run without the interpreter waiting for it.
pub const BACKGROUND_MARKER: char = '&';

/// A token resulting from lexical analysis of one command unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Any whitespace-delimited text that is not an operator.
    Word(String),
    /// Input redirection symbol, `<`.
    RedirectLeft,
    /// Output redirection symbol, `>`.
    RedirectRight,
    /// The pipe operator, `|`.
    PipeOp,
    /// A standalone background marker, `&`.
    Background,
}

impl Token {
    fn from_word(word: &str) -> Self {
        match word {
            "<" => Token::RedirectLeft,
            ">" => Token::RedirectRight,
            "|" => Token::PipeOp,
            "&" => Token::Background,
            _ => Token::Word(word.to_string()),
        }
    }

    /// The source text of this token.
    ///
    /// Used where operators are not meaningful and must be passed on verbatim.
    pub fn text(&self) -> &str {
        match self {
            Token::Word(word) => word.as_str(),
            Token::RedirectLeft => "<",
            Token::RedirectRight => ">",
            Token::PipeOp => "|",
            Token::Background => "&",
        }
    }
}

/// Text of one `;`-delimited segment, with a trailing `&` already stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSource<'a> {
    pub text: &'a str,
    /// The segment's last non-whitespace character was the background marker.
    pub background: bool,
}

/// Split a line into unit sources on `;`.
///
/// Segments that are empty or whitespace-only are dropped, so `;;` and a
/// trailing `;` produce nothing. The line itself is never modified.
pub fn split_units(line: &str) -> Vec<UnitSource<'_>> {
    line.split(UNIT_SEPARATOR)
        .filter(|segment| !segment.trim().is_empty())
        .map(strip_background_marker)
        .collect()
}

fn strip_background_marker(segment: &str) -> UnitSource<'_> {
    match segment.trim_end().strip_suffix(BACKGROUND_MARKER) {
        Some(text) => UnitSource {
            text,
            background: true,
        },
        None => UnitSource {
            text: segment,
            background: false,
        },
    }
}

/// Tokenize a unit source by whitespace, classifying standalone operators.
///
/// Operators are only recognized as whole tokens: `ls>out` is a single word.
pub fn split_into_tokens(text: &str) -> Vec<Token> {
    text.split_whitespace().map(Token::from_word).collect()
}
