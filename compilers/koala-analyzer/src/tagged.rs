//! Reader for pre-tagged text, one sentence per line:
//!
//! ```text
//! 나/NP+는/JX 밥/NNG+을/JKO 먹/VV+었/EP+다/EF
//! 했다=하/VV+였/EP+다/EF
//! ```
//!
//! A word is morphemes joined by `+`, each `surface/TAG` with an optional
//! `(original)` label. When the morphemes do not spell the word (contractions),
//! the surface is given up front with `=`.

use koala_protocol::{NativeMorpheme, NativeSentence, NativeWord};
use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0, space1},
    combinator::{all_consuming, opt},
    multi::separated_list1,
    sequence::{delimited, terminated},
    IResult,
};

use crate::error::AnalyzerError;
use crate::NativeAnalyzer;

fn is_surface_char(c: char) -> bool {
    !c.is_whitespace() && c != '/' && c != '+'
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}

fn morpheme(input: &str) -> IResult<&str, NativeMorpheme> {
    let (input, surface) = take_while1(is_surface_char)(input)?;
    let (input, _) = char('/')(input)?;
    let (input, tag) = take_while1(is_tag_char)(input)?;
    let (input, original) = opt(delimited(char('('), take_while1(|c| c != ')'), char(')')))(input)?;

    let mut morpheme = NativeMorpheme::new(surface, tag);
    morpheme.original_tag = original.map(str::to_string);
    Ok((input, morpheme))
}

fn word(input: &str) -> IResult<&str, NativeWord> {
    let (input, explicit) = opt(terminated(
        take_while1(|c| is_surface_char(c) && c != '='),
        char('='),
    ))(input)?;
    let (input, morphemes) = separated_list1(char('+'), morpheme)(input)?;

    let surface = match explicit {
        Some(surface) => surface.to_string(),
        None => morphemes.iter().map(|m| m.surface.as_str()).collect(),
    };
    Ok((input, NativeWord { surface, morphemes }))
}

fn sentence(input: &str) -> IResult<&str, Vec<NativeWord>> {
    delimited(space0, separated_list1(space1, word), space0)(input)
}

/// Parses every non-blank line into a sentence with only its words filled in.
pub fn parse_tagged(text: &str) -> Result<Vec<NativeSentence>, AnalyzerError> {
    let mut sentences = Vec::new();

    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match all_consuming(sentence)(line) {
            Ok((_, words)) => sentences.push(NativeSentence {
                words,
                ..NativeSentence::default()
            }),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                return Err(AnalyzerError::Parse {
                    line: number + 1,
                    column: line.len() - e.input.len() + 1,
                    message: format!("expected surface/TAG, found {:?}", e.input),
                });
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(AnalyzerError::Parse {
                    line: number + 1,
                    column: line.len() + 1,
                    message: "unexpected end of line".to_string(),
                });
            }
        }
    }

    Ok(sentences)
}

/// Analyzer over already tagged text: it performs no analysis of its own and
/// only reports the words it was given.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedTextAnalyzer;

impl NativeAnalyzer for TaggedTextAnalyzer {
    fn analyze_native(&self, text: &str) -> Result<Vec<NativeSentence>, AnalyzerError> {
        parse_tagged(text)
    }
}
