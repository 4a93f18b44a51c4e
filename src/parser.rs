use std::iter::Enumerate;
use std::str::Lines;

use crate::error::ParseError;
use crate::section::{Entry, Section};

/// Represents an on-going parse.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }
}

impl Parser<'_> {
    /// Consume the text and split it into sections.
    ///
    /// Sections are returned in the order they appear. Repeated section names are kept as
    /// separate sections; deciding what to do about them is left to the caller.
    pub fn into_sections(self) -> Result<Vec<Section>, ParseError> {
        let mut sections = Vec::<Section>::with_capacity(8);

        for (i, raw) in self.lines {
            let line = i + 1;
            let trimmed = raw.trim();

            if is_blank_or_comment(trimmed) {
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let name = parse_section_name(rest, line)?;
                sections.push(Section::new(name, Vec::with_capacity(16)));
                continue;
            }

            let Some(section) = sections.last_mut() else {
                return Err(ParseError::EntryOutsideSection { line });
            };

            section.push(parse_section_entry(trimmed, line)?);
        }

        if sections.is_empty() {
            return Err(ParseError::NoSections);
        }

        Ok(sections)
    }
}

fn is_blank_or_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with(';')
}

/// Parse what follows the opening '[' of a section header.
fn parse_section_name(rest: &str, line: usize) -> Result<String, ParseError> {
    let Some((name, trailing)) = rest.split_once(']') else {
        return Err(ParseError::UnterminatedSectionName { line });
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::SectionNameEmpty { line });
    }

    // Only whitespace or a comment may follow the closing bracket.
    if let Some(c) = trailing
        .trim_start()
        .chars()
        .next()
        .filter(|&c| c != '#' && c != ';')
    {
        return Err(ParseError::UnexpectedCharacter { line, c });
    }

    Ok(name.to_owned())
}

fn parse_section_entry(text: &str, line: usize) -> Result<Entry, ParseError> {
    debug_assert!(!text.is_empty());

    let Some((key, value)) = text.split_once('=') else {
        return Err(ParseError::MissingEquals { line });
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::KeyEmpty { line });
    }

    Ok(Entry::new(key.to_owned(), normalize_value(value).to_owned()))
}

/// Values are taken verbatim, apart from surrounding whitespace and one pair of enclosing quotes.
fn normalize_value(value: &str) -> &str {
    let value = value.trim();

    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
