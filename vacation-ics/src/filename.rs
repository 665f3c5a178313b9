use std::fmt;

use chrono::NaiveDate;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

pub const FILE_PREFIX: &str = "vacances";
pub const FILE_EXTENSION: &str = "ics";

const FILLER: char = '-';

/// Download name offered for an exported calendar. Only ever made of
/// `[a-z0-9-]` plus the `.ics` extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedFileName(String);

impl SuggestedFileName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SuggestedFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-cases and removes diacritics: `François Müller` becomes `francois muller`.
/// Letters without a decomposition are spelled out, `Æsa Ørn` gives `aesa orn`.
pub(crate) fn fold_accents(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    for c in name.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)) {
        match spelled_out(c) {
            Some(ascii) => folded.push_str(ascii),
            None => folded.push(c),
        }
    }
    folded
}

fn spelled_out(c: char) -> Option<&'static str> {
    Some(match c {
        'æ' => "ae",
        'œ' => "oe",
        'ø' => "o",
        'ð' => "d",
        'þ' => "th",
        'ß' => "ss",
        _ => return None,
    })
}

/// Name reduced to `[a-z0-9]`, used inside event UIDs.
pub(crate) fn compact_slug(name: &str) -> String {
    fold_accents(name)
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

fn dashed_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in fold_accents(name).chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with(FILLER) {
            slug.push(FILLER);
        }
    }
    if slug.ends_with(FILLER) {
        slug.pop();
    }
    slug
}

/// `vacances-<name>-<YYYY-MM-DD>.ics`, with the name slugged.
pub fn suggested_file_name(name: &str, date: NaiveDate) -> SuggestedFileName {
    let slug = dashed_slug(name);
    let stamp = date.format("%Y-%m-%d");

    if slug.is_empty() {
        SuggestedFileName(format!("{FILE_PREFIX}-{stamp}.{FILE_EXTENSION}"))
    } else {
        SuggestedFileName(format!("{FILE_PREFIX}-{slug}-{stamp}.{FILE_EXTENSION}"))
    }
}
