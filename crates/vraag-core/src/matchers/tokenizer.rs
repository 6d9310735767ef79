//! Dutch word tokenizer with a lookup lemmatizer.
//!
//! Splits on whitespace; every punctuation character becomes its own token.
//! Lemmas come from a small table of contract vocabulary and fall back to
//! the lowercase form.

use std::collections::HashMap;

use lazy_static::lazy_static;

lazy_static! {
    static ref LEMMAS: HashMap<&'static str, &'static str> = [
        // betalen
        ("betalen", "betaal"),
        ("betaalt", "betaal"),
        ("betaald", "betaal"),
        ("betaalde", "betaal"),
        ("betaalden", "betaal"),
        ("betalingen", "betaling"),
        // termijn
        ("termijnen", "termijn"),
        ("betaaltermijnen", "betaaltermijn"),
        ("opzegtermijnen", "opzegtermijn"),
        // factuur
        ("facturen", "factuur"),
        ("factureren", "factureer"),
        ("factureert", "factureer"),
        ("gefactureerd", "factureer"),
        // afspraak, voorwaarde
        ("afspraken", "afspraak"),
        ("voorwaarden", "voorwaarde"),
        ("inkoopvoorwaarden", "inkoopvoorwaarde"),
        // overeenkomst
        ("overeenkomsten", "overeenkomst"),
        ("contracten", "contract"),
        ("wijzigingen", "wijziging"),
        ("gewijzigd", "wijzig"),
        ("wijzigen", "wijzig"),
    ]
    .into_iter()
    .collect();
}

/// One token with its byte offsets in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Verbatim text.
    pub text: &'a str,
    /// Lowercase form.
    pub lower: String,
    /// Lemma (lookup, or the lowercase form).
    pub lemma: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset past the last character.
    pub end: usize,
}

/// Tokenize `text`.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() || is_punct(c) {
            if let Some(s) = start.take() {
                tokens.push(make_token(text, s, i));
            }
            if is_punct(c) {
                tokens.push(make_token(text, i, i + c.len_utf8()));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(make_token(text, s, text.len()));
    }

    tokens
}

/// Lemma for a lowercase word.
pub fn lemmatize(lower: &str) -> String {
    LEMMAS
        .get(lower)
        .map_or_else(|| lower.to_string(), |l| l.to_string())
}

fn is_punct(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '“' | '”' | '‘' | '’' | '–' | '—' | '…')
}

fn make_token(text: &str, start: usize, end: usize) -> Token<'_> {
    let slice = &text[start..end];
    let lower = slice.to_lowercase();
    let lemma = lemmatize(&lower);
    Token {
        text: slice,
        lower,
        lemma,
        start,
        end,
    }
}
