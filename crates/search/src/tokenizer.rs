//! Text tokenization with provenance
//!
//! Splits text on non-alphanumeric boundaries into lowercased terms, each
//! carrying the character offset where it starts. Ideographic scripts have no
//! whitespace word boundaries, so contiguous CJK runs fall back to one token
//! per character. Total function: no failure mode, empty input yields an
//! empty sequence.

/// One term with its character offset into the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lowercased term
    pub term: String,
    /// Character offset where the term starts
    pub offset: u32,
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4e00}'..='\u{9fff}'     // CJK Unified Ideographs
        | '\u{3400}'..='\u{4dbf}'   // Extension A
        | '\u{f900}'..='\u{faff}'   // Compatibility Ideographs
    )
}

/// Tokenize text into `(term, offset)` pairs
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut run = String::new();
    let mut run_start = 0u32;

    let flush = |run: &mut String, run_start: u32, tokens: &mut Vec<Token>| {
        if !run.is_empty() {
            tokens.push(Token {
                term: std::mem::take(run),
                offset: run_start,
            });
        }
    };

    for (i, c) in text.chars().enumerate() {
        let offset = i as u32;
        if is_cjk(c) {
            flush(&mut run, run_start, &mut tokens);
            tokens.push(Token {
                term: c.to_string(),
                offset,
            });
        } else if c.is_alphanumeric() {
            if run.is_empty() {
                run_start = offset;
            }
            run.extend(c.to_lowercase());
        } else {
            flush(&mut run, run_start, &mut tokens);
        }
    }
    flush(&mut run, run_start, &mut tokens);

    tokens
}

/// Tokenize and deduplicate for query processing, preserving first-seen order
pub fn tokenize_unique(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tokenize(text)
        .into_iter()
        .map(|t| t.term)
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
