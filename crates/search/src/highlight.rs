//! Snippet extraction and match highlighting
//!
//! Builds the `content_preview` window around the first occurrence of the
//! query and the line-oriented [`MatchSpan`] list, one span per matching
//! line, with the matched substring wrapped in `**` markers.

use inkstone_core::error::{Error, Result};
use inkstone_core::search_types::{MatchSpan, SearchOptions};
use regex::{Regex, RegexBuilder};

/// Compiled query matcher honoring the per-query match-mode options
///
/// All modes compile down to one regex: literal queries are escaped,
/// whole-word mode adds word boundaries, and `use_regex` passes the query
/// through as a pattern. An unparseable pattern is [`Error::InvalidQuery`].
#[derive(Debug)]
pub struct QueryMatcher {
    regex: Regex,
}

impl QueryMatcher {
    /// Compile a matcher for a query under the given options
    pub fn new(query: &str, options: &SearchOptions) -> Result<Self> {
        let pattern = if options.use_regex {
            query.to_string()
        } else if options.whole_words {
            format!(r"\b{}\b", regex::escape(query))
        } else {
            regex::escape(query)
        };

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!options.case_sensitive)
            .build()
            .map_err(|e| Error::InvalidQuery(e.to_string()))?;

        Ok(QueryMatcher { regex })
    }

    /// Byte range of the first match in `text`
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        self.regex.find(text).map(|m| (m.start(), m.end()))
    }
}

/// Bounded window of content around the first match
///
/// Falls back to the head of the content when nothing matches. Truncated
/// edges are marked with an ellipsis.
pub fn content_preview(content: &str, matcher: &QueryMatcher, window: usize) -> String {
    if content.is_empty() || window == 0 {
        return String::new();
    }

    let chars: Vec<char> = content.chars().collect();
    let (start_char, end_char) = match matcher.find(content) {
        Some((start_byte, end_byte)) => {
            let start = content[..start_byte].chars().count();
            let end = start + content[start_byte..end_byte].chars().count();
            let margin = window.saturating_sub(end - start) / 2;
            let from = start.saturating_sub(margin);
            (from, (from + window).min(chars.len()))
        }
        None => (0, window.min(chars.len())),
    };

    let mut preview = String::new();
    if start_char > 0 {
        preview.push_str("...");
    }
    preview.extend(&chars[start_char..end_char]);
    if end_char < chars.len() {
        preview.push_str("...");
    }
    preview
}

/// Line-oriented match scan, one span per matching line
///
/// `context_lines` leading/trailing lines are attached when
/// `include_context` is set. Offsets within the span are character offsets
/// into the line.
pub fn line_matches(
    content: &str,
    matcher: &QueryMatcher,
    context_lines: usize,
    include_context: bool,
) -> Vec<MatchSpan> {
    let lines: Vec<&str> = content.lines().collect();
    let mut spans = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some((start_byte, end_byte)) = matcher.find(line) else {
            continue;
        };

        let match_start = line[..start_byte].chars().count();
        let match_end = match_start + line[start_byte..end_byte].chars().count();

        let highlighted = format!(
            "{}**{}**{}",
            &line[..start_byte],
            &line[start_byte..end_byte],
            &line[end_byte..]
        );

        let (context_before, context_after) = if include_context {
            let before_from = idx.saturating_sub(context_lines);
            let after_to = (idx + 1 + context_lines).min(lines.len());
            (
                lines[before_from..idx].join("\n"),
                lines[idx + 1..after_to].join("\n"),
            )
        } else {
            (String::new(), String::new())
        };

        spans.push(MatchSpan {
            line_number: (idx + 1) as u32,
            line_content: (*line).to_string(),
            match_start,
            match_end,
            context_before,
            context_after,
            highlighted,
        });
    }

    spans
}
