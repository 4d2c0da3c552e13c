//! Reference placeholder parsing
//!
//! Two forms point at a property of a reference document:
//! - `CONFIG-REF::basename.property` - the whole value is replaced by the
//!   referenced value, whatever its type
//! - `<%CONFIG-REF-STRING::basename.property%>` - embedded in a larger
//!   string and substituted as text
//!
//! In both forms the basename ends at the first `.`; the property is
//! everything after it.

use std::collections::HashMap;
use std::ops::Range;

/// Identifier that starts every reference
pub const REF_TOKEN: &str = "CONFIG-REF";
/// Separates the token from the target
pub const REF_DELIM: &str = "::";
/// Separates basename from property
pub const BASENAME_DELIM: char = '.';
/// Opening of an inline reference
pub const INLINE_TOKEN: &str = "<%CONFIG-REF-STRING::";
/// Closing of an inline reference
pub const INLINE_DELIM: &str = "%>";

/// The `basename.property` a reference points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefTarget {
    pub basename: String,
    pub property: String,
}

impl RefTarget {
    /// Split `basename.property`; both parts must be non-empty
    pub fn parse(body: &str) -> Option<Self> {
        let (basename, property) = body.split_once(BASENAME_DELIM)?;
        if basename.is_empty() || property.is_empty() {
            return None;
        }
        Some(Self {
            basename: basename.to_string(),
            property: property.to_string(),
        })
    }
}

impl std::fmt::Display for RefTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.basename, BASENAME_DELIM, self.property)
    }
}

/// Parse a whole-value reference.
///
/// Returns `None` unless the entire string is `CONFIG-REF::basename.property`.
pub fn parse_whole(input: &str) -> Option<RefTarget> {
    input
        .strip_prefix(REF_TOKEN)?
        .strip_prefix(REF_DELIM)
        .and_then(RefTarget::parse)
}

/// Render a target back into whole-value reference form
pub fn whole_reference(target: &RefTarget) -> String {
    format!("{}{}{}", REF_TOKEN, REF_DELIM, target)
}

/// One inline reference found in a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineRef {
    /// Byte range of the whole placeholder, delimiters included
    pub span: Range<usize>,
    pub target: RefTarget,
}

impl InlineRef {
    /// The placeholder text as it appears in `input`
    pub fn matched<'a>(&self, input: &'a str) -> &'a str {
        &input[self.span.clone()]
    }
}

/// Left-to-right scanner over inline references.
///
/// Malformed occurrences (no `.`, empty basename or property) are skipped
/// and left literal. An opening token with no closing delimiter after it
/// ends the scan.
pub struct InlineScanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> InlineScanner<'a> {
    /// Create a new scanner for the given input
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl Iterator for InlineScanner<'_> {
    type Item = InlineRef;

    fn next(&mut self) -> Option<InlineRef> {
        loop {
            let start = self.pos + self.input[self.pos..].find(INLINE_TOKEN)?;
            let body_start = start + INLINE_TOKEN.len();

            let Some(body_len) = self.input[body_start..].find(INLINE_DELIM) else {
                self.pos = self.input.len();
                return None;
            };
            let body = &self.input[body_start..body_start + body_len];

            // An unclosed token followed by a complete one: restart at the inner one
            if let Some(inner) = body.find(INLINE_TOKEN) {
                self.pos = body_start + inner;
                continue;
            }

            let end = body_start + body_len + INLINE_DELIM.len();
            self.pos = end;

            match RefTarget::parse(body) {
                Some(target) => {
                    return Some(InlineRef {
                        span: start..end,
                        target,
                    });
                }
                None => {
                    log::trace!(
                        "Leaving malformed inline reference literal: {}",
                        &self.input[start..end]
                    );
                }
            }
        }
    }
}

/// Collect all inline references in a string
pub fn scan_inline(input: &str) -> Vec<InlineRef> {
    InlineScanner::new(input).collect()
}

/// Check if a string contains an inline reference opening token
pub fn contains_inline(input: &str) -> bool {
    input.contains(INLINE_TOKEN)
}

/// Replace every reference in `refs` with its text from `replacements`,
/// keyed by the matched placeholder. One pass; unmatched spans stay literal.
pub fn substitute(
    input: &str,
    refs: &[InlineRef],
    replacements: &HashMap<String, String>,
) -> String {
    let mut result = String::with_capacity(input.len());
    let mut last = 0;

    for r in refs {
        let Some(replacement) = replacements.get(r.matched(input)) else {
            continue;
        };
        result.push_str(&input[last..r.span.start]);
        result.push_str(replacement);
        last = r.span.end;
    }

    result.push_str(&input[last..]);
    result
}
