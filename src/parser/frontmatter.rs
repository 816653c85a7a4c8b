//! Splitting a source file into its leading `---` block and the body after it.

const DELIMITER: &str = "---";

/// A source file split at its frontmatter delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    /// Text between the delimiter lines, `None` when there is no delimited block
    pub frontmatter: Option<&'a str>,
    /// Everything after the closing delimiter line, or the whole text
    pub body: &'a str,
}

/// Split `src` at a leading delimiter line and the next delimiter line.
///
/// The opening delimiter must be the first line (a UTF-8 BOM is skipped).
/// Without a closing delimiter the whole text is body.
pub fn split_frontmatter(src: &str) -> Split<'_> {
    let text = src.strip_prefix('\u{feff}').unwrap_or(src);
    let no_block = Split {
        frontmatter: None,
        body: src,
    };

    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return no_block;
    };
    if first.trim() != DELIMITER {
        return no_block;
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if line.trim() == DELIMITER {
            return Split {
                frontmatter: Some(&text[block_start..offset]),
                body: &text[offset + line.len()..],
            };
        }
        offset += line.len();
    }

    no_block
}
