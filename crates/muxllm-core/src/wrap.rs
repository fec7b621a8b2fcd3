//! Incremental word-boundary wrapping for streamed text
//!
//! Network deltas arrive with no alignment to words or lines: a chunk can end
//! in the middle of a word that the next chunk will extend. `StreamingWrapper`
//! buffers exactly the unresolved tail and emits fully wrapped lines as soon
//! as they are safe to show, so the popup never displays a word prefix that
//! later input would have grown.
//!
//! IMPORTANT: widths are unicode display columns, not byte or char counts.
//! Wide characters (CJK, emoji) count 2, control characters count 0.

use unicode_width::UnicodeWidthStr;

/// Stateful word-boundary wrapper for one response stream.
///
/// Create one instance per stream with a fixed interior width, call
/// [`feed`](Self::feed) for every fragment as it arrives, and
/// [`flush`](Self::flush) exactly once after the stream ends. Instances are
/// not reusable across streams.
#[derive(Debug)]
pub struct StreamingWrapper {
    /// Interior line width in display columns, excluding the margin.
    width: usize,
    /// Received characters whose trailing word/separator run is still
    /// unresolved. Never contains anything already emitted.
    pending: String,
    /// Resolved tokens accumulated for the line being built, not yet emitted.
    line: String,
    /// Display columns committed to `line`, excluding the margin. Reset to 0
    /// whenever a line is emitted.
    column: usize,
    /// True once the first character of output has been produced. The single
    /// margin space is prepended at that point, once per stream.
    started: bool,
}

impl StreamingWrapper {
    /// Create a wrapper targeting `width` interior columns.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            pending: String::new(),
            line: String::new(),
            column: 0,
            started: false,
        }
    }

    /// Interior width this wrapper was built with.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Add a fragment and return every line that became complete.
    ///
    /// The fragment may be empty, a single character, or arbitrarily long,
    /// and may start or end mid-word. Returned lines are each terminated by a
    /// newline; the return value is empty when nothing became emittable. A
    /// word or separator run is only moved out of the internal buffer once a
    /// following character of the opposite class (or a newline) confirms its
    /// end, so the return value never contains text that future input could
    /// still extend.
    pub fn feed(&mut self, fragment: &str) -> String {
        if fragment.is_empty() {
            return String::new();
        }
        self.pending.push_str(fragment);
        let mut out = String::new();
        self.drain_resolved(&mut out);
        out
    }

    /// Finish the stream and return whatever remains.
    ///
    /// The end of input resolves the buffered tail unconditionally. The
    /// width-overflow rule is applied one last time, so the result may
    /// contain complete lines, but the final line carries no trailing
    /// newline. Safe to call on an empty or already-flushed wrapper, which
    /// yields an empty string.
    pub fn flush(&mut self) -> String {
        let mut out = String::new();
        self.drain_resolved(&mut out);
        let tail = std::mem::take(&mut self.pending);
        if !tail.is_empty() {
            self.commit_token(&tail, &mut out);
        }
        out.push_str(&self.line);
        self.line.clear();
        self.column = 0;
        out
    }

    /// Move every resolved token out of `pending`, re-scanning from the front
    /// (a known-resolved boundary) after each token instead of tracking
    /// indices across iterations.
    fn drain_resolved(&mut self, out: &mut String) {
        loop {
            let Some(first) = self.pending.chars().next() else {
                return;
            };
            if first == '\n' {
                // Line break with no token in front of it.
                self.pending.drain(..1);
                self.finish_line(out);
                continue;
            }
            let first_is_word = !first.is_whitespace();
            let mut resolved = None;
            for (idx, ch) in self.pending.char_indices().skip(1) {
                if ch == '\n' {
                    resolved = Some((idx, true));
                    break;
                }
                if !ch.is_whitespace() != first_is_word {
                    resolved = Some((idx, false));
                    break;
                }
            }
            // The trailing run has no end boundary yet; leave it buffered.
            let Some((end, at_newline)) = resolved else {
                return;
            };
            let token: String = self.pending.drain(..end).collect();
            self.commit_token(&token, out);
            if at_newline {
                self.pending.drain(..1);
                self.finish_line(out);
            }
        }
    }

    /// Append one resolved token to the current line, breaking the line first
    /// if the token would not fit. A token wider than the whole line is still
    /// kept intact and placed on a line of its own.
    fn commit_token(&mut self, token: &str, out: &mut String) {
        let token_width = UnicodeWidthStr::width(token);
        if self.column > 0 && self.column + token_width > self.width {
            self.finish_line(out);
        }
        self.ensure_margin();
        self.line.push_str(token);
        self.column += token_width;
    }

    /// Emit the current line, newline-terminated, and reset the column.
    fn finish_line(&mut self, out: &mut String) {
        self.ensure_margin();
        out.push_str(&self.line);
        out.push('\n');
        self.line.clear();
        self.column = 0;
    }

    /// Prepend the one-per-stream margin space ahead of the first output.
    fn ensure_margin(&mut self) {
        if !self.started {
            self.line.push(' ');
            self.started = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run a whole text through one wrapper in a single feed plus flush.
    fn wrap_all(width: usize, text: &str) -> String {
        let mut wrapper = StreamingWrapper::new(width);
        let mut out = wrapper.feed(text);
        out.push_str(&wrapper.flush());
        out
    }

    /// Interior width of an emitted line: margin stripped from the first one.
    fn interior_widths(output: &str) -> Vec<usize> {
        output
            .split('\n')
            .enumerate()
            .map(|(i, line)| {
                let line = if i == 0 {
                    line.strip_prefix(' ').unwrap_or(line)
                } else {
                    line
                };
                UnicodeWidthStr::width(line)
            })
            .collect()
    }

    #[test]
    fn test_single_fragment_wraps_at_word_boundaries() {
        let mut wrapper = StreamingWrapper::new(10);
        let fed = wrapper.feed("a longer line of text");
        assert_eq!(fed, " a longer \n");
        assert_eq!(wrapper.flush(), "line of \ntext");
    }

    #[test]
    fn test_fragments_never_emit_partial_words() {
        let mut wrapper = StreamingWrapper::new(40);
        assert_eq!(wrapper.feed("The quick br"), "");
        assert_eq!(wrapper.feed("own fox jum"), "");
        assert_eq!(wrapper.feed("ps."), "");
        assert_eq!(wrapper.flush(), " The quick brown fox jumps.");
    }

    #[test]
    fn test_empty_fragment_is_a_no_op() {
        let mut with_empty = StreamingWrapper::new(10);
        assert_eq!(with_empty.feed(""), "");
        let mut fed = with_empty.feed("hello wor");
        assert_eq!(with_empty.feed(""), "");
        fed.push_str(&with_empty.feed("ld again"));
        fed.push_str(&with_empty.flush());

        let mut plain = StreamingWrapper::new(10);
        let mut expected = plain.feed("hello wor");
        expected.push_str(&plain.feed("ld again"));
        expected.push_str(&plain.flush());

        assert_eq!(fed, expected);
    }

    #[test]
    fn test_newline_forces_line_break() {
        let mut wrapper = StreamingWrapper::new(40);
        assert_eq!(wrapper.feed("one two\nthree"), " one two\n");
        assert_eq!(wrapper.flush(), "three");
    }

    #[test]
    fn test_leading_newline_still_carries_margin() {
        let mut wrapper = StreamingWrapper::new(40);
        assert_eq!(wrapper.feed("\nhi"), " \n");
        assert_eq!(wrapper.flush(), "hi");
    }

    #[test]
    fn test_consecutive_newlines_preserved() {
        let mut wrapper = StreamingWrapper::new(10);
        assert_eq!(wrapper.feed("a\n\nb\n"), " a\n\nb\n");
        assert_eq!(wrapper.flush(), "");
    }

    #[test]
    fn test_margin_on_first_line_only() {
        let output = wrap_all(10, "a longer line of text");
        let lines: Vec<&str> = output.split('\n').collect();
        assert!(lines[0].starts_with(' '));
        for line in &lines[1..] {
            assert!(!line.starts_with("  "), "unexpected extra margin: {:?}", line);
        }
    }

    #[test]
    fn test_token_wider_than_line_stays_intact() {
        let mut wrapper = StreamingWrapper::new(5);
        let fed = wrapper.feed("ab supercalifragilistic cd");
        assert_eq!(fed, " ab \nsupercalifragilistic\n");
        assert_eq!(wrapper.flush(), " cd");
    }

    #[test]
    fn test_exact_width_fits_without_break() {
        // "abc" + " " + "de" is exactly six columns.
        assert_eq!(wrap_all(6, "abc de"), " abc de");
    }

    #[test]
    fn test_no_output_for_unbroken_word_until_flush() {
        let mut wrapper = StreamingWrapper::new(6);
        for _ in 0..8 {
            assert_eq!(wrapper.feed("aaaa"), "");
        }
        assert_eq!(wrapper.flush(), format!(" {}", "aaaa".repeat(8)));
    }

    #[test]
    fn test_whitespace_only_stream() {
        let mut wrapper = StreamingWrapper::new(10);
        assert_eq!(wrapper.feed("   "), "");
        assert_eq!(wrapper.flush(), "    ");
    }

    #[test]
    fn test_flush_on_empty_state_returns_empty() {
        let mut wrapper = StreamingWrapper::new(10);
        assert_eq!(wrapper.flush(), "");
        assert_eq!(wrapper.flush(), "");
    }

    #[test]
    fn test_flush_after_flush_is_empty() {
        let mut wrapper = StreamingWrapper::new(10);
        wrapper.feed("some words here");
        wrapper.flush();
        assert_eq!(wrapper.flush(), "");
    }

    #[test]
    fn test_crlf_is_preserved() {
        let mut wrapper = StreamingWrapper::new(10);
        assert_eq!(wrapper.feed("foo\r\nbar"), " foo\r\n");
        assert_eq!(wrapper.flush(), "bar");
    }

    #[test]
    fn test_wide_characters_count_two_columns() {
        // Two full-width characters already fill a width of four.
        assert_eq!(wrap_all(4, "ああ a"), " ああ\n a");
    }

    #[test]
    fn test_output_identical_for_any_fragmentation() {
        let text = "The quick brown fox jumps over the lazy dog.\n\
                    Second line here with more words to wrap around.";
        let whole = wrap_all(12, text);
        let chars: Vec<char> = text.chars().collect();
        for chunk_len in 1..=chars.len() {
            let mut wrapper = StreamingWrapper::new(12);
            let mut out = String::new();
            for chunk in chars.chunks(chunk_len) {
                let fragment: String = chunk.iter().collect();
                out.push_str(&wrapper.feed(&fragment));
            }
            out.push_str(&wrapper.flush());
            assert_eq!(out, whole, "diverged at chunk_len {}", chunk_len);
        }
    }

    #[test]
    fn test_reassembly_drops_no_characters() {
        let text = "  spaced   out\ttext with\u{00a0}odd   whitespace and \
                    averyveryverylongunbrokenword trailing bits\n end";
        for width in 5..30 {
            let output = wrap_all(width, text);
            // Remove the margin (first output character) and every line
            // break; what remains must be the input minus its own newlines.
            let reconstructed: String = output[1..].chars().filter(|c| *c != '\n').collect();
            let input_wo_newlines: String = text.chars().filter(|c| *c != '\n').collect();
            assert_eq!(reconstructed, input_wo_newlines, "width {}", width);
        }
    }

    #[test]
    fn test_width_bound_holds_or_token_is_oversized() {
        let text = "a few short words and one enormousunbreakabletoken plus more text";
        for width in 4..24 {
            let output = wrap_all(width, text);
            for (line, interior) in output.split('\n').zip(interior_widths(&output)) {
                if interior > width {
                    // Only a single token wider than the line may exceed it.
                    assert_eq!(
                        line.trim().split_whitespace().count(),
                        1,
                        "width {} line {:?}",
                        width,
                        line
                    );
                }
            }
        }
    }
}
