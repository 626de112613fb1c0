//! Transcript normalization.
//!
//! Captured transcripts reach us with carriage returns, screen clears and
//! escape sequences whose introducer byte was dropped or rewritten on the
//! way (`[31m` or `^[[31m` instead of `ESC[31m`). Normalization folds all of
//! these into one shape so the renderer only has to know `ESC[...m`.
//!
//! Restoring a lost introducer is a heuristic: a bare `[1;32m` in the middle
//! of ordinary prose would be read as a color change too.

use once_cell::sync::Lazy;
use regex::Regex;

/// Cursor movement and screen/line clears, with the escape byte, in caret
/// notation, or with the introducer lost.
static CURSOR_CONTROL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\x1b|\^\[)?\[[0-9;?]*[HJK]").unwrap());

/// A line opening with a cursor/clear sequence whose escape byte was lost.
/// Whatever follows on that line is a redraw artifact.
static REDRAW_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:\^\[)?\[[0-9;?]*[HJK].*$").unwrap());

static SGR_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\x1b|\^\[)?\[([0-9]+(?:;[0-9]+)*)m").unwrap());

static WHITESPACE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]+$").unwrap());

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Decode transcript bytes.
///
/// Valid UTF-8 is taken as is. Otherwise the valid runs are kept and every
/// invalid byte becomes the code point of the same value, so a badly encoded
/// console log is garbled locally instead of rejected.
pub fn decode_transcript(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_owned();
    }

    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
        out.extend(chunk.invalid().iter().map(|&b| char::from(b)));
    }
    out
}

/// Decode and normalize raw entry bytes.
pub fn normalize_bytes(bytes: &[u8]) -> String {
    normalize(&decode_transcript(bytes))
}

/// Normalize transcript text.
///
/// Applying it twice gives the same result as applying it once.
pub fn normalize(text: &str) -> String {
    let text = text.replace('\r', "");
    let text = REDRAW_LINE.replace_all(&text, "").into_owned();
    let text = strip_cursor_controls(&text);
    let text = SGR_FRAGMENT.replace_all(&text, "\x1b[${1}m");
    let text = WHITESPACE_LINE.replace_all(&text, "");
    BLANK_RUN.replace_all(&text, "\n\n").into_owned()
}

/// Remove every cursor/clear sequence in one pass.
///
/// Removing one sequence can join its neighbours into a new one
/// (`[[2JK` leaves `[K`). Instead of rescanning the whole text, each final
/// byte is checked against the tail of the output built so far, which never
/// contains a complete sequence. Every input byte is pushed and removed at
/// most once.
fn strip_cursor_controls(text: &str) -> String {
    if !CURSOR_CONTROL.is_match(text) {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    // run_start[i]: start of the parameter run ending at byte i of `out`,
    // or i + 1 when byte i is not a parameter byte
    let mut run_start: Vec<usize> = Vec::with_capacity(text.len());

    for ch in text.chars() {
        if matches!(ch, 'H' | 'J' | 'K') {
            if let Some(start) = control_start(out.as_bytes(), &run_start) {
                out.truncate(start);
                run_start.truncate(start);
                continue;
            }
        }

        let at = out.len();
        out.push(ch);
        let start = if is_parameter(ch) {
            match at.checked_sub(1) {
                Some(prev) if is_parameter(char::from(out.as_bytes()[prev])) => run_start[prev],
                _ => at,
            }
        } else {
            out.len()
        };
        run_start.resize(out.len(), start);
    }

    out
}

fn is_parameter(ch: char) -> bool {
    matches!(ch, '0'..='9' | ';' | '?')
}

/// Where a cursor/clear sequence would start if a final byte were appended
/// to `out`, including its `ESC` or `^[` introducer.
fn control_start(out: &[u8], run_start: &[usize]) -> Option<usize> {
    let params = match out.len().checked_sub(1) {
        Some(last) if is_parameter(char::from(out[last])) => run_start[last],
        _ => out.len(),
    };
    let open = params.checked_sub(1)?;
    if out[open] != b'[' {
        return None;
    }

    if open >= 1 && out[open - 1] == 0x1b {
        Some(open - 1)
    } else if open >= 2 && &out[open - 2..open] == b"^[" {
        Some(open - 2)
    } else {
        Some(open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_carriage_returns() {
        assert_eq!(normalize("one\r\ntwo\r\n"), "one\ntwo\n");
    }

    #[test]
    fn test_restores_lost_introducer() {
        assert_eq!(normalize("[31mred[0m"), "\x1b[31mred\x1b[0m");
        assert_eq!(normalize("[1;32mok[0m"), "\x1b[1;32mok\x1b[0m");
    }

    #[test]
    fn test_restores_caret_notation() {
        assert_eq!(normalize("^[[1mbold^[[0m"), "\x1b[1mbold\x1b[0m");
    }

    #[test]
    fn test_keeps_canonical_sequences() {
        let text = "\x1b[33mwarn\x1b[0m plain";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_strips_screen_clears() {
        assert_eq!(normalize("\x1b[2J\x1b[Htitle\x1b[K"), "title");
        assert_eq!(normalize("a\x1b[1;1Hb"), "ab");
    }

    #[test]
    fn test_drops_bare_redraw_lines() {
        assert_eq!(normalize("keep\n[2K spinner 10%\nend"), "keep\n\nend");
        assert_eq!(normalize("keep\n^[[2K spinner\nend"), "keep\n\nend");
    }

    #[test]
    fn test_strips_sequences_exposed_by_removal() {
        assert_eq!(normalize("x[[2JKy"), "xy");
    }

    #[test]
    fn test_deep_nesting_is_stripped_in_one_pass() {
        let n = 200_000;
        let nested = format!("{}2J{}", "[".repeat(n), "K".repeat(n));

        let started = std::time::Instant::now();
        assert_eq!(strip_cursor_controls(&nested), "");
        assert_eq!(normalize(&format!("a{nested}b")), "ab");
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn test_long_parameter_run_is_not_rescanned() {
        let n = 100_000;
        let text = format!("{}{}", "1".repeat(n), "[2JK".repeat(n));

        let started = std::time::Instant::now();
        let out = strip_cursor_controls(&text);
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(out, format!("{}{}", "1".repeat(n), "K".repeat(n)));
        assert!(!CURSOR_CONTROL.is_match(&out));
    }

    #[test]
    fn test_strip_keeps_introducers_with_their_sequence() {
        assert_eq!(strip_cursor_controls("a\x1b[2Kb^[[Hc"), "abc");
        assert_eq!(strip_cursor_controls("^[2J"), "^");
        assert_eq!(strip_cursor_controls("\x1b[[1;2H"), "\x1b[");
        assert_eq!(strip_cursor_controls("é[?25Hü"), "éü");
    }

    #[test]
    fn test_collapses_blank_lines() {
        assert_eq!(normalize("a\n  \n\t\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_decode_falls_back_per_byte() {
        assert_eq!(decode_transcript(b"ok"), "ok");
        assert_eq!(decode_transcript(b"ok\xff"), "ok\u{ff}");
        assert_eq!(decode_transcript(b"\xc3\xa9\x80"), "é\u{80}");
    }

    #[test]
    fn test_normalize_bytes_with_invalid_utf8() {
        assert_eq!(normalize_bytes(b"[32mup\xfe\r\n"), "\x1b[32mup\u{fe}\n");
    }

    #[test]
    fn test_idempotent_on_noisy_sample() {
        let sample = "\x1b[2J\x1b[H[1;36m== Basic ==[0m\r\n\n\n\n  \n[2K redraw\ncpu: ^[[32mok^[[0m\n";
        let once = normalize(sample);
        assert_eq!(normalize(&once), once);
    }
}
