//! Destructive line tokenizer

use super::{Args, MAX_ARGS};

/// Start of a trailing comment
pub const COMMENT: u8 = b'#';

#[derive(Clone, Copy)]
enum State {
    Idle,
    Word(usize),
}

fn is_space(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

/// Split a NUL-terminated line into at most [`MAX_ARGS`] words
///
/// Word boundaries are overwritten with NUL inside `line`, so the original
/// text is not preserved. Scanning stops at the first NUL, at a `#`, or
/// once [`MAX_ARGS`] words have been collected; anything after that point
/// is ignored without error. Non-ASCII bytes are replaced by `?`.
pub fn tokenize(line: &mut [u8]) -> Args<'_> {
    let mut spans: heapless::Vec<(usize, usize), MAX_ARGS> = heapless::Vec::new();
    let mut state = State::Idle;
    let mut pos = 0;

    while pos < line.len() && !spans.is_full() {
        // The editor passes bytes >= 0x80 through; words must stay UTF-8
        if !line[pos].is_ascii() {
            line[pos] = b'?';
        }
        let c = line[pos];
        if c == 0 {
            break;
        }
        if c == COMMENT {
            line[pos] = 0;
            break;
        }

        match state {
            State::Idle => {
                if !is_space(c) {
                    state = State::Word(pos);
                }
            }
            State::Word(start) => {
                if is_space(c) {
                    line[pos] = 0;
                    // Cannot fail: the loop condition checked for room
                    let _ = spans.push((start, pos));
                    state = State::Idle;
                }
            }
        }
        pos += 1;
    }

    if let State::Word(start) = state {
        let _ = spans.push((start, pos));
    }

    let line: &[u8] = line;
    let mut args = Args::new();
    for (start, end) in spans {
        args.push(core::str::from_utf8(&line[start..end]).unwrap_or_default());
    }
    args
}
