//! Sanitization of server-supplied text before terminal display.
//!
//! Journal entries, chat replies, quiz prompts, and card summaries all come
//! from the companion backend (and ultimately from a language model), so they
//! are untrusted. Terminal emulators interpret escape sequences that can move
//! the cursor, rewrite displayed content, set the clipboard (OSC 52), or
//! plant deceptive hyperlinks (OSC 8). Everything rendered from the network
//! goes through [`sanitize_display_text`] first.

use std::borrow::Cow;

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Strip ANSI escape sequences and control characters from untrusted text.
///
/// Removes CSI, OSC, DCS/PM/APC and two-byte escape sequences, C0 controls
/// other than `\n`, `\t`, `\r`, C1 controls, and DEL. Printable ASCII and
/// all other UTF-8 pass through. Clean input is returned borrowed.
#[must_use]
pub fn sanitize_display_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_suspect) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESC {
            skip_escape_sequence(&mut chars);
        } else if is_kept_control(c) {
            out.push(c);
        } else if c <= '\x1f' || c == '\x7f' || ('\u{0080}'..='\u{009f}').contains(&c) {
            // C1 CSI (0x9B) introduces a sequence just like ESC [ does
            if c == '\u{009b}' {
                skip_csi_params(&mut chars);
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

fn is_suspect(c: char) -> bool {
    c == ESC
        || c == BEL
        || (c <= '\x1f' && !is_kept_control(c))
        || c == '\x7f'
        || ('\u{0080}'..='\u{009f}').contains(&c)
}

fn is_kept_control(c: char) -> bool {
    matches!(c, '\n' | '\t' | '\r')
}

fn skip_escape_sequence<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) {
    let Some(&next) = chars.peek() else {
        return;
    };

    match next {
        '[' => {
            chars.next();
            skip_csi_params(chars);
        }
        ']' => {
            chars.next();
            skip_osc_sequence(chars);
        }
        'P' | '^' | '_' => {
            chars.next();
            skip_until_st(chars);
        }
        // Character-set and line-attribute selectors take one more byte
        '(' | ')' | '*' | '+' | '#' | ' ' => {
            chars.next();
            chars.next();
        }
        '7' | '8' | 'c' | 'D' | 'E' | 'H' | 'M' | 'N' | 'O' | 'Z' | '=' | '>' | '<' => {
            chars.next();
        }
        _ => {}
    }
}

/// Consume CSI parameter and intermediate bytes up to and including the
/// final byte (0x40-0x7E).
fn skip_csi_params<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) {
    while let Some(&c) = chars.peek() {
        if ('\x40'..='\x7e').contains(&c) {
            chars.next();
            return;
        } else if ('\x20'..='\x3f').contains(&c) {
            chars.next();
        } else {
            return;
        }
    }
}

/// Consume an OSC payload up to BEL or ST (`ESC \`).
fn skip_osc_sequence<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) {
    while let Some(c) = chars.next() {
        if c == BEL {
            return;
        }
        if c == ESC && chars.peek() == Some(&'\\') {
            chars.next();
            return;
        }
    }
}

fn skip_until_st<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) {
    while let Some(c) = chars.next() {
        if c == ESC && chars.peek() == Some(&'\\') {
            chars.next();
            return;
        }
    }
}
