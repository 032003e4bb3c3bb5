//! PS/2 scancode set 1 tables.
//!
//! # What is scancode set 1? (for beginners)
//!
//! A keyboard reports *physical* key positions, not characters.  The numbers
//! it sends are called scancodes, and "set 1" is the encoding the original
//! IBM PC/XT used and that Windows still speaks internally.  Pressing a key
//! sends its *make* code; releasing it sends the *break* code, which the
//! device expresses as the same code with `is_key_up = true`.
//!
//! Keys added after the 83-key layout (arrows, right Ctrl, the Windows keys)
//! share make codes with older keys and are told apart by an `E0` prefix.
//! Those are marked `extended` in [`NAMED_KEYS`].
//!
//! Character mapping assumes a US layout.

/// Left Shift make code, used to type shifted characters.
pub const LEFT_SHIFT: u16 = 0x2A;

/// `(name, make code, extended)` for every named key.
pub const NAMED_KEYS: &[(&str, u16, bool)] = &[
    // ── Letters ──────────────────────────────────────────────────────────────
    ("a", 0x1E, false),
    ("b", 0x30, false),
    ("c", 0x2E, false),
    ("d", 0x20, false),
    ("e", 0x12, false),
    ("f", 0x21, false),
    ("g", 0x22, false),
    ("h", 0x23, false),
    ("i", 0x17, false),
    ("j", 0x24, false),
    ("k", 0x25, false),
    ("l", 0x26, false),
    ("m", 0x32, false),
    ("n", 0x31, false),
    ("o", 0x18, false),
    ("p", 0x19, false),
    ("q", 0x10, false),
    ("r", 0x13, false),
    ("s", 0x1F, false),
    ("t", 0x14, false),
    ("u", 0x16, false),
    ("v", 0x2F, false),
    ("w", 0x11, false),
    ("x", 0x2D, false),
    ("y", 0x15, false),
    ("z", 0x2C, false),
    // ── Top-row digits ───────────────────────────────────────────────────────
    ("1", 0x02, false),
    ("2", 0x03, false),
    ("3", 0x04, false),
    ("4", 0x05, false),
    ("5", 0x06, false),
    ("6", 0x07, false),
    ("7", 0x08, false),
    ("8", 0x09, false),
    ("9", 0x0A, false),
    ("0", 0x0B, false),
    // ── Punctuation ──────────────────────────────────────────────────────────
    ("-", 0x0C, false),
    ("minus", 0x0C, false),
    ("=", 0x0D, false),
    ("equal", 0x0D, false),
    ("[", 0x1A, false),
    ("]", 0x1B, false),
    ("\\", 0x2B, false),
    ("backslash", 0x2B, false),
    (";", 0x27, false),
    ("semicolon", 0x27, false),
    ("'", 0x28, false),
    ("quote", 0x28, false),
    ("`", 0x29, false),
    ("grave", 0x29, false),
    (",", 0x33, false),
    ("comma", 0x33, false),
    (".", 0x34, false),
    ("period", 0x34, false),
    ("/", 0x35, false),
    ("slash", 0x35, false),
    // ── Control keys ─────────────────────────────────────────────────────────
    ("space", 0x39, false),
    ("enter", 0x1C, false),
    ("tab", 0x0F, false),
    ("backspace", 0x0E, false),
    ("escape", 0x01, false),
    ("esc", 0x01, false),
    ("capslock", 0x3A, false),
    // ── Modifiers ────────────────────────────────────────────────────────────
    ("shift", 0x2A, false),
    ("lshift", 0x2A, false),
    ("rshift", 0x36, false),
    ("ctrl", 0x1D, false),
    ("lctrl", 0x1D, false),
    ("rctrl", 0x1D, true),
    ("alt", 0x38, false),
    ("lalt", 0x38, false),
    ("ralt", 0x38, true),
    ("win", 0x5B, true),
    ("lwin", 0x5B, true),
    ("rwin", 0x5C, true),
    ("apps", 0x5D, true),
    // ── Function keys ────────────────────────────────────────────────────────
    ("f1", 0x3B, false),
    ("f2", 0x3C, false),
    ("f3", 0x3D, false),
    ("f4", 0x3E, false),
    ("f5", 0x3F, false),
    ("f6", 0x40, false),
    ("f7", 0x41, false),
    ("f8", 0x42, false),
    ("f9", 0x43, false),
    ("f10", 0x44, false),
    ("f11", 0x57, false),
    ("f12", 0x58, false),
    // ── Navigation (E0-prefixed) ─────────────────────────────────────────────
    ("up", 0x48, true),
    ("down", 0x50, true),
    ("left", 0x4B, true),
    ("right", 0x4D, true),
    ("home", 0x47, true),
    ("end", 0x4F, true),
    ("pageup", 0x49, true),
    ("pagedown", 0x51, true),
    ("insert", 0x52, true),
    ("delete", 0x53, true),
    ("printscreen", 0x37, true),
    ("pause", 0x45, false),
];

/// Looks up a named key.  Case-insensitive; surrounding whitespace ignored.
pub fn lookup(name: &str) -> Option<(u16, bool)> {
    let name = name.trim();
    NAMED_KEYS
        .iter()
        .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, code, extended)| (code, extended))
}

/// Maps a character to `(make code, needs_shift)` on a US layout.
///
/// None of the typeable characters are extended keys.
pub fn char_to_scancode(ch: char) -> Option<(u16, bool)> {
    match ch {
        ' ' => Some((0x39, false)),
        '\n' => Some((0x1C, false)),
        '\t' => Some((0x0F, false)),
        'A'..='Z' => unshifted(ch.to_ascii_lowercase()).map(|code| (code, true)),
        _ => match unshifted(ch) {
            Some(code) => Some((code, false)),
            None => shifted_base(ch).and_then(unshifted).map(|code| (code, true)),
        },
    }
}

fn unshifted(ch: char) -> Option<u16> {
    if !ch.is_ascii_graphic() || ch.is_ascii_uppercase() {
        return None;
    }
    let mut buf = [0u8; 4];
    lookup(ch.encode_utf8(&mut buf)).map(|(code, _)| code)
}

/// The unshifted character that shares a key with `ch`.
fn shifted_base(ch: char) -> Option<char> {
    let base = match ch {
        '!' => '1',
        '@' => '2',
        '#' => '3',
        '$' => '4',
        '%' => '5',
        '^' => '6',
        '&' => '7',
        '*' => '8',
        '(' => '9',
        ')' => '0',
        '_' => '-',
        '+' => '=',
        '{' => '[',
        '}' => ']',
        '|' => '\\',
        ':' => ';',
        '"' => '\'',
        '~' => '`',
        '<' => ',',
        '>' => '.',
        '?' => '/',
        _ => return None,
    };
    Some(base)
}
