//! Built-in key sets for the replay tool and tests.
//!
//! Each mode is four rows; every row requests ten key units so a 1000 px
//! keyboard gives 100 px keys.  Bottom row (characters):
//!
//! ```text
//! | ?123 | lang | , |        space        | . | enter |
//!   1.5    1      1          4 (grows)      1    1.5
//! ```

use osk_core::{KeyCode, KeyData, KeySpec, KeyboardMode};

fn alternates(chars: &str) -> Vec<KeyData> {
    chars.chars().map(KeyData::char).collect()
}

/// Popup alternates offered for a letter key.
fn popup_for(c: char) -> Vec<KeyData> {
    match c {
        'a' => alternates("áàâä"),
        'e' => alternates("éèêë3"),
        'i' => alternates("íìîï8"),
        'o' => alternates("óòôö9"),
        'u' => alternates("úùûü7"),
        'q' => alternates("1"),
        'w' => alternates("2"),
        'r' => alternates("4"),
        't' => alternates("5"),
        'y' => alternates("6"),
        'p' => alternates("0"),
        's' => alternates("ß$"),
        'n' => alternates("ñ"),
        'c' => alternates("ç"),
        _ => Vec::new(),
    }
}

fn letter_row(letters: &str) -> Vec<KeySpec> {
    letters
        .chars()
        .map(|c| KeySpec::char(c).with_popup(popup_for(c)))
        .collect()
}

fn char_row(chars: &str) -> Vec<KeySpec> {
    chars.chars().map(KeySpec::char).collect()
}

fn bottom_row(view_switch: KeyData) -> Vec<KeySpec> {
    vec![
        KeySpec::new(view_switch).with_width(1.5),
        KeySpec::new(KeyData::language_switch()),
        KeySpec::char(',').with_popup(alternates(";:")),
        KeySpec::new(KeyData::space()).with_width(4.0).growing(),
        KeySpec::char('.').with_popup(alternates("?!")),
        KeySpec::new(KeyData::new(KeyCode::ENTER, "enter")).with_width(1.5),
    ]
}

fn third_row(middle: Vec<KeySpec>) -> Vec<KeySpec> {
    std::iter::once(KeySpec::new(KeyData::shift()).with_width(1.5))
        .chain(middle)
        .chain(std::iter::once(KeySpec::new(KeyData::delete()).with_width(1.5)))
        .collect()
}

/// Key rows for `mode`.
pub fn rows_for(mode: KeyboardMode) -> Vec<Vec<KeySpec>> {
    let to_characters = KeyData::new(KeyCode::VIEW_CHARACTERS, "ABC");
    match mode {
        KeyboardMode::Characters => vec![
            letter_row("qwertyuiop"),
            letter_row("asdfghjkl"),
            third_row(letter_row("zxcvbnm")),
            bottom_row(KeyData::new(KeyCode::VIEW_SYMBOLS, "?123")),
        ],
        KeyboardMode::Symbols => vec![
            char_row("1234567890"),
            char_row("@#$%&-+()"),
            third_row(char_row("*\"':;!?")),
            bottom_row(to_characters),
        ],
        KeyboardMode::Numeric => vec![
            char_row("123").into_iter().map(|k| k.with_width(10.0 / 3.0)).collect(),
            char_row("456").into_iter().map(|k| k.with_width(10.0 / 3.0)).collect(),
            char_row("789").into_iter().map(|k| k.with_width(10.0 / 3.0)).collect(),
            vec![
                KeySpec::new(to_characters).with_width(2.5),
                KeySpec::char('0').with_width(2.5),
                KeySpec::new(KeyData::space()).with_width(2.5).growing(),
                KeySpec::new(KeyData::delete()).with_width(2.5),
            ],
        ],
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
