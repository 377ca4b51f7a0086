use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// CSI sequences with numeric parameters, e.g. `\x1b[2K`, `\x1b[1;32m`.
    static ref CSI: Regex = Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap();

    /// CSI (including private `?` modes) and OSC title sequences.
    static ref TERMINAL_CONTROL: Regex =
        Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)").unwrap();
}

/// Remove numeric CSI escape sequences.
pub fn strip_ansi(text: &str) -> String {
    CSI.replace_all(text, "").into_owned()
}

/// Remove every control sequence a terminal UI commonly emits, including
/// cursor visibility toggles and window title updates.
pub fn strip_terminal_control(text: &str) -> String {
    TERMINAL_CONTROL.replace_all(text, "").into_owned()
}

/// Box-drawing block, U+2500..=U+257F.
pub fn is_box_drawing(c: char) -> bool {
    ('\u{2500}'..='\u{257F}').contains(&c)
}

pub fn contains_box_drawing(text: &str) -> bool {
    text.chars().any(is_box_drawing)
}
