//! Greedy word wrap against a measured face.

use crate::layout::face::FontFace;
use crate::render::tree::Weight;

/// Splits `text` into lines no wider than `max_width`.
///
/// Words are separated by whitespace and never broken; a single word wider than
/// the line gets a line of its own. Explicit newlines start a new line.
pub fn wrap_lines(
    text: &str,
    face: &dyn FontFace,
    size: f32,
    weight: Weight,
    max_width: f32,
) -> Vec<String> {
    let space_w = face.measure(" ", size, weight);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in words {
            let word_w = face.measure(word, size, weight);
            if current.is_empty() {
                current.push_str(word);
                current_width = word_w;
            } else if current_width + space_w + word_w > max_width {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_width += space_w + word_w;
            }
        }
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::face::BlockFace;

    // BlockFace at size 10 is 5px per character.

    #[test]
    fn test_short_text_is_one_line() {
        let lines = wrap_lines("hello world", &BlockFace, 10.0, Weight::Regular, 100.0);
        assert_eq!(lines, vec!["hello world"]);
    }

    #[test]
    fn test_wraps_on_word_boundary() {
        // "aaaa bbbb" is 45px; 40px forces a break
        let lines = wrap_lines("aaaa bbbb cc", &BlockFace, 10.0, Weight::Regular, 40.0);
        assert_eq!(lines, vec!["aaaa", "bbbb cc"]);
    }

    #[test]
    fn test_overlong_word_gets_own_line() {
        let lines = wrap_lines("a verylongword b", &BlockFace, 10.0, Weight::Regular, 30.0);
        assert_eq!(lines, vec!["a", "verylongword", "b"]);
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert!(wrap_lines("", &BlockFace, 10.0, Weight::Regular, 30.0).is_empty());
        assert!(wrap_lines("   \n  ", &BlockFace, 10.0, Weight::Regular, 30.0).is_empty());
    }

    #[test]
    fn test_newlines_start_new_lines() {
        let lines = wrap_lines("one\ntwo", &BlockFace, 10.0, Weight::Regular, 500.0);
        assert_eq!(lines, vec!["one", "two"]);
    }
}
