//! Word reconstruction from positioned text fragments.
//!
//! Backends do not always report the pieces of a word in lexical order (some
//! PDFs draw glyphs in arbitrary order, or split one word into several runs).
//! This module re-orders fragments by position, re-joins pieces that belong to
//! the same word and numbers the resulting lines.

use crate::extraction::WordToken;
use std::cmp::Ordering;

/// Axis-aligned rectangle in PDF user space (origin top-left, y grows down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Rect { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Zero or negative width or height.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Whether `other` lies fully inside this rectangle (edges included).
    pub fn contains(&self, other: &Rect) -> bool {
        other.x0 >= self.x0 && other.y0 >= self.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }
}

/// A word rebuilt from one or more fragments, with its line number.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedWord {
    pub rect: Rect,
    pub text: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconstructOptions {
    /// Maximum difference between fragment bottoms (`y1`) for them to share a
    /// line. `0.0` groups by exact equality.
    pub line_tolerance: f32,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        ReconstructOptions {
            line_tolerance: 0.0,
        }
    }
}

/// Rebuild words in reading order from unordered fragments.
///
/// Only fragments fully inside `region` are considered (all of them when
/// `region` is `None`). Degenerate boxes and empty fragments are dropped.
/// The result does not depend on the order of `tokens`.
pub fn reconstruct_words(
    tokens: &[WordToken],
    region: Option<&Rect>,
    options: &ReconstructOptions,
) -> Vec<ReconstructedWord> {
    let mut fragments: Vec<&WordToken> = tokens
        .iter()
        .filter(|t| !t.rect.is_degenerate() && !t.text.is_empty())
        .filter(|t| region.is_none_or(|r| r.contains(&t.rect)))
        .collect();

    fragments.sort_by(|a, b| {
        a.rect
            .y1
            .total_cmp(&b.rect.y1)
            .then_with(|| a.rect.x0.total_cmp(&b.rect.x0))
            .then_with(|| tie_break(a, b))
    });

    let tolerance = options.line_tolerance.max(0.0);
    let mut merged = Vec::new();
    for mut line in group_lines(&fragments, tolerance) {
        // Within a tolerance band, bottoms may differ; restore left-to-right order.
        line.sort_by(|a, b| a.rect.x0.total_cmp(&b.rect.x0).then_with(|| tie_break(a, b)));
        let baseline = line[0].rect.y1;
        merged.extend(merge_line(&line).into_iter().map(|w| (baseline, w)));
    }

    assign_lines(merged)
}

fn tie_break(a: &WordToken, b: &WordToken) -> Ordering {
    a.rect
        .x1
        .total_cmp(&b.rect.x1)
        .then_with(|| a.rect.y0.total_cmp(&b.rect.y0))
        .then_with(|| a.text.cmp(&b.text))
}

/// Split sorted fragments into runs sharing the same bottom coordinate.
fn group_lines<'a>(fragments: &[&'a WordToken], tolerance: f32) -> Vec<Vec<&'a WordToken>> {
    let mut lines: Vec<Vec<&WordToken>> = Vec::new();
    for &fragment in fragments {
        match lines.last_mut() {
            Some(line) if (fragment.rect.y1 - line[0].rect.y1).abs() <= tolerance => {
                line.push(fragment)
            }
            _ => lines.push(vec![fragment]),
        }
    }
    lines
}

/// Join fragments of one line whose gap is under a fifth of the next
/// fragment's average character width.
fn merge_line(line: &[&WordToken]) -> Vec<(Rect, String)> {
    let mut words = Vec::new();
    let mut iter = line.iter();
    let Some(first) = iter.next() else {
        return words;
    };

    let mut rect = first.rect;
    let mut text = first.text.clone();

    for fragment in iter {
        let chars = fragment.text.chars().count().max(1) as f32;
        let threshold = fragment.rect.width() / chars / 5.0;
        if fragment.rect.x0 <= rect.x1 + threshold {
            text.push_str(&fragment.text);
            rect.x1 = fragment.rect.x1;
            rect.y0 = rect.y0.max(fragment.rect.y0);
            continue;
        }

        words.push((rect, std::mem::take(&mut text)));
        rect = fragment.rect;
        text = fragment.text.clone();
    }

    words.push((rect, text));
    words
}

/// Number lines by walking words in vertical order, starting a new line
/// whenever the baseline changes.
fn assign_lines(mut words: Vec<(f32, (Rect, String))>) -> Vec<ReconstructedWord> {
    words.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut out = Vec::with_capacity(words.len());
    let mut line = 0;
    let mut previous: Option<f32> = None;

    for (baseline, (rect, text)) in words {
        if previous.is_some_and(|p| p != baseline) {
            line += 1;
        }
        previous = Some(baseline);
        out.push(ReconstructedWord { rect, text, line });
    }

    out
}

/// Flatten reconstructed words into page text: words separated by single
/// spaces, every line terminated by a newline.
pub fn words_to_text(words: &[ReconstructedWord]) -> String {
    let mut text = String::new();
    let mut current_line = None;

    for word in words {
        match current_line {
            Some(line) if line == word.line => text.push(' '),
            Some(_) => text.push('\n'),
            None => {}
        }
        text.push_str(&word.text);
        current_line = Some(word.line);
    }

    if !text.is_empty() {
        text.push('\n');
    }
    text
}

/// Boxes of every word whose text contains `needle`.
pub fn find_word_boxes(needle: &str, words: &[ReconstructedWord]) -> Vec<Rect> {
    words
        .iter()
        .filter(|w| w.text.contains(needle))
        .map(|w| w.rect)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(x0: f32, y0: f32, x1: f32, y1: f32, text: &str) -> WordToken {
        WordToken::new(x0, y0, x1, y1, text)
    }

    fn texts(words: &[ReconstructedWord]) -> Vec<(&str, usize)> {
        words.iter().map(|w| (w.text.as_str(), w.line)).collect()
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        let words = reconstruct_words(&[], None, &ReconstructOptions::default());
        assert!(words.is_empty());
        assert_eq!(words_to_text(&words), "");
    }

    #[test]
    fn test_joins_out_of_order_fragments_of_one_word() {
        // "Garantie" drawn as "antie" before "Gar", touching boxes.
        let tokens = vec![
            tok(30.0, 10.0, 55.0, 20.0, "antie"),
            tok(10.0, 10.0, 30.0, 20.0, "Gar"),
            tok(60.0, 10.0, 80.0, 20.0, "vol"),
        ];
        let words = reconstruct_words(&tokens, None, &ReconstructOptions::default());
        assert_eq!(texts(&words), vec![("Garantie", 0), ("vol", 0)]);
        assert_eq!(words[0].rect, Rect::new(10.0, 10.0, 55.0, 20.0));
    }

    #[test]
    fn test_gap_wider_than_a_fifth_of_a_char_splits_words() {
        // Next fragment: width 10, 2 chars -> threshold 1.0.
        let tokens = vec![tok(0.0, 0.0, 10.0, 8.0, "ab"), tok(11.5, 0.0, 21.5, 8.0, "cd")];
        let words = reconstruct_words(&tokens, None, &ReconstructOptions::default());
        assert_eq!(texts(&words), vec![("ab", 0), ("cd", 0)]);

        let tokens = vec![tok(0.0, 0.0, 10.0, 8.0, "ab"), tok(11.0, 0.0, 21.0, 8.0, "cd")];
        let words = reconstruct_words(&tokens, None, &ReconstructOptions::default());
        assert_eq!(texts(&words), vec![("abcd", 0)]);
    }

    #[test]
    fn test_merge_takes_max_y0() {
        let tokens = vec![tok(0.0, 2.0, 10.0, 8.0, "a"), tok(10.0, 4.0, 20.0, 8.0, "b")];
        let words = reconstruct_words(&tokens, None, &ReconstructOptions::default());
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].rect, Rect::new(0.0, 4.0, 20.0, 8.0));
    }

    #[test]
    fn test_lines_increase_with_bottom_coordinate() {
        let tokens = vec![
            tok(10.0, 30.0, 40.0, 40.0, "deux"),
            tok(10.0, 10.0, 40.0, 20.0, "une"),
            tok(50.0, 10.0, 90.0, 20.0, "ligne"),
        ];
        let words = reconstruct_words(&tokens, None, &ReconstructOptions::default());
        assert_eq!(texts(&words), vec![("une", 0), ("ligne", 0), ("deux", 1)]);
        assert_eq!(words_to_text(&words), "une ligne\ndeux\n");
    }

    #[test]
    fn test_exact_grouping_splits_subpixel_jitter() {
        let tokens = vec![
            tok(10.0, 10.0, 40.0, 20.0, "une"),
            tok(50.0, 10.0, 90.0, 20.2, "ligne"),
        ];
        let words = reconstruct_words(&tokens, None, &ReconstructOptions::default());
        assert_eq!(texts(&words), vec![("une", 0), ("ligne", 1)]);
    }

    #[test]
    fn test_tolerance_groups_subpixel_jitter() {
        let tokens = vec![
            tok(50.0, 10.0, 90.0, 19.9, "ligne"),
            tok(10.0, 10.0, 40.0, 20.0, "une"),
        ];
        let options = ReconstructOptions {
            line_tolerance: 0.5,
        };
        let words = reconstruct_words(&tokens, None, &options);
        assert_eq!(texts(&words), vec![("une", 0), ("ligne", 0)]);
    }

    #[test]
    fn test_drops_degenerate_and_out_of_region_fragments() {
        let region = Rect::new(0.0, 0.0, 100.0, 100.0);
        let tokens = vec![
            tok(10.0, 10.0, 10.0, 20.0, "zero-width"),
            tok(10.0, 10.0, 30.0, 10.0, "zero-height"),
            tok(90.0, 10.0, 120.0, 20.0, "outside"),
            tok(10.0, 10.0, 40.0, 20.0, "inside"),
        ];
        let words = reconstruct_words(&tokens, Some(&region), &ReconstructOptions::default());
        assert_eq!(texts(&words), vec![("inside", 0)]);
    }

    #[test]
    fn test_output_is_independent_of_input_order() {
        let tokens = vec![
            tok(10.0, 10.0, 30.0, 20.0, "Où"),
            tok(35.0, 10.0, 60.0, 20.0, "suis"),
            tok(60.0, 10.0, 75.0, 20.0, "-je"),
            tok(80.0, 10.0, 120.0, 20.0, "couvert"),
            tok(10.0, 25.0, 50.0, 35.0, "France"),
            tok(10.0, 25.0, 50.0, 35.0, "Europe"),
            tok(55.0, 40.0, 90.0, 50.0, "fin"),
        ];
        let expected = reconstruct_words(&tokens, None, &ReconstructOptions::default());

        let mut reversed = tokens.clone();
        reversed.reverse();
        assert_eq!(
            reconstruct_words(&reversed, None, &ReconstructOptions::default()),
            expected
        );

        let mut rotated = tokens.clone();
        rotated.rotate_left(3);
        assert_eq!(
            reconstruct_words(&rotated, None, &ReconstructOptions::default()),
            expected
        );
    }

    #[test]
    fn test_find_word_boxes_matches_substrings() {
        let tokens = vec![
            tok(10.0, 10.0, 40.0, 20.0, "Assurance"),
            tok(50.0, 10.0, 90.0, 20.0, "habitation"),
        ];
        let words = reconstruct_words(&tokens, None, &ReconstructOptions::default());
        let boxes = find_word_boxes("sur", &words);
        assert_eq!(boxes, vec![Rect::new(10.0, 10.0, 40.0, 20.0)]);
        assert!(find_word_boxes("auto", &words).is_empty());
    }
}
