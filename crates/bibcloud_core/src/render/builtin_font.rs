//! Built-in 5x7 bitmap face.
//!
//! Covers lower-case ASCII letters, digits and the token punctuation
//! (`-`, `_`, `'`). Upper-case input is lower-cased, common Latin accents are
//! folded to their base letter, anything else draws as a hollow box.

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Blank columns between glyphs, in glyph pixels.
pub const GLYPH_SPACING: u32 = 1;

type Glyph = [&'static str; 7];

const BOX: Glyph = ["#####", "#...#", "#...#", "#...#", "#...#", "#...#", "#####"];
const SPACE: Glyph = [".....", ".....", ".....", ".....", ".....", ".....", "....."];

const GLYPHS: &[(char, Glyph)] = &[
    ('a', [".....", ".....", ".###.", "....#", ".####", "#...#", ".####"]),
    ('b', ["#....", "#....", "#.##.", "##..#", "#...#", "#...#", "####."]),
    ('c', [".....", ".....", ".###.", "#....", "#....", "#...#", ".###."]),
    ('d', ["....#", "....#", ".##.#", "#..##", "#...#", "#...#", ".####"]),
    ('e', [".....", ".....", ".###.", "#...#", "#####", "#....", ".###."]),
    ('f', ["..##.", ".#..#", ".#...", "###..", ".#...", ".#...", ".#..."]),
    ('g', [".....", ".####", "#...#", "#...#", ".####", "....#", ".###."]),
    ('h', ["#....", "#....", "#.##.", "##..#", "#...#", "#...#", "#...#"]),
    ('i', ["..#..", ".....", ".##..", "..#..", "..#..", "..#..", ".###."]),
    ('j', ["...#.", ".....", "..##.", "...#.", "...#.", "#..#.", ".##.."]),
    ('k', ["#....", "#....", "#..#.", "#.#..", "##...", "#.#..", "#..#."]),
    ('l', [".##..", "..#..", "..#..", "..#..", "..#..", "..#..", ".###."]),
    ('m', [".....", ".....", "##.#.", "#.#.#", "#.#.#", "#...#", "#...#"]),
    ('n', [".....", ".....", "#.##.", "##..#", "#...#", "#...#", "#...#"]),
    ('o', [".....", ".....", ".###.", "#...#", "#...#", "#...#", ".###."]),
    ('p', [".....", "####.", "#...#", "#...#", "####.", "#....", "#...."]),
    ('q', [".....", ".####", "#...#", "#...#", ".####", "....#", "....#"]),
    ('r', [".....", ".....", "#.##.", "##..#", "#....", "#....", "#...."]),
    ('s', [".....", ".....", ".####", "#....", ".###.", "....#", "####."]),
    ('t', [".#...", ".#...", "###..", ".#...", ".#...", ".#..#", "..##."]),
    ('u', [".....", ".....", "#...#", "#...#", "#...#", "#..##", ".##.#"]),
    ('v', [".....", ".....", "#...#", "#...#", "#...#", ".#.#.", "..#.."]),
    ('w', [".....", ".....", "#...#", "#...#", "#.#.#", "#.#.#", ".#.#."]),
    ('x', [".....", ".....", "#...#", ".#.#.", "..#..", ".#.#.", "#...#"]),
    ('y', [".....", "#...#", "#...#", "#...#", ".####", "....#", ".###."]),
    ('z', [".....", ".....", "#####", "...#.", "..#..", ".#...", "#####"]),
    ('0', [".###.", "#...#", "#..##", "#.#.#", "##..#", "#...#", ".###."]),
    ('1', ["..#..", ".##..", "..#..", "..#..", "..#..", "..#..", ".###."]),
    ('2', [".###.", "#...#", "....#", "...#.", "..#..", ".#...", "#####"]),
    ('3', ["#####", "...#.", "..#..", "...#.", "....#", "#...#", ".###."]),
    ('4', ["...#.", "..##.", ".#.#.", "#..#.", "#####", "...#.", "...#."]),
    ('5', ["#####", "#....", "####.", "....#", "....#", "#...#", ".###."]),
    ('6', ["..##.", ".#...", "#....", "####.", "#...#", "#...#", ".###."]),
    ('7', ["#####", "....#", "...#.", "..#..", ".#...", ".#...", ".#..."]),
    ('8', [".###.", "#...#", "#...#", ".###.", "#...#", "#...#", ".###."]),
    ('9', [".###.", "#...#", "#...#", ".####", "....#", "...#.", ".##.."]),
    ('-', [".....", ".....", ".....", "#####", ".....", ".....", "....."]),
    ('_', [".....", ".....", ".....", ".....", ".....", ".....", "#####"]),
    ('\'', ["..#..", "..#..", ".#...", ".....", ".....", ".....", "....."]),
];

/// Integer pixel scale for a requested font size (at least 1).
pub fn scale_for(size: u32) -> u32 {
    (size / GLYPH_HEIGHT).max(1)
}

/// Width and height in pixels of `text` at `size`.
pub fn measure(text: &str, size: u32) -> (u32, u32) {
    let scale = scale_for(size);
    let count = text.chars().count() as u32;
    if count == 0 {
        return (0, GLYPH_HEIGHT * scale);
    }
    let width = count * (GLYPH_WIDTH + GLYPH_SPACING) - GLYPH_SPACING;
    (width * scale, GLYPH_HEIGHT * scale)
}

/// Calls `plot(x, y)` for every lit cell of `text`, in glyph units before
/// scaling, left to right.
pub fn for_each_cell(text: &str, mut plot: impl FnMut(u32, u32)) {
    for (index, c) in text.chars().enumerate() {
        let origin = index as u32 * (GLYPH_WIDTH + GLYPH_SPACING);
        for (row, bits) in glyph(c).iter().enumerate() {
            for (col, cell) in bits.chars().enumerate() {
                if cell == '#' {
                    plot(origin + col as u32, row as u32);
                }
            }
        }
    }
}

fn glyph(c: char) -> &'static Glyph {
    if c.is_whitespace() {
        return &SPACE;
    }
    let folded = fold(c);
    GLYPHS
        .iter()
        .find(|(key, _)| *key == folded)
        .map(|(_, glyph)| glyph)
        .unwrap_or(&BOX)
}

fn fold(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::{for_each_cell, glyph, measure, scale_for, BOX, GLYPHS, GLYPH_WIDTH};

    #[test]
    fn every_glyph_row_has_fixed_width() {
        for (c, rows) in GLYPHS {
            for row in rows {
                assert_eq!(row.len(), GLYPH_WIDTH as usize, "glyph `{c}` row `{row}`");
            }
        }
    }

    #[test]
    fn measure_scales_with_font_size() {
        assert_eq!(scale_for(28), 4);
        assert_eq!(measure("abc", 28), (68, 28));
        assert_eq!(measure("a", 3), (5, 7));
    }

    #[test]
    fn accents_fold_and_unknown_chars_box() {
        assert_eq!(glyph('é'), glyph('e'));
        assert_eq!(glyph('Ñ'), glyph('n'));
        assert_eq!(glyph('λ'), &BOX);
    }

    #[test]
    fn cells_stay_inside_measured_extent() {
        let (width, height) = measure("wxyz", 7);
        for_each_cell("wxyz", |x, y| {
            assert!(x < width && y < height);
        });
    }
}
