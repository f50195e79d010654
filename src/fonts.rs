//! PDF base-14 text fonts.
//!
//! Glyph advance widths come from the Adobe core font AFM files, in 1/1000 em.
//! Text is written with WinAnsiEncoding, so anything outside that code page
//! is replaced with `?` and measured as such.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
    TimesRoman,
    Courier,
}

/// Widths of the printable ASCII range (0x20..=0x7E).
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' - '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0' - '9'
    278, 278, 584, 584, 584, 556, 1015, // ':' - '@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // 'A' - 'Z'
    278, 278, 278, 469, 556, 333, // '[' - '`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // 'a' - 'z'
    334, 260, 334, 584, // '{' - '~'
];

const TIMES_ROMAN_ASCII: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // ' ' - '/'
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // '0' - '9'
    278, 278, 564, 564, 564, 444, 921, // ':' - '@'
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722, 667,
    556, 611, 722, 722, 944, 722, 722, 611, // 'A' - 'Z'
    333, 278, 333, 469, 500, 333, // '[' - '`'
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333,
    389, 278, 500, 500, 722, 500, 500, 444, // 'a' - 'z'
    480, 200, 480, 541, // '{' - '~'
];

const COURIER_WIDTH: u16 = 600;

/// Characters whose widths are not those of an ASCII letter, with their
/// WinAnsi byte and Helvetica / Times-Roman widths.
const WIN_ANSI_EXTRAS: &[(char, u8, u16, u16)] = &[
    ('\u{2018}', 0x91, 222, 333), // left single quote
    ('\u{2019}', 0x92, 222, 333), // right single quote
    ('\u{201C}', 0x93, 333, 444), // left double quote
    ('\u{201D}', 0x94, 333, 444), // right double quote
    ('\u{2022}', 0x95, 350, 350), // bullet
    ('\u{2013}', 0x96, 556, 500), // en dash
    ('\u{2014}', 0x97, 1000, 1000), // em dash
    ('\u{2026}', 0x85, 1000, 1000), // ellipsis
    ('\u{00A0}', 0xA0, 278, 250), // no-break space
    ('\u{00A1}', 0xA1, 333, 333), // ¡
    ('\u{00A3}', 0xA3, 556, 500), // £
    ('\u{00A7}', 0xA7, 556, 500), // §
    ('\u{00A9}', 0xA9, 737, 760), // ©
    ('\u{00AB}', 0xAB, 556, 500), // «
    ('\u{00B0}', 0xB0, 400, 400), // °
    ('\u{00B7}', 0xB7, 278, 250), // middle dot
    ('\u{00BB}', 0xBB, 556, 500), // »
    ('\u{00BF}', 0xBF, 611, 444), // ¿
    ('\u{00C6}', 0xC6, 1000, 889), // Æ
    ('\u{00D7}', 0xD7, 584, 564), // ×
    ('\u{00DF}', 0xDF, 611, 500), // ß
    ('\u{00E6}', 0xE6, 889, 667), // æ
    ('\u{00EC}', 0xEC, 278, 278), // ì
    ('\u{00ED}', 0xED, 278, 278), // í
    ('\u{00EE}', 0xEE, 278, 278), // î
    ('\u{00EF}', 0xEF, 278, 278), // ï
];

/// Unaccented letter whose advance width an accented Latin-1 letter shares.
fn latin1_base(c: char) -> Option<char> {
    let base = match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ð' => 'D',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'Þ' => 'P',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ð' => 'd',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'þ' => 'p',
        _ => return None,
    };
    Some(base)
}

impl BuiltinFont {
    /// Name used as `BaseFont` in the PDF font dictionary.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::TimesRoman => "Times-Roman",
            BuiltinFont::Courier => "Courier",
        }
    }

    pub fn all() -> &'static [BuiltinFont] {
        &[
            BuiltinFont::Helvetica,
            BuiltinFont::TimesRoman,
            BuiltinFont::Courier,
        ]
    }

    /// Advance width of `c` in 1/1000 em, after WinAnsi substitution.
    pub fn char_width(&self, c: char) -> u16 {
        if *self == BuiltinFont::Courier {
            return COURIER_WIDTH;
        }

        let table = match self {
            BuiltinFont::Helvetica => &HELVETICA_ASCII,
            _ => &TIMES_ROMAN_ASCII,
        };

        if (' '..='~').contains(&c) {
            return table[c as usize - 0x20];
        }
        if let Some(&(_, _, helvetica, times)) = WIN_ANSI_EXTRAS.iter().find(|(ch, ..)| *ch == c) {
            return match self {
                BuiltinFont::Helvetica => helvetica,
                _ => times,
            };
        }
        if let Some(base) = latin1_base(c) {
            return table[base as usize - 0x20];
        }
        table[usize::from(b'?' - 0x20)]
    }

    /// Rendered width of `text` in points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 * size / 1000.0
    }

    /// WinAnsi bytes for a PDF string literal. 0xA0-0xFF is Latin-1 as is;
    /// anything WinAnsi cannot encode becomes `?`.
    pub fn encode(text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| {
                if (' '..='~').contains(&c) || ('\u{00A0}'..='\u{00FF}').contains(&c) {
                    c as u8
                } else if let Some(&(_, byte, ..)) = WIN_ANSI_EXTRAS.iter().find(|(ch, ..)| *ch == c) {
                    byte
                } else {
                    b'?'
                }
            })
            .collect()
    }
}

impl fmt::Display for BuiltinFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pdf_name())
    }
}

impl FromStr for BuiltinFont {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "helvetica" | "arial" | "sans" | "sans-serif" => Ok(BuiltinFont::Helvetica),
            "times" | "times-roman" | "times new roman" | "serif" => Ok(BuiltinFont::TimesRoman),
            "courier" | "courier new" | "mono" | "monospace" => Ok(BuiltinFont::Courier),
            other => {
                let known: Vec<_> = BuiltinFont::all().iter().map(|f| f.pdf_name()).collect();
                Err(format!(
                    "Unknown font \"{}\", expected one of: {}",
                    other,
                    known.join(", ")
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_with_afm_widths() {
        // "Hello" in Helvetica: 722 + 556 + 222 + 222 + 556
        let width = BuiltinFont::Helvetica.text_width("Hello", 10.0);
        assert!((width - 22.78).abs() < 1e-3);
        assert_eq!(BuiltinFont::Courier.text_width("abc", 10.0), 18.0);
        assert_eq!(BuiltinFont::TimesRoman.char_width('W'), 944);
    }

    #[test]
    fn encodes_typographic_punctuation() {
        let bytes = BuiltinFont::encode("It\u{2019}s \u{2014} ok\u{2026} \u{4E2D}");
        assert_eq!(bytes, b"It\x92s \x97 ok\x85 ?".to_vec());
        assert_eq!(
            BuiltinFont::Helvetica.char_width('\u{4E2D}'),
            BuiltinFont::Helvetica.char_width('?')
        );
    }

    #[test]
    fn passes_latin1_through() {
        let bytes = BuiltinFont::encode("Schön señor, à ü «Æ»");
        assert_eq!(bytes, b"Sch\xF6n se\xF1or, \xE0 \xFC \xAB\xC6\xBB".to_vec());

        let helvetica = BuiltinFont::Helvetica;
        assert_eq!(helvetica.char_width('ö'), helvetica.char_width('o'));
        assert_eq!(helvetica.char_width('Ñ'), helvetica.char_width('N'));
        assert_eq!(BuiltinFont::TimesRoman.char_width('à'), BuiltinFont::TimesRoman.char_width('a'));
        assert_eq!(helvetica.char_width('ï'), 278);
        assert_eq!(helvetica.char_width('Æ'), 1000);
    }

    #[test]
    fn parses_font_names() {
        assert_eq!("Times-Roman".parse::<BuiltinFont>(), Ok(BuiltinFont::TimesRoman));
        assert_eq!(" HELVETICA ".parse::<BuiltinFont>(), Ok(BuiltinFont::Helvetica));
        assert!("Comic Sans".parse::<BuiltinFont>().unwrap_err().contains("Courier"));
    }
}
