//! Reading-direction classification.
//!
//! A verdict is computed from two signals: explicit LTR/RTL marks anywhere in
//! the text (tags included), and the script of every code point left once
//! HTML tags are stripped. Code points outside the three tables below carry
//! no signal.

use crate::error::BidimarkError;
use crate::frame::{LTR_MARK, RTL_MARK};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Overall reading direction of a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
    #[default]
    Neutral,
}

impl Direction {
    /// True when going from `self` to `other` flips between LTR and RTL.
    /// Moves to or from `Neutral` never count.
    pub fn crosses(self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Ltr, Direction::Rtl) | (Direction::Rtl, Direction::Ltr)
        )
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ltr => f.write_str("ltr"),
            Direction::Rtl => f.write_str("rtl"),
            Direction::Neutral => f.write_str("neutral"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = BidimarkError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ltr" => Ok(Self::Ltr),
            "rtl" => Ok(Self::Rtl),
            "neutral" => Ok(Self::Neutral),
            _ => Err(BidimarkError::UnsupportedValue(format!("direction: {}", s))),
        }
    }
}

/// Script class of a single code point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Ltr,
    Rtl,
    Neutral,
}

type Range = (char, char);

/// Right-to-left scripts, sorted and non-overlapping
static RTL_RANGES: &[Range] = &[
    ('\u{0590}', '\u{05FF}'),   // Hebrew
    ('\u{0600}', '\u{06FF}'),   // Arabic
    ('\u{0700}', '\u{074F}'),   // Syriac
    ('\u{0750}', '\u{077F}'),   // Arabic Supplement
    ('\u{0780}', '\u{07BF}'),   // Thaana
    ('\u{07C0}', '\u{07FF}'),   // NKo
    ('\u{0800}', '\u{083F}'),   // Samaritan
    ('\u{0840}', '\u{085F}'),   // Mandaic
    ('\u{0860}', '\u{086F}'),   // Syriac Supplement
    ('\u{0870}', '\u{089F}'),   // Arabic Extended-B
    ('\u{08A0}', '\u{08FF}'),   // Arabic Extended-A
    ('\u{FB1D}', '\u{FB4F}'),   // Hebrew presentation forms
    ('\u{FB50}', '\u{FDFF}'),   // Arabic Presentation Forms-A
    ('\u{FE70}', '\u{FEFF}'),   // Arabic Presentation Forms-B
    ('\u{10800}', '\u{1083F}'), // Cypriot Syllabary
    ('\u{10840}', '\u{1085F}'), // Imperial Aramaic
    ('\u{10860}', '\u{1087F}'), // Palmyrene
    ('\u{10880}', '\u{108AF}'), // Nabataean
    ('\u{108E0}', '\u{108FF}'), // Hatran
    ('\u{10900}', '\u{1091F}'), // Phoenician
    ('\u{10920}', '\u{1093F}'), // Lydian
    ('\u{10980}', '\u{1099F}'), // Meroitic Hieroglyphs
    ('\u{109A0}', '\u{109FF}'), // Meroitic Cursive
    ('\u{10A00}', '\u{10A5F}'), // Kharoshthi
    ('\u{10A60}', '\u{10A7F}'), // Old South Arabian
    ('\u{10A80}', '\u{10A9F}'), // Old North Arabian
    ('\u{10AC0}', '\u{10AFF}'), // Manichaean
    ('\u{10B00}', '\u{10B3F}'), // Avestan
    ('\u{10B40}', '\u{10B5F}'), // Inscriptional Parthian
    ('\u{10B60}', '\u{10B7F}'), // Inscriptional Pahlavi
    ('\u{10B80}', '\u{10BAF}'), // Psalter Pahlavi
    ('\u{10C00}', '\u{10C4F}'), // Old Turkic
    ('\u{10C80}', '\u{10CFF}'), // Old Hungarian
    ('\u{10D00}', '\u{10D3F}'), // Hanifi Rohingya
    ('\u{10E80}', '\u{10EBF}'), // Yezidi
    ('\u{10F00}', '\u{10F2F}'), // Old Sogdian
    ('\u{10F30}', '\u{10F6F}'), // Sogdian
    ('\u{10F70}', '\u{10FAF}'), // Old Uyghur
    ('\u{10FB0}', '\u{10FDF}'), // Chorasmian
    ('\u{10FE0}', '\u{10FFF}'), // Elymaic
    ('\u{1E800}', '\u{1E8DF}'), // Mende Kikakui
    ('\u{1E900}', '\u{1E95F}'), // Adlam
    ('\u{1EC70}', '\u{1ECBF}'), // Indic Siyaq Numbers
    ('\u{1ED00}', '\u{1ED4F}'), // Ottoman Siyaq Numbers
    ('\u{1EE00}', '\u{1EEFF}'), // Arabic Mathematical Alphabetic Symbols
];

/// Left-to-right scripts, sorted and non-overlapping
static LTR_RANGES: &[Range] = &[
    ('A', 'Z'),
    ('a', 'z'),
    ('\u{00C0}', '\u{00D6}'),   // Latin-1 letters, minus U+00D7
    ('\u{00D8}', '\u{00F6}'),   // minus U+00F7
    ('\u{00F8}', '\u{00FF}'),
    ('\u{0100}', '\u{017F}'),   // Latin Extended-A
    ('\u{0180}', '\u{024F}'),   // Latin Extended-B
    ('\u{0250}', '\u{02AF}'),   // IPA Extensions
    ('\u{0370}', '\u{03FF}'),   // Greek and Coptic
    ('\u{0400}', '\u{04FF}'),   // Cyrillic
    ('\u{0500}', '\u{052F}'),   // Cyrillic Supplement
    ('\u{0530}', '\u{058F}'),   // Armenian
    ('\u{1100}', '\u{11FF}'),   // Hangul Jamo
    ('\u{1C80}', '\u{1C8F}'),   // Cyrillic Extended-C
    ('\u{1E00}', '\u{1EFF}'),   // Latin Extended Additional
    ('\u{1F00}', '\u{1FFF}'),   // Greek Extended
    ('\u{2C60}', '\u{2C7F}'),   // Latin Extended-C
    ('\u{2DE0}', '\u{2DFF}'),   // Cyrillic Extended-A
    ('\u{3040}', '\u{309F}'),   // Hiragana
    ('\u{30A0}', '\u{30FF}'),   // Katakana
    ('\u{3130}', '\u{318F}'),   // Hangul Compatibility Jamo
    ('\u{31F0}', '\u{31FF}'),   // Katakana Phonetic Extensions
    ('\u{3400}', '\u{4DBF}'),   // CJK Extension A
    ('\u{4E00}', '\u{9FFF}'),   // CJK Unified Ideographs
    ('\u{A640}', '\u{A69F}'),   // Cyrillic Extended-B
    ('\u{A720}', '\u{A7FF}'),   // Latin Extended-D
    ('\u{A960}', '\u{A97F}'),   // Hangul Jamo Extended-A
    ('\u{AB30}', '\u{AB6F}'),   // Latin Extended-E
    ('\u{AC00}', '\u{D7AF}'),   // Hangul Syllables
    ('\u{D7B0}', '\u{D7FF}'),   // Hangul Jamo Extended-B
    ('\u{F900}', '\u{FAFF}'),   // CJK Compatibility Ideographs
    ('\u{FF21}', '\u{FF3A}'),   // Fullwidth Latin capitals
    ('\u{FF41}', '\u{FF5A}'),   // Fullwidth Latin small
    ('\u{FF66}', '\u{FF9F}'),   // Halfwidth Katakana
    ('\u{FFA0}', '\u{FFDC}'),   // Halfwidth Hangul
    ('\u{1B000}', '\u{1B0FF}'), // Kana Supplement
    ('\u{20000}', '\u{2A6DF}'), // CJK Extension B
    ('\u{2A700}', '\u{2EBEF}'), // CJK Extensions C-F
    ('\u{30000}', '\u{3134F}'), // CJK Extension G
];

/// Digits, punctuation and symbols, sorted and non-overlapping
static NEUTRAL_RANGES: &[Range] = &[
    ('\u{0020}', '\u{0040}'),   // space, ASCII punctuation, digits
    ('\u{005B}', '\u{0060}'),
    ('\u{007B}', '\u{007E}'),
    ('\u{00A0}', '\u{00BF}'),   // Latin-1 punctuation and symbols
    ('\u{00D7}', '\u{00D7}'),   // multiplication sign
    ('\u{00F7}', '\u{00F7}'),   // division sign
    ('\u{2000}', '\u{206F}'),   // General Punctuation
    ('\u{2070}', '\u{209F}'),   // Superscripts and Subscripts
    ('\u{20A0}', '\u{20CF}'),   // Currency Symbols
    ('\u{2150}', '\u{218F}'),   // Number Forms
    ('\u{2190}', '\u{21FF}'),   // Arrows
    ('\u{2200}', '\u{22FF}'),   // Mathematical Operators
    ('\u{2300}', '\u{23FF}'),   // Miscellaneous Technical
    ('\u{2460}', '\u{24FF}'),   // Enclosed Alphanumerics
    ('\u{2500}', '\u{257F}'),   // Box Drawing
    ('\u{2580}', '\u{259F}'),   // Block Elements
    ('\u{25A0}', '\u{25FF}'),   // Geometric Shapes
    ('\u{2600}', '\u{26FF}'),   // Miscellaneous Symbols
    ('\u{2700}', '\u{27BF}'),   // Dingbats
    ('\u{27C0}', '\u{27EF}'),   // Miscellaneous Mathematical Symbols-A
    ('\u{2980}', '\u{29FF}'),   // Miscellaneous Mathematical Symbols-B
    ('\u{2A00}', '\u{2AFF}'),   // Supplemental Mathematical Operators
    ('\u{2E00}', '\u{2E7F}'),   // Supplemental Punctuation
    ('\u{3000}', '\u{303F}'),   // CJK Symbols and Punctuation
    ('\u{FE30}', '\u{FE4F}'),   // CJK Compatibility Forms
    ('\u{FE50}', '\u{FE6F}'),   // Small Form Variants
    ('\u{FF01}', '\u{FF20}'),   // Fullwidth punctuation and digits
    ('\u{FF3B}', '\u{FF40}'),
    ('\u{FF5B}', '\u{FF65}'),
    ('\u{1F300}', '\u{1F5FF}'), // Miscellaneous Symbols and Pictographs
    ('\u{1F600}', '\u{1F64F}'), // Emoticons
    ('\u{1F680}', '\u{1F6FF}'), // Transport and Map Symbols
    ('\u{1F900}', '\u{1F9FF}'), // Supplemental Symbols and Pictographs
    ('\u{1FA70}', '\u{1FAFF}'), // Symbols and Pictographs Extended-A
];

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

fn in_table(table: &[Range], c: char) -> bool {
    table
        .binary_search_by(|&(lo, hi)| {
            if hi < c {
                std::cmp::Ordering::Less
            } else if lo > c {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Script class of `c`, or `None` when no table covers it
pub fn classify_char(c: char) -> Option<CharClass> {
    if in_table(RTL_RANGES, c) {
        Some(CharClass::Rtl)
    } else if in_table(LTR_RANGES, c) {
        Some(CharClass::Ltr)
    } else if in_table(NEUTRAL_RANGES, c) {
        Some(CharClass::Neutral)
    } else {
        None
    }
}

/// Raw signal counts behind a verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionCounts {
    pub ltr_marks: usize,
    pub rtl_marks: usize,
    pub ltr_chars: usize,
    pub rtl_chars: usize,
    pub neutral_chars: usize,
    /// True when nothing but whitespace is left after stripping tags
    pub blank: bool,
}

impl DirectionCounts {
    pub fn total_ltr(&self) -> usize {
        self.ltr_marks + self.ltr_chars
    }

    pub fn total_rtl(&self) -> usize {
        self.rtl_marks + self.rtl_chars
    }

    /// Apply the decision rule. Exact ties go to LTR.
    pub fn verdict(&self) -> Direction {
        if self.blank {
            return Direction::Neutral;
        }
        let (ltr, rtl) = (self.total_ltr(), self.total_rtl());
        if rtl > 0 && rtl > ltr {
            Direction::Rtl
        } else if ltr > 0 && ltr >= rtl {
            Direction::Ltr
        } else {
            Direction::Neutral
        }
    }

    /// Number of `target` marks that must be added to reach `target`.
    ///
    /// Zero for `Neutral` or when the verdict already matches.
    pub fn marks_to_restore(&self, target: Direction) -> usize {
        if self.blank || self.verdict() == target {
            return 0;
        }
        let (ltr, rtl) = (self.total_ltr(), self.total_rtl());
        match target {
            Direction::Ltr => rtl.saturating_sub(ltr).max(1),
            Direction::Rtl => ltr.saturating_sub(rtl) + 1,
            Direction::Neutral => 0,
        }
    }
}

/// Count the direction signals in `text`
pub fn count(text: &str) -> DirectionCounts {
    let mut counts = DirectionCounts::default();

    for c in text.chars() {
        match c {
            LTR_MARK => counts.ltr_marks += 1,
            RTL_MARK => counts.rtl_marks += 1,
            _ => {}
        }
    }

    let stripped = TAG.replace_all(text, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    if collapsed.trim().is_empty() {
        counts.blank = true;
        return counts;
    }

    for c in collapsed.chars() {
        match classify_char(c) {
            Some(CharClass::Ltr) => counts.ltr_chars += 1,
            Some(CharClass::Rtl) => counts.rtl_chars += 1,
            Some(CharClass::Neutral) => counts.neutral_chars += 1,
            None => {}
        }
    }

    counts
}

/// Overall reading direction of `text`
pub fn classify(text: &str) -> Direction {
    count(text).verdict()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sorted(table: &[Range]) {
        for (lo, hi) in table {
            assert!(lo <= hi, "inverted range {:?}..{:?}", lo, hi);
        }
        for pair in table.windows(2) {
            assert!(pair[0].1 < pair[1].0, "unsorted: {:?} {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_tables_sorted() {
        assert_sorted(RTL_RANGES);
        assert_sorted(LTR_RANGES);
        assert_sorted(NEUTRAL_RANGES);
    }

    #[test]
    fn test_tables_disjoint() {
        let tables = [RTL_RANGES, LTR_RANGES, NEUTRAL_RANGES];
        for (i, a) in tables.iter().enumerate() {
            for b in tables.iter().skip(i + 1) {
                for &(alo, ahi) in a.iter() {
                    for &(blo, bhi) in b.iter() {
                        assert!(ahi < blo || bhi < alo, "{:?} overlaps {:?}", (alo, ahi), (blo, bhi));
                    }
                }
            }
        }
    }

    #[test]
    fn test_classify_char() {
        assert_eq!(classify_char('a'), Some(CharClass::Ltr));
        assert_eq!(classify_char('Ж'), Some(CharClass::Ltr));
        assert_eq!(classify_char('漢'), Some(CharClass::Ltr));
        assert_eq!(classify_char('א'), Some(CharClass::Rtl));
        assert_eq!(classify_char('ب'), Some(CharClass::Rtl));
        assert_eq!(classify_char('7'), Some(CharClass::Neutral));
        assert_eq!(classify_char('∑'), Some(CharClass::Neutral));
        assert_eq!(classify_char('×'), Some(CharClass::Neutral));
        // Devanagari is in no table
        assert_eq!(classify_char('क'), None);
    }

    #[test]
    fn test_classify_scripts() {
        assert_eq!(classify("هذا نص اختبار"), Direction::Rtl);
        assert_eq!(classify("This is a test"), Direction::Ltr);
        assert_eq!(classify("12345 !@#$%"), Direction::Neutral);
        assert_eq!(classify(""), Direction::Neutral);
        assert_eq!(classify("   \n\t "), Direction::Neutral);
    }

    #[test]
    fn test_tie_goes_to_ltr() {
        assert_eq!(classify("ab אב"), Direction::Ltr);
        assert_eq!(classify("ab אבג"), Direction::Rtl);
    }

    #[test]
    fn test_tags_stripped_but_marks_counted() {
        // Latin inside the tag is ignored
        assert_eq!(classify("<span class=\"abcdef\">שלום</span>"), Direction::Rtl);
        // Marks inside a tag still count
        let html = format!("<p title=\"{0}{0}{0}\">ab</p>", RTL_MARK);
        assert_eq!(classify(&html), Direction::Rtl);
        // Tags only: nothing left to read
        assert_eq!(classify("<br/><hr>"), Direction::Neutral);
    }

    #[test]
    fn test_marks_tip_the_balance() {
        let text = format!("abc{0}{0}{0}{0}", RTL_MARK);
        assert_eq!(classify(&text), Direction::Rtl);
        let text = format!("שלום{0}{0}{0}{0}", LTR_MARK);
        assert_eq!(classify(&text), Direction::Ltr);
    }

    #[test]
    fn test_crosses() {
        assert!(Direction::Ltr.crosses(Direction::Rtl));
        assert!(Direction::Rtl.crosses(Direction::Ltr));
        assert!(!Direction::Ltr.crosses(Direction::Neutral));
        assert!(!Direction::Neutral.crosses(Direction::Rtl));
        assert!(!Direction::Ltr.crosses(Direction::Ltr));
    }

    #[test]
    fn test_marks_to_restore() {
        let counts = count(&format!("ab{0}{0}{0}{0}{0}", RTL_MARK));
        assert_eq!(counts.verdict(), Direction::Rtl);
        let needed = counts.marks_to_restore(Direction::Ltr);
        assert_eq!(needed, 3);
        let fixed = format!("ab{0}{0}{0}{0}{0}{1}{1}{1}", RTL_MARK, LTR_MARK);
        assert_eq!(classify(&fixed), Direction::Ltr);

        let counts = count(&format!("אב{0}{0}{0}", LTR_MARK));
        assert_eq!(counts.marks_to_restore(Direction::Rtl), 2);
        assert_eq!(counts.marks_to_restore(Direction::Neutral), 0);
        assert_eq!(counts.marks_to_restore(Direction::Ltr), 0);
    }

    #[test]
    fn test_direction_parse_and_display() {
        assert_eq!("RTL".parse::<Direction>().unwrap(), Direction::Rtl);
        assert_eq!(Direction::Neutral.to_string(), "neutral");
        assert!("sideways".parse::<Direction>().is_err());
    }
}
