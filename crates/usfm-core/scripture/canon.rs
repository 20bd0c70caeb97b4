//! Book identifiers of the Paratext canon
//!
//! Book numbers are 1-based positions in [`ALL_BOOK_IDS`]; 0 means "no
//! book". Extra-canonical material (front/back matter, glossaries, extra
//! books) has ids but is not canonical.

/// All book ids, in book number order
pub const ALL_BOOK_IDS: [&str; 123] = [
    "GEN", "EXO", "LEV", "NUM", "DEU", "JOS", "JDG", "RUT", "1SA", "2SA", // 1-10
    "1KI", "2KI", "1CH", "2CH", "EZR", "NEH", "EST", "JOB", "PSA", "PRO", // 11-20
    "ECC", "SNG", "ISA", "JER", "LAM", "EZK", "DAN", "HOS", "JOL", "AMO", // 21-30
    "OBA", "JON", "MIC", "NAM", "HAB", "ZEP", "HAG", "ZEC", "MAL", "MAT", // 31-40
    "MRK", "LUK", "JHN", "ACT", "ROM", "1CO", "2CO", "GAL", "EPH", "PHP", // 41-50
    "COL", "1TH", "2TH", "1TI", "2TI", "TIT", "PHM", "HEB", "JAS", "1PE", // 51-60
    "2PE", "1JN", "2JN", "3JN", "JUD", "REV", "TOB", "JDT", "ESG", "WIS", // 61-70
    "SIR", "BAR", "LJE", "S3Y", "SUS", "BEL", "1MA", "2MA", "3MA", "4MA", // 71-80
    "1ES", "2ES", "MAN", "PS2", "ODA", "PSS", "JSA", "JDB", "TBS", "SST", // 81-90
    "DNT", "BLT", "XXA", "XXB", "XXC", "XXD", "XXE", "XXF", "XXG", "FRT", // 91-100
    "BAK", "OTH", "3ES", "EZA", "5EZ", "6EZ", "INT", "CNC", "GLO", "TDX", // 101-110
    "NDX", "DAG", "PS3", "2BA", "LBA", "JUB", "ENO", "1MQ", "2MQ", "3MQ", // 111-120
    "REP", "4BA", "LAO", // 121-123
];

/// Ids that are valid books but not part of any canon
const NON_CANONICAL_IDS: [&str; 15] = [
    "XXA", "XXB", "XXC", "XXD", "XXE", "XXF", "XXG", "FRT", "BAK", "OTH", "INT", "CNC", "GLO",
    "TDX", "NDX",
];

/// Number of the last book
pub const LAST_BOOK: u16 = 123;

/// Book number for an id, 0 when unknown
///
/// Lookup is case-insensitive.
///
/// # Example
///
/// ```rust
/// use usfm_core::scripture::canon::{book_id_to_number, book_number_to_id};
///
/// assert_eq!(book_id_to_number("MAT"), 40);
/// assert_eq!(book_id_to_number("mat"), 40);
/// assert_eq!(book_number_to_id(1), "GEN");
/// assert_eq!(book_id_to_number("XYZ"), 0);
/// ```
#[must_use]
pub fn book_id_to_number(id: &str) -> u16 {
    if id.len() != 3 {
        return 0;
    }
    ALL_BOOK_IDS
        .iter()
        .position(|book| book.eq_ignore_ascii_case(id))
        .map_or(0, |index| u16::try_from(index + 1).unwrap_or(0))
}

/// Book id for a number, empty for 0 or out of range
#[must_use]
pub fn book_number_to_id(number: u16) -> &'static str {
    if number == 0 {
        return "";
    }
    ALL_BOOK_IDS.get(usize::from(number) - 1).copied().unwrap_or("")
}

/// Whether a book number names a known book
#[must_use]
pub const fn is_book_number_valid(number: u16) -> bool {
    number >= 1 && number <= LAST_BOOK
}

/// Whether a book is part of a canon
///
/// Front/back matter, glossaries, indexes and the extra `XX?` books are not.
#[must_use]
pub fn is_canonical(number: u16) -> bool {
    is_book_number_valid(number) && !NON_CANONICAL_IDS.contains(&book_number_to_id(number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip() {
        for number in 1..=LAST_BOOK {
            assert_eq!(book_id_to_number(book_number_to_id(number)), number);
        }
        assert_eq!(book_number_to_id(0), "");
        assert_eq!(book_number_to_id(124), "");
    }

    #[test]
    fn canonical_books() {
        assert!(is_canonical(book_id_to_number("GEN")));
        assert!(is_canonical(book_id_to_number("TOB")));
        assert!(!is_canonical(book_id_to_number("FRT")));
        assert!(!is_canonical(book_id_to_number("XXA")));
        assert!(!is_canonical(0));
    }
}
