// SPDX-License-Identifier: GPL-3.0-or-later
// vaultside - Hotkey symbol generation for annotated previews

use std::collections::HashSet;

const DIGITS: &[u8] = b"123456789";
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Reserved letter that prefixes every secondary-region symbol. The primary
/// alphabet excludes it so the two namespaces stay disjoint even when both
/// regions render with an uncoordinated start index.
pub const SECONDARY_PREFIX: char = 'd';

const MAX_ATTEMPTS: usize = 100;

/// Letters available to the primary region (all lowercase minus the
/// reserved secondary prefix).
fn primary_letters() -> impl Iterator<Item = char> {
    LETTERS
        .iter()
        .map(|b| *b as char)
        .filter(|c| *c != SECONDARY_PREFIX)
}

fn primary_letter(index: usize) -> Option<char> {
    primary_letters().nth(index)
}

fn letter(index: usize) -> Option<char> {
    LETTERS.get(index).map(|b| *b as char)
}

/// Symbol for a sequence index, or None when the index is outside the
/// alphabet's combination space.
///
/// Secondary-region symbols are the reserved prefix plus one to three
/// letters of the full alphabet, enumerated lexicographically. Primary
/// symbols are digits 1-9 (unless `letters_only`), then single letters,
/// then two-letter pairs over the 25-letter alphabet.
pub fn symbol_at(index: usize, letters_only: bool, secondary: bool) -> Option<String> {
    if secondary {
        return secondary_symbol_at(index);
    }

    let mut index = index;
    if !letters_only {
        if let Some(d) = DIGITS.get(index) {
            return Some((*d as char).to_string());
        }
        index -= DIGITS.len();
    }

    let n = primary_letters().count();
    if index < n {
        return primary_letter(index).map(|c| c.to_string());
    }

    let pair = index - n;
    let first = primary_letter(pair / n)?;
    let second = primary_letter(pair % n)?;
    Some(format!("{}{}", first, second))
}

fn secondary_symbol_at(index: usize) -> Option<String> {
    let n = LETTERS.len();
    if index < n {
        return letter(index).map(|c| format!("{}{}", SECONDARY_PREFIX, c));
    }
    let two = index - n;
    if two < n * n {
        let a = letter(two / n)?;
        let b = letter(two % n)?;
        return Some(format!("{}{}{}", SECONDARY_PREFIX, a, b));
    }
    let three = index - n - n * n;
    if three >= n * n * n {
        return None;
    }
    let a = letter(three / (n * n))?;
    let b = letter((three % (n * n)) / n)?;
    let c = letter(three % n)?;
    Some(format!("{}{}{}{}", SECONDARY_PREFIX, a, b, c))
}

/// Allocates unique hotkey symbols for one render pass.
///
/// The used-symbol set is owned by the allocator, so two sequential render
/// calls can never leak reservations into each other and the whole thing is
/// safe to use from independent calls without shared state.
pub struct HotkeyAllocator {
    used: HashSet<String>,
    next_index: usize,
    letters_only: bool,
    secondary: bool,
}

impl HotkeyAllocator {
    pub fn new(start_index: usize, letters_only: bool, secondary: bool) -> Self {
        Self {
            used: HashSet::new(),
            next_index: start_index,
            letters_only,
            secondary,
        }
    }

    /// Symbol for the next target in document order. Collisions (a start
    /// index overlapping an earlier region) probe forward; after
    /// MAX_ATTEMPTS the sentinel symbol is returned and a warning logged.
    pub fn next_symbol(&mut self) -> String {
        let mut probe = self.next_index;
        let mut attempts = 0;
        let symbol = loop {
            if attempts >= MAX_ATTEMPTS {
                tracing::warn!(
                    index = self.next_index,
                    "hotkey symbol space exhausted, using sentinel"
                );
                break self.sentinel();
            }
            match symbol_at(probe, self.letters_only, self.secondary) {
                Some(sym) if !self.used.contains(&sym) => break sym,
                _ => {
                    attempts += 1;
                    probe += 1;
                }
            }
        };
        self.next_index += 1;
        self.used.insert(symbol.clone());
        symbol
    }

    fn sentinel(&self) -> String {
        if self.secondary {
            format!("{}x", SECONDARY_PREFIX)
        } else {
            "x".to_string()
        }
    }
}

/// How the live input buffer relates to an assigned symbol. Decides badge
/// highlighting only; assignment never depends on the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferMatch {
    None,
    /// Buffer equals the first character of a multi-character symbol.
    Prefix,
    Full,
}

pub fn match_buffer(symbol: &str, buffer: &str) -> BufferMatch {
    if buffer.is_empty() {
        return BufferMatch::None;
    }
    if buffer == symbol {
        return BufferMatch::Full;
    }
    let mut chars = symbol.chars();
    let first = chars.next();
    if chars.next().is_some() {
        if let Some(first) = first {
            if buffer.chars().eq(std::iter::once(first)) {
                return BufferMatch::Prefix;
            }
        }
    }
    BufferMatch::None
}

/// Badges render letters uppercase; digits stay as-is.
pub fn display_symbol(symbol: &str) -> String {
    symbol.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_alphabet_starts_with_digits() {
        for (i, expected) in ["1", "2", "3", "4", "5", "6", "7", "8", "9"].iter().enumerate() {
            assert_eq!(symbol_at(i, false, false).as_deref(), Some(*expected));
        }
        // First letter after the digit run, skipping the reserved 'd'.
        assert_eq!(symbol_at(9, false, false).as_deref(), Some("a"));
        assert_eq!(symbol_at(11, false, false).as_deref(), Some("c"));
        assert_eq!(symbol_at(12, false, false).as_deref(), Some("e"));
    }

    #[test]
    fn letters_only_skips_digits() {
        assert_eq!(symbol_at(0, true, false).as_deref(), Some("a"));
        for i in 0..700 {
            if let Some(sym) = symbol_at(i, true, false) {
                assert!(sym.chars().all(|c| c.is_ascii_lowercase()), "{}", sym);
            }
        }
    }

    #[test]
    fn primary_never_contains_reserved_letter() {
        for i in 0..659 {
            let sym = symbol_at(i, false, false).unwrap();
            assert!(!sym.contains(SECONDARY_PREFIX), "{}", sym);
        }
    }

    #[test]
    fn primary_rolls_over_to_pairs() {
        // 9 digits + 25 single letters, then pairs.
        assert_eq!(symbol_at(33, false, false).as_deref(), Some("z"));
        assert_eq!(symbol_at(34, false, false).as_deref(), Some("aa"));
        assert_eq!(symbol_at(35, false, false).as_deref(), Some("ab"));
        // 659 symbols total, then the space is exhausted.
        assert_eq!(symbol_at(658, false, false).as_deref(), Some("zz"));
        assert_eq!(symbol_at(659, false, false), None);
    }

    #[test]
    fn secondary_symbols_are_prefixed() {
        assert_eq!(symbol_at(0, false, true).as_deref(), Some("da"));
        assert_eq!(symbol_at(25, false, true).as_deref(), Some("dz"));
        assert_eq!(symbol_at(26, false, true).as_deref(), Some("daa"));
        assert_eq!(symbol_at(701, false, true).as_deref(), Some("dzz"));
        assert_eq!(symbol_at(702, false, true).as_deref(), Some("daaa"));
    }

    #[test]
    fn primary_and_secondary_are_disjoint() {
        let primary: HashSet<String> =
            (0..659).filter_map(|i| symbol_at(i, false, false)).collect();
        for i in 0..800 {
            if let Some(sym) = symbol_at(i, false, true) {
                assert!(!primary.contains(&sym), "{}", sym);
            }
        }
    }

    #[test]
    fn allocator_yields_distinct_symbols() {
        let mut alloc = HotkeyAllocator::new(0, false, false);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            assert!(seen.insert(alloc.next_symbol()));
        }
    }

    #[test]
    fn allocator_honors_start_index() {
        let mut alloc = HotkeyAllocator::new(9, false, false);
        assert_eq!(alloc.next_symbol(), "a");
        assert_eq!(alloc.next_symbol(), "b");
    }

    #[test]
    fn allocator_falls_back_to_sentinel_when_exhausted() {
        let mut alloc = HotkeyAllocator::new(100_000, false, false);
        assert_eq!(alloc.next_symbol(), "x");
        let mut alloc = HotkeyAllocator::new(1_000_000_000, false, true);
        assert_eq!(alloc.next_symbol(), "dx");
    }

    #[test]
    fn buffer_matching() {
        assert_eq!(match_buffer("a", ""), BufferMatch::None);
        assert_eq!(match_buffer("a", "a"), BufferMatch::Full);
        assert_eq!(match_buffer("ab", "ab"), BufferMatch::Full);
        assert_eq!(match_buffer("ab", "a"), BufferMatch::Prefix);
        assert_eq!(match_buffer("ab", "b"), BufferMatch::None);
        // Single-character symbols never report a prefix match.
        assert_eq!(match_buffer("a", "ab"), BufferMatch::None);
    }

    #[test]
    fn display_uppercases_letters() {
        assert_eq!(display_symbol("ab"), "AB");
        assert_eq!(display_symbol("1"), "1");
        assert_eq!(display_symbol("da"), "DA");
    }
}
