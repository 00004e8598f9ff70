use crate::error::*;

/// A card is an integer in `[0, 52)`.
///
/// The rank is `card / 4` (`"2"` => `0`, `"3"` => `1`, ..., `"A"` => `12`) and
/// the suit is `card % 4` (`"c"` => `0`, `"d"` => `1`, `"h"` => `2`,
/// `"s"` => `3`). For example, `"2c"` => `0` and `"As"` => `51`.
pub type Card = u8;

/// The number of cards in the deck.
pub const NUM_CARDS: usize = 52;

const RANK_CHARS: [char; 13] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A',
];
const SUIT_CHARS: [char; 4] = ['c', 'd', 'h', 's'];

#[inline]
pub fn card_rank(card: Card) -> u8 {
    card >> 2
}

#[inline]
pub fn card_suit(card: Card) -> u8 {
    card & 3
}

/// Returns the bitmask of a single card.
#[inline]
pub fn card_mask(card: Card) -> u64 {
    1 << card
}

/// Returns the bitmask of a set of cards.
#[inline]
pub fn board_mask(cards: &[Card]) -> u64 {
    cards.iter().fold(0, |mask, &card| mask | card_mask(card))
}

/// Returns whether the two card sets share a card.
#[inline]
pub fn masks_overlap(mask1: u64, mask2: u64) -> bool {
    mask1 & mask2 != 0
}

/// Extracts the cards of a bitmask in ascending order.
pub fn mask_to_cards(mut mask: u64) -> Vec<Card> {
    let mut ret = Vec::with_capacity(mask.count_ones() as usize);
    while mask != 0 {
        ret.push(mask.trailing_zeros() as Card);
        mask &= mask - 1;
    }
    ret
}

/// Attempts to convert a rank character to a rank index.
/// `'A'` => `12`, `'K'` => `11`, ..., `'2'` => `0`.
pub fn char_to_rank(c: char) -> SolverResult<u8> {
    match c {
        'A' | 'a' => Ok(12),
        'K' | 'k' => Ok(11),
        'Q' | 'q' => Ok(10),
        'J' | 'j' => Ok(9),
        'T' | 't' => Ok(8),
        '2'..='9' => Ok(c as u8 - b'2'),
        _ => Err(SolverError::InvalidCard(c.to_string())),
    }
}

/// Attempts to convert a suit character to a suit index.
/// `'c'` => `0`, `'d'` => `1`, `'h'` => `2`, `'s'` => `3`.
pub fn char_to_suit(c: char) -> SolverResult<u8> {
    match c {
        'c' | 'C' => Ok(0),
        'd' | 'D' => Ok(1),
        'h' | 'H' => Ok(2),
        's' | 'S' => Ok(3),
        _ => Err(SolverError::InvalidCard(c.to_string())),
    }
}

/// Attempts to convert a two-character string (e.g., `"As"`) into a card.
pub fn card_from_str(s: &str) -> SolverResult<Card> {
    let mut chars = s.chars();
    let rank_char = chars.next();
    let suit_char = chars.next();
    match (rank_char, suit_char, chars.next()) {
        (Some(r), Some(u), None) => Ok(char_to_rank(r)? * 4 + char_to_suit(u)?),
        _ => Err(SolverError::InvalidCard(s.to_string())),
    }
}

/// Converts a card into its two-character string (e.g., `51` => `"As"`).
pub fn card_to_string(card: Card) -> String {
    debug_assert!((card as usize) < NUM_CARDS);
    let rank = RANK_CHARS[card_rank(card) as usize];
    let suit = SUIT_CHARS[card_suit(card) as usize];
    format!("{rank}{suit}")
}

/// Parses a board given as concatenated or separated card strings
/// (e.g., `"Td9d6h"` or `"Td,9d,6h"`).
pub fn board_from_str(s: &str) -> SolverResult<Vec<Card>> {
    let stripped: String = s.chars().filter(|c| !", |".contains(*c)).collect();
    if stripped.len() % 2 != 0 {
        return Err(SolverError::InvalidBoard(s.to_string()));
    }

    let bytes = stripped.as_bytes();
    let mut board = Vec::with_capacity(stripped.len() / 2);
    for chunk in bytes.chunks(2) {
        let card_str = std::str::from_utf8(chunk).unwrap_or_default();
        let card = card_from_str(card_str)?;
        if board.contains(&card) {
            return Err(SolverError::InvalidBoard(format!("duplicate card in {s}")));
        }
        board.push(card);
    }
    Ok(board)
}

/// Returns an index of the given card pair.
///
/// `"2d2c"` => `0`, `"2h2c"` => `1`, ..., `"AsAh"` => `1325`.
#[inline]
pub fn card_pair_index(mut card1: Card, mut card2: Card) -> usize {
    if card1 > card2 {
        std::mem::swap(&mut card1, &mut card2);
    }
    card1 as usize * (101 - card1 as usize) / 2 + card2 as usize - 1
}
