use crate::card::*;
use crate::private_cards::*;

/// Per-deal suit-equivalence table plus the hand-index permutations that
/// undo a suit exchange inside each player's range.
///
/// For every public state reachable with at most one chance card added to
/// the initial board, `offset(deal, suit)` is `0` if the suit must be
/// explored, or the negative distance to the smallest equivalent suit whose
/// sub-tree result can be reused after a suit swap. The table is consulted
/// only at chance nodes, whose own deal never encodes more than one card,
/// so rows stop at `deal == NUM_CARDS`.
pub struct IsomorphismTable {
    offsets: Vec<[i8; 4]>,
    swap_lists: [[Vec<(u16, u16)>; 6]; 2],
}

/// Index of an unordered suit pair: (0,1) => 0, (0,2) => 1, ..., (2,3) => 5.
#[inline]
fn suit_pair_index(suit1: u8, suit2: u8) -> usize {
    let (lo, hi) = if suit1 < suit2 {
        (suit1 as usize, suit2 as usize)
    } else {
        (suit2 as usize, suit1 as usize)
    };
    lo * (5 - lo) / 2 + hi - 1
}

impl IsomorphismTable {
    /// Precomputes the table for the given initial board and ranges. With
    /// `enabled == false` every offset is zero and no sub-tree is skipped.
    pub fn new(initial_board: &[Card], ranges: [&[PrivateCards]; 2], enabled: bool) -> Self {
        let num_rows = 1 + NUM_CARDS;
        let mut offsets = vec![[0i8; 4]; num_rows];

        if enabled {
            offsets[0] = Self::suit_offsets(initial_board, None);
            for card in 0..NUM_CARDS as Card {
                offsets[1 + card as usize] = Self::suit_offsets(initial_board, Some(card));
            }
        }

        let mut swap_lists: [[Vec<(u16, u16)>; 6]; 2] = Default::default();
        if enabled {
            for player in 0..2 {
                swap_lists[player] = Self::swap_lists_for(ranges[player]);
            }
        }

        Self {
            offsets,
            swap_lists,
        }
    }

    fn suit_offsets(initial_board: &[Card], extra: Option<Card>) -> [i8; 4] {
        let mut color_hash = [0u16; 4];
        for &card in initial_board.iter().chain(extra.iter()) {
            color_hash[card_suit(card) as usize] |= 1 << card_rank(card);
        }

        let mut offsets = [0i8; 4];
        for suit in 1..4usize {
            for other in 0..suit {
                if color_hash[other] == color_hash[suit] {
                    offsets[suit] = other as i8 - suit as i8;
                    break;
                }
            }
        }
        offsets
    }

    fn swap_lists_for(range: &[PrivateCards]) -> [Vec<(u16, u16)>; 6] {
        let mut reverse = vec![u16::MAX; 52 * 51 / 2];
        for (index, combo) in range.iter().enumerate() {
            reverse[combo.hash_code()] = index as u16;
        }

        let mut lists: [Vec<(u16, u16)>; 6] = Default::default();
        for suit1 in 0..4u8 {
            for suit2 in (suit1 + 1)..4 {
                let list = &mut lists[suit_pair_index(suit1, suit2)];
                let replace = |card: Card| -> Card {
                    if card_suit(card) == suit1 {
                        card - suit1 + suit2
                    } else if card_suit(card) == suit2 {
                        card + suit1 - suit2
                    } else {
                        card
                    }
                };

                for (index, combo) in range.iter().enumerate() {
                    let mapped = card_pair_index(replace(combo.card1), replace(combo.card2));
                    let mapped_index = reverse[mapped];
                    if mapped_index != u16::MAX && (index as u16) < mapped_index {
                        list.push((index as u16, mapped_index));
                    }
                }
            }
        }
        lists
    }

    /// Offset of `suit` at a chance node reached under `deal`.
    #[inline]
    pub fn offset(&self, deal: usize, suit: u8) -> i8 {
        debug_assert!(deal < self.offsets.len());
        self.offsets[deal][suit as usize]
    }

    /// Swaps the two suits inside a per-hand vector of `player`.
    pub fn apply_swap(&self, values: &mut [f32], player: usize, suit1: u8, suit2: u8) {
        debug_assert_ne!(suit1, suit2);
        for &(i, j) in &self.swap_lists[player][suit_pair_index(suit1, suit2)] {
            values.swap(i as usize, j as usize);
        }
    }

    /// The swap pairs of a player for an unordered suit pair.
    pub(crate) fn swap_pairs(&self, player: usize, suit1: u8, suit2: u8) -> &[(u16, u16)] {
        &self.swap_lists[player][suit_pair_index(suit1, suit2)]
    }
}
