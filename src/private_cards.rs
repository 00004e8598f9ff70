use crate::card::*;
use crate::error::*;

/// A weighted two-card combo of one player.
///
/// The cards are ordered (`card1 < card2`) and must be distinct and off the
/// initial board; the weight is the combo's share in the player's range.
#[derive(Debug, Clone, Copy)]
pub struct PrivateCards {
    pub card1: Card,
    pub card2: Card,
    pub weight: f32,
}

impl PrivateCards {
    #[inline]
    pub fn new(card1: Card, card2: Card, weight: f32) -> Self {
        debug_assert!(card1 != card2);
        let (card1, card2) = if card1 < card2 {
            (card1, card2)
        } else {
            (card2, card1)
        };
        Self {
            card1,
            card2,
            weight,
        }
    }

    /// Unique identifier of the card pair (weight-independent).
    #[inline]
    pub fn hash_code(&self) -> usize {
        card_pair_index(self.card1, self.card2)
    }

    #[inline]
    pub fn hand_mask(&self) -> u64 {
        card_mask(self.card1) | card_mask(self.card2)
    }
}

impl std::fmt::Display for PrivateCards {
    /// Higher card first, e.g. `"AhKs"`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            card_to_string(self.card2),
            card_to_string(self.card1)
        )
    }
}

const NUM_CARD_PAIRS: usize = 52 * 51 / 2;

/// Holds both players' ranges and translates hand indices between them.
///
/// The combo order of each range is fixed at construction and defines the
/// hand-index addressing used by every other component.
pub struct PrivateCardsManager {
    ranges: [Vec<PrivateCards>; 2],
    initial_board_mask: u64,
    pair_to_index: [Vec<u16>; 2],
}

impl PrivateCardsManager {
    /// Validates the ranges against the initial board: duplicated combos are
    /// a fatal input error, and combos intersecting the board are stripped.
    pub fn new(ranges: [Vec<PrivateCards>; 2], board_mask: u64) -> SolverResult<Self> {
        let mut stripped: [Vec<PrivateCards>; 2] = Default::default();
        let mut pair_to_index = [vec![u16::MAX; NUM_CARD_PAIRS], vec![u16::MAX; NUM_CARD_PAIRS]];

        for player in 0..2 {
            let mut seen = vec![false; NUM_CARD_PAIRS];
            for combo in &ranges[player] {
                if seen[combo.hash_code()] {
                    return Err(SolverError::DuplicateCombo(combo.to_string()));
                }
                seen[combo.hash_code()] = true;
                if !masks_overlap(combo.hand_mask(), board_mask) {
                    pair_to_index[player][combo.hash_code()] = stripped[player].len() as u16;
                    stripped[player].push(*combo);
                }
            }
            if stripped[player].is_empty() {
                return Err(SolverError::EmptyRange);
            }
        }

        Ok(Self {
            ranges: stripped,
            initial_board_mask: board_mask,
            pair_to_index,
        })
    }

    #[inline]
    pub fn range(&self, player: usize) -> &[PrivateCards] {
        &self.ranges[player]
    }

    #[inline]
    pub fn initial_board_mask(&self) -> u64 {
        self.initial_board_mask
    }

    /// Given `from_player`'s hand index, returns `to_player`'s index of the
    /// card-identical combo, if that combo is in `to_player`'s range.
    #[inline]
    pub fn same_hand_index(
        &self,
        from_player: usize,
        to_player: usize,
        index: usize,
    ) -> Option<usize> {
        let combo = &self.ranges[from_player][index];
        match self.pair_to_index[to_player][combo.hash_code()] {
            u16::MAX => None,
            idx => Some(idx as usize),
        }
    }

    /// Initial reach probabilities: each combo's range weight.
    pub fn initial_reach_probs(&self) -> [Vec<f32>; 2] {
        [
            self.ranges[0].iter().map(|c| c.weight).collect(),
            self.ranges[1].iter().map(|c| c.weight).collect(),
        ]
    }
}
