use crate::card::*;
use crate::hand::*;
use crate::private_cards::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A river combo of one player: the combo, its hand rank on the final
/// board, and its index into the player's full range (used to address the
/// reach-probability vector).
#[derive(Debug, Clone, Copy)]
pub struct RiverCombs {
    pub private_cards: PrivateCards,
    pub rank: u32,
    pub reach_prob_index: usize,
}

/// Produces and caches each player's river combos for a given final board.
///
/// Combos sharing a card with the board are dropped, and the list is sorted
/// weakest hand first (rank descending; a lower rank is a stronger hand),
/// which is the order the showdown sweep consumes.
pub struct RiverRangeManager {
    compairer: Arc<dyn Compairer>,
    caches: [Mutex<HashMap<u64, Arc<Vec<RiverCombs>>>>; 2],
}

impl RiverRangeManager {
    pub fn new(compairer: Arc<dyn Compairer>) -> Self {
        Self {
            compairer,
            caches: [Mutex::new(HashMap::new()), Mutex::new(HashMap::new())],
        }
    }

    pub fn river_combs(
        &self,
        player: usize,
        range: &[PrivateCards],
        board_mask: u64,
    ) -> Arc<Vec<RiverCombs>> {
        debug_assert_eq!(board_mask.count_ones(), 5);

        let mut cache = self
            .caches[player]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        cache
            .entry(board_mask)
            .or_insert_with(|| Arc::new(self.compute_river_combs(range, board_mask)))
            .clone()
    }

    fn compute_river_combs(&self, range: &[PrivateCards], board_mask: u64) -> Vec<RiverCombs> {
        let board = mask_to_cards(board_mask);
        let mut combs = Vec::with_capacity(range.len());

        for (index, combo) in range.iter().enumerate() {
            if masks_overlap(combo.hand_mask(), board_mask) {
                continue;
            }
            combs.push(RiverCombs {
                private_cards: *combo,
                rank: self.compairer.get_rank([combo.card1, combo.card2], &board),
                reach_prob_index: index,
            });
        }

        combs.sort_by(|a, b| b.rank.cmp(&a.rank));
        combs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::parse_range;

    #[test]
    fn test_sorted_weakest_first_and_filtered() {
        let range = parse_range("AhAc,KsKh,5h5s,7d7h").unwrap();
        let board = board_mask(&board_from_str("QsJh2c7d2s").unwrap());

        let rrm = RiverRangeManager::new(Arc::new(HandEvaluator));
        let combs = rrm.river_combs(0, &range, board);

        // 7d7h intersects the board
        assert_eq!(combs.len(), 3);
        // weakest first: 5h5s, KsKh, AhAc
        assert_eq!(combs[0].private_cards.to_string(), "5s5h");
        assert_eq!(combs[2].private_cards.to_string(), "AhAc");
        assert!(combs[0].rank > combs[1].rank);
        assert!(combs[1].rank > combs[2].rank);
        // reach indices refer to the original range order
        assert_eq!(combs[2].reach_prob_index, 0);
    }

    #[test]
    fn test_cache_returns_same_list() {
        let range = parse_range("AhAc,KsKh").unwrap();
        let board = board_mask(&board_from_str("QsJh2c7d2s").unwrap());
        let rrm = RiverRangeManager::new(Arc::new(HandEvaluator));
        let first = rrm.river_combs(0, &range, board);
        let second = rrm.river_combs(0, &range, board);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
