use crate::card::*;

/// Hand-rank evaluator interface.
///
/// `get_rank` scores a two-card hand against a full board; a **lower** rank
/// is a **stronger** hand, and equal ranks split the pot. The solver treats
/// the evaluator as immutable for the whole run, so implementations are
/// free to precompute lookup tables.
pub trait Compairer: Send + Sync {
    fn get_rank(&self, hole: [Card; 2], board: &[Card]) -> u32;
}

/// Default evaluator computing 7-card ranks directly.
///
/// The rank packs the hand category into the high bits and the five
/// deciding card ranks below it, each stored inverted (`12 - rank`, four
/// bits apiece) so that the numeric order of the whole word matches the
/// lower-is-stronger contract without any post-processing.
#[derive(Debug, Default, Clone, Copy)]
pub struct HandEvaluator;

const STRAIGHT_FLUSH: u32 = 0;
const FOUR_OF_A_KIND: u32 = 1;
const FULL_HOUSE: u32 = 2;
const FLUSH: u32 = 3;
const STRAIGHT: u32 = 4;
const THREE_OF_A_KIND: u32 = 5;
const TWO_PAIR: u32 = 6;
const ONE_PAIR: u32 = 7;
const HIGH_CARD: u32 = 8;

impl Compairer for HandEvaluator {
    fn get_rank(&self, hole: [Card; 2], board: &[Card]) -> u32 {
        debug_assert_eq!(board.len(), 5);

        let mut counts = [0u8; 13];
        let mut suit_ranks = [0u16; 4];
        for &card in hole.iter().chain(board) {
            counts[card_rank(card) as usize] += 1;
            suit_ranks[card_suit(card) as usize] |= 1 << card_rank(card);
        }

        rank_from_counts(&counts, &suit_ranks)
    }
}

/// Packs a category and its deciding ranks (highest significance first)
/// into a single orderable word. Every category supplies a fixed number of
/// deciding ranks, so the zero padding never breaks comparisons.
fn pack_rank(category: u32, deciders: impl IntoIterator<Item = u8>) -> u32 {
    let mut rank = category;
    let mut packed = 0;
    for decider in deciders {
        rank = (rank << 4) | (12 - decider) as u32;
        packed += 1;
    }
    debug_assert!(packed <= 5);
    rank << (4 * (5 - packed))
}

/// Iterates the set rank bits from ace downwards.
fn ranks_high_to_low(rankset: u16) -> impl Iterator<Item = u8> {
    (0..13u8).rev().filter(move |rank| rankset >> rank & 1 != 0)
}

/// Highest card of a five-high-or-better run, if any; an ace plays low
/// only in the wheel.
fn straight_high(rankset: u16) -> Option<u8> {
    for high in (4..13u8).rev() {
        let window = 0b1_1111 << (high - 4);
        if rankset & window == window {
            return Some(high);
        }
    }
    if rankset >> 12 & 1 != 0 && rankset & 0b1111 == 0b1111 {
        return Some(3);
    }
    None
}

fn rank_from_counts(counts: &[u8; 13], suit_ranks: &[u16; 4]) -> u32 {
    let all_ranks = suit_ranks.iter().fold(0, |acc, ranks| acc | ranks);

    // seven cards cannot hold both a flush and a quads/full-house hand, so
    // a found flush is only ever beaten by a straight flush
    for &suited in suit_ranks {
        if suited.count_ones() >= 5 {
            return match straight_high(suited) {
                Some(high) => pack_rank(STRAIGHT_FLUSH, [high]),
                None => pack_rank(FLUSH, ranks_high_to_low(suited).take(5)),
            };
        }
    }

    let mut trips = Vec::new();
    let mut pairs = Vec::new();
    for rank in (0..13u8).rev() {
        match counts[rank as usize] {
            4 => {
                let kicker = ranks_high_to_low(all_ranks & !(1 << rank)).take(1);
                return pack_rank(FOUR_OF_A_KIND, std::iter::once(rank).chain(kicker));
            }
            3 => trips.push(rank),
            2 => pairs.push(rank),
            _ => {}
        }
    }

    if let Some(&trip_rank) = trips.first() {
        let pair_rank = trips.get(1).copied().max(pairs.first().copied());
        if let Some(pair_rank) = pair_rank {
            return pack_rank(FULL_HOUSE, [trip_rank, pair_rank]);
        }
    }

    if let Some(high) = straight_high(all_ranks) {
        return pack_rank(STRAIGHT, [high]);
    }

    if let Some(&trip_rank) = trips.first() {
        let kickers = ranks_high_to_low(all_ranks & !(1 << trip_rank)).take(2);
        return pack_rank(THREE_OF_A_KIND, std::iter::once(trip_rank).chain(kickers));
    }

    match pairs.as_slice() {
        &[] => pack_rank(HIGH_CARD, ranks_high_to_low(all_ranks).take(5)),
        &[pair_rank] => {
            let kickers = ranks_high_to_low(all_ranks & !(1 << pair_rank)).take(3);
            pack_rank(ONE_PAIR, std::iter::once(pair_rank).chain(kickers))
        }
        &[first, second, ..] => {
            let remaining = all_ranks & !(1 << first) & !(1 << second);
            let kicker = ranks_high_to_low(remaining).take(1);
            pack_rank(TWO_PAIR, [first, second].into_iter().chain(kicker))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::board_from_str;

    fn rank_of(hole: &str, board: &str) -> u32 {
        let hole = board_from_str(hole).unwrap();
        let board = board_from_str(board).unwrap();
        HandEvaluator.get_rank([hole[0], hole[1]], &board)
    }

    #[test]
    fn test_lower_rank_is_stronger() {
        let board = "QsJh2c7d2s";
        let aces = rank_of("AhAc", board);
        let kings = rank_of("KsKh", board);
        let fives = rank_of("5h5s", board);
        assert!(aces < kings);
        assert!(kings < fives);
    }

    #[test]
    fn test_category_order() {
        // straight flush < quads < full house < flush < straight < trips
        // < two pair < pair < high card
        let ladder = [
            rank_of("9h8h", "7h6h5h2c3d"),
            rank_of("2h2s", "7h6h2c2d9s"),
            rank_of("7s7c", "7h6h2c2d9s"),
            rank_of("AhTh", "7h6h2h3d9s"),
            rank_of("9c8d", "7h6h5s2d3c"),
            rank_of("7s7c", "7h6h2c4d9s"),
            rank_of("7s7c", "6s6h2c4d9s"),
            rank_of("7s7c", "6s5h2c4d9s"),
            rank_of("AcKd", "7h6h2c4d9s"),
        ];
        assert!(ladder.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_kickers_decide_within_category() {
        let board = "Kc8d5h3s2c";
        // pair of kings, ace kicker vs queen kicker
        assert!(rank_of("KhAd", board) < rank_of("KhQd", board));
        // two pair: bigger second pair wins
        assert!(rank_of("8h5s", "8c5d2h3c Kd") < rank_of("8h3h", "8c5d2d3c Kd"));
        // flush decided by its highest cards
        assert!(rank_of("AcJc", "Kc8c5c3d2h") < rank_of("QcJc", "Kc8c5c3d2h"));
        // quads kicker
        assert!(rank_of("9h9d", "9s9cAd5h2c") < rank_of("9h9d", "9s9cKd5h2c"));
    }

    #[test]
    fn test_wheel_straight() {
        let wheel = rank_of("Ac2d", "3h4s5c9d8h");
        let six_high = rank_of("6c2d", "3h4s5c9d8h");
        let no_straight = rank_of("Ac2d", "3h4s6c9d8h");
        assert!(six_high < wheel);
        assert!(wheel < no_straight);
    }

    #[test]
    fn test_full_house_from_two_trips() {
        // two sets of trips make a full house of the higher trips
        let double_trips = rank_of("7s7c", "7h4d4h4sKc");
        let plain_full = rank_of("7s7c", "7h4d4hKsKc");
        // sevens full of fours either way, but the second board pairs kings
        assert_eq!(double_trips, rank_of("7s7c", "7h4d4c4sKd"));
        assert!(plain_full < double_trips);
    }

    #[test]
    fn test_tie_is_equal() {
        let board = "QsJhTc7d2s";
        // both play the board straight with the same high card
        assert_eq!(rank_of("AhKc", board), rank_of("AdKs", board));
    }
}
