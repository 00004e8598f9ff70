//! Exploitability measurement: best-response counterfactual values against
//! the opponent's average strategy.

use crate::card::*;
use crate::solver::*;
use crate::tree::*;
use rayon::prelude::*;

impl Solver {
    /// Exploitability of the current average strategies, in chips: half the
    /// sum of both players' best-response EVs (zero at an exact
    /// equilibrium).
    pub fn exploitability(&self) -> f32 {
        let reach_probs = self.private_cards_manager().initial_reach_probs();
        let mut total = 0.0f64;
        for player in 0..2 {
            let cfv = self.best_response_cfv(
                player,
                &self.tree().root,
                &reach_probs[1 - player],
                self.initial_board_mask(),
                0,
            );
            for (value, combo) in cfv.iter().zip(self.range(player)) {
                total += *value as f64 * combo.weight as f64;
            }
        }
        (total / 2.0 / self.matchup_weight()) as f32
    }

    /// Total weight mass of blocker-compatible hand matchups, used to turn
    /// reach-weighted value sums into per-event chips.
    fn matchup_weight(&self) -> f64 {
        let oppo_range = self.range(1);
        let mut oppo_sum = 0.0f64;
        let mut oppo_card_sum = [0.0f64; NUM_CARDS];
        for combo in oppo_range {
            oppo_sum += combo.weight as f64;
            oppo_card_sum[combo.card1 as usize] += combo.weight as f64;
            oppo_card_sum[combo.card2 as usize] += combo.weight as f64;
        }

        let mut total = 0.0f64;
        for (index, combo) in self.range(0).iter().enumerate() {
            let plus = self
                .private_cards_manager()
                .same_hand_index(0, 1, index)
                .map_or(0.0, |other| oppo_range[other].weight as f64);
            total += combo.weight as f64
                * (oppo_sum - oppo_card_sum[combo.card1 as usize]
                    - oppo_card_sum[combo.card2 as usize]
                    + plus);
        }
        total
    }

    fn best_response_cfv(
        &self,
        player: usize,
        node: &GameNode,
        reach_probs: &[f32],
        board: u64,
        deal: usize,
    ) -> Vec<f32> {
        match node {
            GameNode::Terminal(n) => self.terminal_utility(player, n, reach_probs, board).payoffs,
            GameNode::Showdown(n) => self.showdown_utility(player, n, reach_probs, board).payoffs,
            GameNode::Chance(n) => self.best_response_chance(player, n, reach_probs, board, deal),
            GameNode::Action(n) => self.best_response_action(player, n, reach_probs, board, deal),
        }
    }

    fn best_response_chance(
        &self,
        player: usize,
        node: &ChanceNode,
        reach_probs: &[f32],
        board: u64,
        deal: usize,
    ) -> Vec<f32> {
        let oppo_range = self.range(1 - player);
        let player_len = self.range(player).len();
        let possible_deals = (NUM_CARDS - board.count_ones() as usize - 2) as f32;
        let iso = self.isomorphism_table();

        let mut valid_cards = Vec::with_capacity(NUM_CARDS);
        for card in 0..NUM_CARDS as Card {
            if masks_overlap(card_mask(card), board) || iso.offset(deal, card_suit(card)) < 0 {
                continue;
            }
            valid_cards.push(card);
        }

        let computed: Vec<(Card, Vec<f32>)> = valid_cards
            .par_iter()
            .map(|&card| {
                let card_bit = card_mask(card);
                let mut new_reach = vec![0.0; oppo_range.len()];
                for (hand, combo) in oppo_range.iter().enumerate() {
                    if !masks_overlap(card_bit, combo.hand_mask()) {
                        new_reach[hand] = reach_probs[hand] / possible_deals;
                    }
                }
                let cfv = self.best_response_cfv(
                    player,
                    &node.child,
                    &new_reach,
                    board | card_bit,
                    Self::next_deal(deal, card),
                );
                (card, cfv)
            })
            .collect();

        let mut results: Vec<Option<Vec<f32>>> = (0..NUM_CARDS).map(|_| None).collect();
        for (card, cfv) in computed {
            results[card as usize] = Some(cfv);
        }

        let mut total = vec![0.0; player_len];
        for card in 0..NUM_CARDS as Card {
            let suit = card_suit(card);
            let offset = iso.offset(deal, suit);
            if offset < 0 {
                let sibling = (card as i8 + offset) as usize;
                if let Some(cfv) = &results[sibling] {
                    let mut swapped = cfv.clone();
                    iso.apply_swap(&mut swapped, player, suit, (suit as i8 + offset) as u8);
                    crate::sliceop::add_slice(&mut total, &swapped);
                }
            } else if let Some(cfv) = &results[card as usize] {
                crate::sliceop::add_slice(&mut total, cfv);
            }
        }
        total
    }

    fn best_response_action(
        &self,
        player: usize,
        node: &ActionNode,
        reach_probs: &[f32],
        board: u64,
        deal: usize,
    ) -> Vec<f32> {
        let num_actions = node.actions.len();
        let num_hands = self.range(node.player).len();

        let average_strategy = {
            let slot = node.trainable(deal);
            match slot.as_ref() {
                Some(trainable) => trainable.average_strategy(),
                None => vec![1.0 / num_actions as f32; num_actions * num_hands],
            }
        };

        if node.player == player {
            // best response: element-wise maximum over the actions
            let mut best = vec![f32::NEG_INFINITY; self.range(player).len()];
            for child in &node.children {
                let cfv = self.best_response_cfv(player, child, reach_probs, board, deal);
                for (best_value, value) in best.iter_mut().zip(&cfv) {
                    if *value > *best_value {
                        *best_value = *value;
                    }
                }
            }
            best
        } else {
            let mut total = vec![0.0; self.range(player).len()];
            for (action_id, child) in node.children.iter().enumerate() {
                let mut new_reach = reach_probs.to_vec();
                for (hand, reach) in new_reach.iter_mut().enumerate() {
                    *reach *= average_strategy[action_id * num_hands + hand];
                }
                let cfv = self.best_response_cfv(player, child, &new_reach, board, deal);
                crate::sliceop::add_slice(&mut total, &cfv);
            }
            total
        }
    }
}
