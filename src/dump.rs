//! Strategy output: a nested JSON mirror of the trained tree.
//!
//! Suit isomorphism is undone on the way out. A skipped chance card reuses
//! the canonical sibling's sub-tree: the recursion keeps walking the
//! canonical deal while the recorded suit exchange is replayed against
//! every per-hand table and against the dealt-card names, so the emitted
//! JSON is entirely in actual-card space.

use crate::card::*;
use crate::solver::*;
use crate::tree::*;
use serde_json::{json, Map, Value};

fn round_to(value: f32, digits: i32) -> f64 {
    let precision = 10f64.powi(digits);
    (value as f64 * precision).round() / precision
}

fn relabel(card: Card, exchanges: &[(u8, u8)]) -> Card {
    let suit = card_suit(card);
    match exchanges.first() {
        Some(&(suit1, suit2)) if suit == suit1 => card - suit1 + suit2,
        Some(&(suit1, suit2)) if suit == suit2 => card + suit1 - suit2,
        _ => card,
    }
}

impl Solver {
    /// Dumps the average strategies (plus EVs, and equities/ranges when
    /// enabled) of every action node within `max_depth` chance rounds.
    pub fn dump(&self, max_depth: usize) -> Value {
        let reach_probs = self.private_cards_manager().initial_reach_probs();
        self.dump_node(
            &self.tree().root,
            0,
            max_depth,
            0,
            &[],
            &reach_probs,
            self.initial_board_mask(),
        )
        .unwrap_or(Value::Null)
    }

    fn dump_node(
        &self,
        node: &GameNode,
        depth: usize,
        max_depth: usize,
        deal: usize,
        exchanges: &[(u8, u8)],
        reach_probs: &[Vec<f32>; 2],
        board: u64,
    ) -> Option<Value> {
        if depth >= max_depth {
            return None;
        }
        match node {
            GameNode::Action(n) => {
                Some(self.dump_action(n, depth, max_depth, deal, exchanges, reach_probs, board))
            }
            GameNode::Chance(n) => {
                self.dump_chance(n, depth, max_depth, deal, exchanges, reach_probs, board)
            }
            _ => None,
        }
    }

    fn dump_action(
        &self,
        node: &ActionNode,
        depth: usize,
        max_depth: usize,
        deal: usize,
        exchanges: &[(u8, u8)],
        reach_probs: &[Vec<f32>; 2],
        board: u64,
    ) -> Value {
        let player = node.player;
        let actions_str: Vec<String> = node.actions.iter().map(ToString::to_string).collect();

        let snapshot = {
            let slot = node.trainable(deal);
            slot.as_ref().map(|trainable| {
                (
                    self.exchanged_rows(player, &trainable.average_strategy(), exchanges),
                    self.exchanged_rows(player, trainable.evs(), exchanges),
                    self.exchanged_rows(player, trainable.equities(), exchanges),
                )
            })
        };

        let mut obj = Map::new();
        obj.insert("actions".to_string(), json!(&actions_str));
        obj.insert("player".to_string(), json!(player));

        let mut childrens = Map::new();
        for (action_id, (action, child)) in node.actions.iter().zip(&node.children).enumerate() {
            let mut new_reach = reach_probs.clone();
            if let Some((strategy_rows, _, _)) = &snapshot {
                for (reach, row) in new_reach[player].iter_mut().zip(strategy_rows) {
                    *reach *= row[action_id];
                }
            }
            if let Some(sub) =
                self.dump_node(child, depth, max_depth, deal, exchanges, &new_reach, board)
            {
                childrens.insert(action.to_string(), sub);
            }
        }
        if !childrens.is_empty() {
            obj.insert("childrens".to_string(), Value::Object(childrens));
        }

        if let Some((strategy_rows, ev_rows, equity_rows)) = &snapshot {
            obj.insert(
                "strategy".to_string(),
                json!({
                    "actions": &actions_str,
                    "strategy": self.rows_to_json(player, strategy_rows, 3),
                }),
            );
            obj.insert(
                "evs".to_string(),
                json!({
                    "actions": &actions_str,
                    "evs": self.rows_to_json(player, ev_rows, 2),
                }),
            );
            if self.config().enable_equity {
                obj.insert(
                    "equities".to_string(),
                    json!({
                        "actions": &actions_str,
                        "equities": self.rows_to_json(player, equity_rows, 3),
                    }),
                );
            }
            if self.config().enable_range {
                let mut ranges = Map::new();
                ranges.insert("player".to_string(), json!(player));
                for (range_player, key) in [(0usize, "oop_range"), (1, "ip_range")] {
                    ranges.insert(
                        key.to_string(),
                        self.keyed_reach(range_player, &reach_probs[range_player]),
                    );
                }
                obj.insert("ranges".to_string(), Value::Object(ranges));
            }
        }

        obj.insert("node_type".to_string(), json!("action_node"));
        Value::Object(obj)
    }

    /// Converts a row-major `[actions x hands]` slot table into per-hand
    /// rows with the recorded suit exchanges replayed on the hand axis, so
    /// the rows line up with the actual-card-space combo order.
    fn exchanged_rows(
        &self,
        player: usize,
        values: &[f32],
        exchanges: &[(u8, u8)],
    ) -> Vec<Vec<f32>> {
        let num_hands = self.range(player).len();
        let num_actions = values.len() / num_hands;

        let mut rows: Vec<Vec<f32>> = (0..num_hands)
            .map(|hand| {
                (0..num_actions)
                    .map(|action| values[action * num_hands + hand])
                    .collect()
            })
            .collect();

        for &(suit1, suit2) in exchanges {
            for &(i, j) in self.isomorphism_table().swap_pairs(player, suit1, suit2) {
                rows.swap(i as usize, j as usize);
            }
        }
        rows
    }

    fn rows_to_json(&self, player: usize, rows: &[Vec<f32>], digits: i32) -> Value {
        let mut map = Map::new();
        for (combo, row) in self.range(player).iter().zip(rows) {
            let rounded: Vec<f64> = row.iter().map(|&v| round_to(v, digits)).collect();
            map.insert(combo.to_string(), json!(rounded));
        }
        Value::Object(map)
    }

    /// Per-hand reach probabilities, zero-filtered after rounding.
    fn keyed_reach(&self, player: usize, reach: &[f32]) -> Value {
        let mut map = Map::new();
        for (combo, &prob) in self.range(player).iter().zip(reach) {
            let rounded = round_to(prob, 3);
            if rounded > 0.0 {
                map.insert(combo.to_string(), json!(rounded));
            }
        }
        Value::Object(map)
    }

    fn dump_chance(
        &self,
        node: &ChanceNode,
        depth: usize,
        max_depth: usize,
        deal: usize,
        exchanges: &[(u8, u8)],
        reach_probs: &[Vec<f32>; 2],
        board: u64,
    ) -> Option<Value> {
        // at most one suit exchange can be pending at a chance node
        debug_assert!(exchanges.len() <= 1);

        let mut dealcards = Map::new();
        for card in 0..NUM_CARDS as Card {
            if masks_overlap(card_mask(card), board) {
                continue;
            }

            let suit = card_suit(card);
            let offset = self.isomorphism_table().offset(deal, suit);
            let mut new_exchanges = exchanges.to_vec();
            let mut canonical_card = card;
            if offset < 0 {
                canonical_card = (card as i8 + offset) as Card;
                new_exchanges.push((suit, (suit as i8 + offset) as u8));
            }
            let new_deal = Self::next_deal(deal, canonical_card);

            // the outer exchange renames the dealt card into actual space
            let actual_card = relabel(card, exchanges);

            let mut new_reach = reach_probs.clone();
            for player in 0..2 {
                for (hand, combo) in self.range(player).iter().enumerate() {
                    if masks_overlap(card_mask(actual_card), combo.hand_mask()) {
                        new_reach[player][hand] = 0.0;
                    }
                }
            }

            // the recursion keeps walking canonical deals, so the board
            // mask extends with the canonical card; only the displayed
            // name and the reach update live in actual-card space
            if let Some(sub) = self.dump_node(
                &node.child,
                depth + 1,
                max_depth,
                new_deal,
                &new_exchanges,
                &new_reach,
                board | card_mask(canonical_card),
            ) {
                dealcards.insert(card_to_string(actual_card), sub);
            }
        }

        if dealcards.is_empty() {
            return None;
        }

        let mut obj = Map::new();
        obj.insert("deal_number".to_string(), json!(dealcards.len()));
        obj.insert("dealcards".to_string(), Value::Object(dealcards));
        obj.insert("node_type".to_string(), json!("chance_node"));
        Some(Value::Object(obj))
    }
}
