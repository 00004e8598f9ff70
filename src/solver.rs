use crate::card::*;
use crate::error::*;
use crate::hand::*;
use crate::isomorphism::*;
use crate::private_cards::*;
use crate::river_ranges::*;
use crate::sliceop::*;
use crate::trainable::*;
use crate::tree::*;
use rand::Rng;
use rayon::prelude::*;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Driver-level configuration of one solving run.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum number of iterations.
    pub iteration_number: i32,

    /// Exploitability is evaluated every `print_interval` iterations; EV and
    /// equity snapshots are refreshed on the same cadence.
    pub print_interval: i32,

    /// Iterations `0..=warmup` use the sampled-suit chance estimator and do
    /// not accumulate into the reported strategy.
    pub warmup: i32,

    /// Stop when the exploitability (in chips) drops to this value.
    pub accuracy: f32,

    /// Worker threads for the chance-node fan-out; `0` keeps the default
    /// (one per logical core).
    pub num_threads: usize,

    /// Regret-update rule.
    pub algorithm: Algorithm,

    /// Skip suit-isomorphic chance sub-trees.
    pub use_isomorphism: bool,

    /// Also accumulate and report per-hand equities.
    pub enable_equity: bool,

    /// Include per-node reach probabilities in the strategy dump.
    pub enable_range: bool,

    /// Print a progress line while training.
    pub show_progress: bool,

    /// Optional JSON-lines log of the exploitability trajectory.
    pub log_file: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iteration_number: 1000,
            print_interval: 10,
            warmup: 0,
            accuracy: 0.0,
            num_threads: 0,
            algorithm: Algorithm::DiscountedCfr,
            use_isomorphism: true,
            enable_equity: false,
            enable_range: false,
            show_progress: false,
            log_file: None,
        }
    }
}

/// Per-hand counterfactual values returned by one traversal.
///
/// `payoffs` are in chip x opponent-reach units (not normalized by the
/// opponent's reach); `equity` is the analogous unnormalized equity sum and
/// stays empty unless equity reporting is enabled.
pub struct CfrResult {
    pub payoffs: Vec<f32>,
    pub equity: Vec<f32>,
}

/// The parallel CFR engine.
///
/// Holds the immutable game tree, both ranges, the precomputed suit
/// isomorphism table, and the showdown machinery; `train` runs the
/// alternating-update driver loop.
pub struct Solver {
    config: SolverConfig,
    tree: GameTree,
    initial_board: Vec<Card>,
    initial_board_mask: u64,
    pcm: PrivateCardsManager,
    rrm: RiverRangeManager,
    iso: IsomorphismTable,
}

impl Solver {
    pub fn new(
        mut tree: GameTree,
        ranges: [Vec<PrivateCards>; 2],
        initial_board: Vec<Card>,
        compairer: Arc<dyn Compairer>,
        config: SolverConfig,
    ) -> SolverResult<Self> {
        if initial_board.len() != tree.root_street.board_len() {
            return Err(SolverError::InvalidConfig(format!(
                "{} board cards given for a {:?} root",
                initial_board.len(),
                tree.root_street
            )));
        }
        if config.print_interval <= 0 {
            return Err(SolverError::InvalidConfig(
                "print interval must be positive".to_string(),
            ));
        }

        let initial_board_mask = board_mask(&initial_board);
        let pcm = PrivateCardsManager::new(ranges, initial_board_mask)?;
        tree.init_slots()?;

        let iso = IsomorphismTable::new(
            &initial_board,
            [pcm.range(0), pcm.range(1)],
            config.use_isomorphism,
        );

        Ok(Self {
            config,
            tree,
            initial_board,
            initial_board_mask,
            pcm,
            rrm: RiverRangeManager::new(compairer),
            iso,
        })
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    #[inline]
    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    #[inline]
    pub fn initial_board(&self) -> &[Card] {
        &self.initial_board
    }

    /// The de-duplicated, board-stripped range whose order defines the hand
    /// indices of `player`.
    #[inline]
    pub fn range(&self, player: usize) -> &[PrivateCards] {
        self.pcm.range(player)
    }

    #[inline]
    pub(crate) fn private_cards_manager(&self) -> &PrivateCardsManager {
        &self.pcm
    }

    #[inline]
    pub(crate) fn isomorphism_table(&self) -> &IsomorphismTable {
        &self.iso
    }

    #[inline]
    pub(crate) fn initial_board_mask(&self) -> u64 {
        self.initial_board_mask
    }

    /// Runs the driver loop: alternating per-player traversals with the
    /// exploitability stopping rule. Returns the last measured
    /// exploitability in chips.
    pub fn train(&self) -> SolverResult<f32> {
        if self.config.num_threads > 0 {
            // ignore the error if a global pool already exists
            let _ = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.num_threads)
                .build_global();
        }

        let mut log_writer = match &self.config.log_file {
            Some(path) => Some(BufWriter::new(File::create(path)?)),
            None => None,
        };

        let pot = self.tree.starting_pot as f32;
        let start = Instant::now();

        let mut exploitability = self.exploitability();
        if self.config.show_progress {
            println!(
                "initial exploitability: {:.4} ({:.2}% of pot)",
                exploitability,
                100.0 * exploitability / pot
            );
        }

        for iter in 0..self.config.iteration_number {
            self.solve_step(iter);

            if iter % self.config.print_interval == 0 && iter != 0 && iter >= self.config.warmup {
                exploitability = self.exploitability();
                if self.config.show_progress {
                    print!(
                        "\riteration: {} / {} (exploitability = {:.4} [{:.2}% of pot])",
                        iter + 1,
                        self.config.iteration_number,
                        exploitability,
                        100.0 * exploitability / pot
                    );
                    println!();
                }
                if let Some(writer) = &mut log_writer {
                    let line = serde_json::json!({
                        "iteration": iter,
                        "exploitability": exploitability,
                        "time_ms": start.elapsed().as_millis() as u64,
                    });
                    writeln!(writer, "{line}")?;
                }
                if exploitability <= self.config.accuracy {
                    break;
                }
            } else if self.config.show_progress {
                print!("\riteration: {} / {}", iter + 1, self.config.iteration_number);
                stdout().flush()?;
            }
        }

        if self.config.show_progress {
            println!();
        }
        if let Some(writer) = &mut log_writer {
            writer.flush()?;
        }

        Ok(exploitability)
    }

    /// Runs a single iteration (both players' traversals) outside the
    /// driver loop, for callers that manage their own schedule.
    pub fn solve_step(&self, iter: i32) {
        let reach_probs = self.pcm.initial_reach_probs();
        for player in 0..2 {
            self.cfr(
                player,
                &self.tree.root,
                &reach_probs[1 - player],
                iter,
                self.initial_board_mask,
                0,
            );
        }
    }

    /// One counterfactual-value traversal for `player`, carrying the
    /// opponent's reach probabilities.
    pub(crate) fn cfr(
        &self,
        player: usize,
        node: &GameNode,
        reach_probs: &[f32],
        iter: i32,
        board: u64,
        deal: usize,
    ) -> CfrResult {
        debug_assert_eq!(reach_probs.len(), self.pcm.range(1 - player).len());
        match node {
            GameNode::Action(n) => self.action_utility(player, n, reach_probs, iter, board, deal),
            GameNode::Chance(n) => self.chance_utility(player, n, reach_probs, iter, board, deal),
            GameNode::Terminal(n) => self.terminal_utility(player, n, reach_probs, board),
            GameNode::Showdown(n) => self.showdown_utility(player, n, reach_probs, board),
        }
    }

    /// Abstraction-deal value after dealing `card` under `deal`
    /// (`0` = no card yet, `1..=N` = one card, above = two cards).
    #[inline]
    pub(crate) fn next_deal(deal: usize, card: Card) -> usize {
        if deal == 0 {
            card as usize + 1
        } else {
            debug_assert!(deal <= NUM_CARDS);
            let origin = deal - 1;
            NUM_CARDS * origin + card as usize + 1 + NUM_CARDS
        }
    }

    /// Enumerates the suit-sibling deals of `deal` (those differing from it
    /// only in the suits of the dealt cards), skipping cards on the initial
    /// board. The first entry is the canonical slot at warm-up copy time.
    fn all_abstraction_deals(&self, deal: usize) -> Vec<usize> {
        let mut deals = Vec::new();
        if deal == 0 {
            deals.push(0);
        } else if deal <= NUM_CARDS {
            let origin = (deal - 1) / 4 * 4;
            for suit in 0..4 {
                let card = (origin + suit) as Card;
                if masks_overlap(card_mask(card), self.initial_board_mask) {
                    continue;
                }
                deals.push(origin + suit + 1);
            }
        } else {
            let compact = deal - (1 + NUM_CARDS);
            let first_origin = compact / NUM_CARDS / 4 * 4;
            let second_origin = compact % NUM_CARDS / 4 * 4;
            for suit1 in 0..4 {
                for suit2 in 0..4 {
                    if first_origin == second_origin && suit1 == suit2 {
                        continue;
                    }
                    let first = (first_origin + suit1) as Card;
                    let second = (second_origin + suit2) as Card;
                    if masks_overlap(card_mask(first), self.initial_board_mask)
                        || masks_overlap(card_mask(second), self.initial_board_mask)
                    {
                        continue;
                    }
                    deals.push(NUM_CARDS * (first_origin + suit1) + second_origin + suit2 + 1 + NUM_CARDS);
                }
            }
        }
        deals
    }

    fn chance_utility(
        &self,
        player: usize,
        node: &ChanceNode,
        reach_probs: &[f32],
        iter: i32,
        board: u64,
        deal: usize,
    ) -> CfrResult {
        let oppo = 1 - player;
        let oppo_range = self.pcm.range(oppo);
        let player_len = self.pcm.range(player).len();
        let possible_deals = (NUM_CARDS - board.count_ones() as usize - 2) as f32;

        let mut chance_utility = vec![0.0; player_len];
        let mut chance_equity = if self.config.enable_equity {
            vec![0.0; player_len]
        } else {
            Vec::new()
        };

        // during warm-up a single random suit represents each rank group,
        // scaled by the group's number of board-compatible cards
        let multiplier = if iter <= self.config.warmup {
            let mut multiplier = vec![0.0f32; NUM_CARDS];
            let mut rng = rand::thread_rng();
            for base in (0..NUM_CARDS).step_by(4) {
                let chosen = rng.gen_range(0..4);
                let group_count = (0..4)
                    .filter(|&suit| !masks_overlap(card_mask((base + suit) as Card), board))
                    .count();
                multiplier[base + chosen] = group_count as f32;
            }
            Some(multiplier)
        } else {
            None
        };

        let mut valid_cards = Vec::with_capacity(NUM_CARDS);
        for card in 0..NUM_CARDS as Card {
            if masks_overlap(card_mask(card), board) {
                continue;
            }
            if let Some(multiplier) = &multiplier {
                if multiplier[card as usize] == 0.0 {
                    continue;
                }
            }
            if self.iso.offset(deal, card_suit(card)) < 0 {
                continue;
            }
            valid_cards.push(card);
        }

        // parallel region: every valid chance card recurses independently
        let computed: Vec<(Card, CfrResult)> = valid_cards
            .par_iter()
            .map(|&card| {
                let card_bit = card_mask(card);
                let mut new_reach = vec![0.0; oppo_range.len()];
                for (hand, combo) in oppo_range.iter().enumerate() {
                    if !masks_overlap(card_bit, combo.hand_mask()) {
                        new_reach[hand] = reach_probs[hand] / possible_deals;
                    }
                }
                let result = self.cfr(
                    player,
                    &node.child,
                    &new_reach,
                    iter,
                    board | card_bit,
                    Self::next_deal(deal, card),
                );
                (card, result)
            })
            .collect();

        let mut results: Vec<Option<CfrResult>> = (0..NUM_CARDS).map(|_| None).collect();
        for (card, result) in computed {
            results[card as usize] = Some(result);
        }

        // serial, deterministic combine in deck order
        for card in 0..NUM_CARDS as Card {
            let scale = match &multiplier {
                Some(multiplier) => multiplier[card as usize],
                None => 1.0,
            };
            if scale == 0.0 {
                continue;
            }

            let suit = card_suit(card);
            let offset = self.iso.offset(deal, suit);

            if offset < 0 {
                // reuse the equivalent suit's sub-tree under a suit swap
                let sibling = (card as i8 + offset) as usize;
                let other_suit = (suit as i8 + offset) as u8;
                if let Some(child) = &results[sibling] {
                    let mut payoffs = child.payoffs.clone();
                    self.iso.apply_swap(&mut payoffs, player, suit, other_suit);
                    add_slice_scaled(&mut chance_utility, &payoffs, scale);
                    if !chance_equity.is_empty() && !child.equity.is_empty() {
                        let mut equity = child.equity.clone();
                        self.iso.apply_swap(&mut equity, player, suit, other_suit);
                        add_slice_scaled(&mut chance_equity, &equity, scale);
                    }
                }
            } else if let Some(child) = &results[card as usize] {
                add_slice_scaled(&mut chance_utility, &child.payoffs, scale);
                if !chance_equity.is_empty() && !child.equity.is_empty() {
                    add_slice_scaled(&mut chance_equity, &child.equity, scale);
                }
            }
        }

        CfrResult {
            payoffs: chance_utility,
            equity: chance_equity,
        }
    }

    fn action_utility(
        &self,
        player: usize,
        node: &ActionNode,
        reach_probs: &[f32],
        iter: i32,
        board: u64,
        deal: usize,
    ) -> CfrResult {
        let node_player = node.player;
        let num_actions = node.actions.len();
        let num_hands = self.pcm.range(node_player).len();
        let player_len = self.pcm.range(player).len();

        let current_strategy = {
            let mut slot = node.trainable(deal);
            let trainable = slot.get_or_insert_with(|| {
                Box::new(Trainable::new(self.config.algorithm, num_actions, num_hands))
            });
            trainable.current_strategy()
        };
        debug_assert_eq!(current_strategy.len(), num_actions * num_hands);

        let mut results = Vec::with_capacity(num_actions);
        for (action_id, child) in node.children.iter().enumerate() {
            if node_player != player {
                // the acting player is the opponent: bake their policy into
                // the reach vector we carry
                let strategy_row = row(&current_strategy, action_id, num_hands);
                let mut new_reach = reach_probs.to_vec();
                for (reach, prob) in new_reach.iter_mut().zip(strategy_row) {
                    *reach *= *prob;
                }
                results.push(self.cfr(player, child, &new_reach, iter, board, deal));
            } else {
                results.push(self.cfr(player, child, reach_probs, iter, board, deal));
            }
        }

        let mut payoffs = vec![0.0; player_len];
        let mut total_equity = if self.config.enable_equity {
            vec![0.0; player_len]
        } else {
            Vec::new()
        };

        for (action_id, result) in results.iter().enumerate() {
            if result.payoffs.is_empty() {
                continue;
            }
            if node_player == player {
                let strategy_row = row(&current_strategy, action_id, num_hands);
                fma_slice(&mut payoffs, strategy_row, &result.payoffs);
                if !total_equity.is_empty() && !result.equity.is_empty() {
                    fma_slice(&mut total_equity, strategy_row, &result.equity);
                }
            } else {
                add_slice(&mut payoffs, &result.payoffs);
                if !total_equity.is_empty() && !result.equity.is_empty() {
                    add_slice(&mut total_equity, &result.equity);
                }
            }
        }

        if node_player == player {
            let mut regrets = vec![0.0; num_actions * num_hands];
            for (action_id, result) in results.iter().enumerate() {
                let regret_row = row_mut(&mut regrets, action_id, num_hands);
                for (hand, regret) in regret_row.iter_mut().enumerate() {
                    *regret = result.payoffs[hand] - payoffs[hand];
                }
            }

            if iter > self.config.warmup {
                let mut slot = node.trainable(deal);
                if let Some(trainable) = slot.as_mut() {
                    trainable.update_regrets(&regrets, iter + 1, reach_probs);
                }
            } else {
                // warm-up: train the canonical suit-sibling slot and mirror
                // its state into the others
                let deals = self.all_abstraction_deals(deal);
                let mut canonical: Option<usize> = None;
                for &one_deal in &deals {
                    match canonical {
                        None => {
                            let mut slot = node.trainable(one_deal);
                            let trainable = slot.get_or_insert_with(|| {
                                Box::new(Trainable::new(
                                    self.config.algorithm,
                                    num_actions,
                                    num_hands,
                                ))
                            });
                            trainable.update_regrets(&regrets, iter + 1, reach_probs);
                            canonical = Some(one_deal);
                        }
                        Some(canonical_deal) => {
                            let canonical_slot = node.trainable(canonical_deal);
                            let mut slot = node.trainable(one_deal);
                            let trainable = slot.get_or_insert_with(|| {
                                Box::new(Trainable::new(
                                    self.config.algorithm,
                                    num_actions,
                                    num_hands,
                                ))
                            });
                            if let Some(source) = canonical_slot.as_ref() {
                                trainable.copy_strategy_from(source);
                            }
                        }
                    }
                }
            }

            if iter % self.config.print_interval == 0 {
                self.store_snapshots(node, deal, player, reach_probs, &results);
            }
        }

        CfrResult {
            payoffs,
            equity: total_equity,
        }
    }

    /// Converts the per-action counterfactual values into per-event units
    /// with the blocker-aware reach normalizer and stores them on the slot.
    fn store_snapshots(
        &self,
        node: &ActionNode,
        deal: usize,
        player: usize,
        reach_probs: &[f32],
        results: &[CfrResult],
    ) {
        let oppo = 1 - player;
        let player_hands = self.pcm.range(player);
        let num_hands = player_hands.len();
        let num_actions = results.len();

        let mut oppo_sum = 0.0f32;
        let mut oppo_card_sum = [0.0f32; NUM_CARDS];
        for (index, combo) in self.pcm.range(oppo).iter().enumerate() {
            oppo_card_sum[combo.card1 as usize] += reach_probs[index];
            oppo_card_sum[combo.card2 as usize] += reach_probs[index];
            oppo_sum += reach_probs[index];
        }

        let mut rp_sums = vec![0.0f32; num_hands];
        for (hand, combo) in player_hands.iter().enumerate() {
            let plus_reach = self
                .pcm
                .same_hand_index(player, oppo, hand)
                .map_or(0.0, |index| reach_probs[index]);
            rp_sums[hand] = oppo_sum - oppo_card_sum[combo.card1 as usize]
                - oppo_card_sum[combo.card2 as usize]
                + plus_reach;
        }

        let mut evs = vec![0.0; num_actions * num_hands];
        for (action_id, result) in results.iter().enumerate() {
            if result.payoffs.is_empty() {
                continue;
            }
            let ev_row = row_mut(&mut evs, action_id, num_hands);
            for (hand, ev) in ev_row.iter_mut().enumerate() {
                *ev = if rp_sums[hand] > 0.0 {
                    result.payoffs[hand] / rp_sums[hand]
                } else {
                    0.0
                };
            }
        }

        let mut slot = node.trainable(deal);
        if let Some(trainable) = slot.as_mut() {
            trainable.set_evs(&evs);

            if self.config.enable_equity {
                let mut equities = vec![0.0; num_actions * num_hands];
                for (action_id, result) in results.iter().enumerate() {
                    if result.equity.is_empty() {
                        continue;
                    }
                    let equity_row = row_mut(&mut equities, action_id, num_hands);
                    for (hand, equity) in equity_row.iter_mut().enumerate() {
                        *equity = if rp_sums[hand] > 0.0 {
                            result.equity[hand] / rp_sums[hand]
                        } else {
                            0.0
                        };
                    }
                }
                trainable.set_equities(&equities);
            }
        }
    }

    pub(crate) fn terminal_utility(
        &self,
        player: usize,
        node: &TerminalNode,
        reach_probs: &[f32],
        board: u64,
    ) -> CfrResult {
        let oppo = 1 - player;
        let player_hands = self.pcm.range(player);
        let oppo_hands = self.pcm.range(oppo);
        let player_payoff = node.payoffs[player];

        let mut payoffs = vec![0.0; player_hands.len()];
        let mut equity = if self.config.enable_equity {
            vec![0.0; player_hands.len()]
        } else {
            Vec::new()
        };

        let mut oppo_sum = 0.0f32;
        let mut oppo_card_sum = [0.0f32; NUM_CARDS];
        for (index, combo) in oppo_hands.iter().enumerate() {
            oppo_card_sum[combo.card1 as usize] += reach_probs[index];
            oppo_card_sum[combo.card2 as usize] += reach_probs[index];
            oppo_sum += reach_probs[index];
        }

        for (hand, combo) in player_hands.iter().enumerate() {
            if masks_overlap(board, combo.hand_mask()) {
                continue;
            }
            // the per-card subtraction removes the card-identical opponent
            // combo twice; add its reach back once
            let plus_reach = self
                .pcm
                .same_hand_index(player, oppo, hand)
                .map_or(0.0, |index| reach_probs[index]);
            let effective_oppo_reach = oppo_sum - oppo_card_sum[combo.card1 as usize]
                - oppo_card_sum[combo.card2 as usize]
                + plus_reach;
            payoffs[hand] = player_payoff * effective_oppo_reach;
            if !equity.is_empty() {
                equity[hand] = if player_payoff > 0.0 {
                    effective_oppo_reach
                } else {
                    0.0
                };
            }
        }

        CfrResult { payoffs, equity }
    }

    pub(crate) fn showdown_utility(
        &self,
        player: usize,
        node: &ShowdownNode,
        reach_probs: &[f32],
        board: u64,
    ) -> CfrResult {
        let oppo = 1 - player;
        let win_payoff = node.win_payoff(player);
        let lose_payoff = node.lose_payoff(player);

        let player_combs = self.rrm.river_combs(player, self.pcm.range(player), board);
        let oppo_combs = self.rrm.river_combs(oppo, self.pcm.range(oppo), board);

        let player_len = self.pcm.range(player).len();
        let mut payoffs = vec![0.0; player_len];

        let enable_equity = self.config.enable_equity;
        let mut equity = Vec::new();
        let mut effective_winsums = Vec::new();
        let mut effective_totals = Vec::new();
        if enable_equity {
            equity = vec![0.0; player_len];
            effective_winsums = vec![0.0f32; player_len];
            effective_totals = vec![0.0f32; player_len];
        }

        let mut oppo_total = 0.0f32;
        let mut oppo_card_total = [0.0f32; NUM_CARDS];
        if enable_equity {
            for comb in oppo_combs.iter() {
                let reach = reach_probs[comb.reach_prob_index];
                oppo_total += reach;
                oppo_card_total[comb.private_cards.card1 as usize] += reach;
                oppo_card_total[comb.private_cards.card2 as usize] += reach;
            }
        }

        // both lists are sorted weakest hand first; a single forward sweep
        // accumulates every opponent combo the player beats
        let mut winsum = 0.0f32;
        let mut card_winsum = [0.0f32; NUM_CARDS];
        let mut next_oppo = 0;
        for comb in player_combs.iter() {
            while next_oppo < oppo_combs.len() && comb.rank < oppo_combs[next_oppo].rank {
                let oppo_comb = &oppo_combs[next_oppo];
                let reach = reach_probs[oppo_comb.reach_prob_index];
                winsum += reach;
                card_winsum[oppo_comb.private_cards.card1 as usize] += reach;
                card_winsum[oppo_comb.private_cards.card2 as usize] += reach;
                next_oppo += 1;
            }
            let effective_winsum = winsum
                - card_winsum[comb.private_cards.card1 as usize]
                - card_winsum[comb.private_cards.card2 as usize];
            payoffs[comb.reach_prob_index] = effective_winsum * win_payoff;

            if enable_equity {
                effective_winsums[comb.reach_prob_index] = effective_winsum;
                let mut effective_total = oppo_total
                    - oppo_card_total[comb.private_cards.card1 as usize]
                    - oppo_card_total[comb.private_cards.card2 as usize];
                if let Some(index) = self.pcm.same_hand_index(player, oppo, comb.reach_prob_index)
                {
                    effective_total += reach_probs[index];
                }
                effective_totals[comb.reach_prob_index] = effective_total;
            }
        }

        // backward sweep for the combos the player loses to
        let mut losssum = 0.0f32;
        let mut card_losssum = [0.0f32; NUM_CARDS];
        let mut remaining_oppo = oppo_combs.len();
        for comb in player_combs.iter().rev() {
            while remaining_oppo > 0 && comb.rank > oppo_combs[remaining_oppo - 1].rank {
                let oppo_comb = &oppo_combs[remaining_oppo - 1];
                let reach = reach_probs[oppo_comb.reach_prob_index];
                losssum += reach;
                card_losssum[oppo_comb.private_cards.card1 as usize] += reach;
                card_losssum[oppo_comb.private_cards.card2 as usize] += reach;
                remaining_oppo -= 1;
            }
            let effective_losssum = losssum
                - card_losssum[comb.private_cards.card1 as usize]
                - card_losssum[comb.private_cards.card2 as usize];
            payoffs[comb.reach_prob_index] += effective_losssum * lose_payoff;

            if enable_equity {
                let index = comb.reach_prob_index;
                let effective_tiesum =
                    (effective_totals[index] - effective_winsums[index] - effective_losssum)
                        .max(0.0);
                equity[index] = effective_winsums[index] + 0.5 * effective_tiesum;
            }
        }

        CfrResult { payoffs, equity }
    }
}
