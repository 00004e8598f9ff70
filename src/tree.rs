use crate::card::NUM_CARDS;
use crate::error::*;
use crate::mutex_like::*;
use crate::trainable::*;

/// Betting round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 1,
            Street::Turn => 2,
            Street::River => 3,
        }
    }

    #[inline]
    pub fn next(self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    /// Number of board cards present on this street.
    #[inline]
    pub fn board_len(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }
}

/// A betting action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Action {
    Fold,
    Check,
    Call,
    /// Bet to the given total commitment.
    Bet(i32),
    /// Raise to the given total commitment.
    Raise(i32),
    /// Bet or raise the whole remaining stack.
    AllIn(i32),
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Fold => write!(f, "FOLD"),
            Action::Check => write!(f, "CHECK"),
            Action::Call => write!(f, "CALL"),
            Action::Bet(amount) => write!(f, "BET {amount}"),
            Action::Raise(amount) => write!(f, "RAISE {amount}"),
            Action::AllIn(amount) => write!(f, "ALLIN {amount}"),
        }
    }
}

/// A decision point owned by one player.
///
/// `trainables` is the per-deal slot array (1, `1+N`, or `1+N+N^2` entries
/// depending on how many chance cards separate the node from the traversal
/// root); slots are filled lazily on first visit.
pub struct ActionNode {
    pub player: usize,
    pub street: Street,
    pub actions: Vec<Action>,
    pub children: Vec<GameNode>,
    pub(crate) trainables: Vec<MutexLike<Option<Box<Trainable>>>>,
}

impl ActionNode {
    pub fn new(player: usize, street: Street, actions: Vec<Action>, children: Vec<GameNode>) -> Self {
        debug_assert_eq!(actions.len(), children.len());
        Self {
            player,
            street,
            actions,
            children,
            trainables: Vec::new(),
        }
    }

    /// The regret-table slot of this node under the given abstraction deal.
    #[inline]
    pub fn trainable(&self, deal: usize) -> MutexGuardLike<Option<Box<Trainable>>> {
        self.trainables[deal].lock()
    }
}

/// A chance event dealing one card; `street` is the round being dealt.
pub struct ChanceNode {
    pub street: Street,
    pub child: Box<GameNode>,
}

/// One player folded. `payoffs` are signed chips per player and sum to zero.
pub struct TerminalNode {
    pub payoffs: [f32; 2],
}

/// Showdown pot split relative to the root baseline (each player owns half
/// the starting pot); ties pay zero.
pub struct ShowdownNode {
    win_payoffs: [f32; 2],
}

impl ShowdownNode {
    pub fn new(win_payoffs: [f32; 2]) -> Self {
        Self { win_payoffs }
    }

    #[inline]
    pub fn win_payoff(&self, player: usize) -> f32 {
        self.win_payoffs[player]
    }

    #[inline]
    pub fn lose_payoff(&self, player: usize) -> f32 {
        -self.win_payoffs[player ^ 1]
    }
}

/// Tagged game-tree node. The tree shape is immutable during training and
/// shared by all threads; only the trainable slots inside action nodes
/// mutate.
pub enum GameNode {
    Action(ActionNode),
    Chance(ChanceNode),
    Terminal(TerminalNode),
    Showdown(ShowdownNode),
}

/// An immutable heads-up betting tree rooted at `root_street`.
pub struct GameTree {
    pub root: GameNode,
    pub root_street: Street,
    pub starting_pot: i32,
}

impl GameTree {
    pub fn new(root: GameNode, root_street: Street, starting_pot: i32) -> Self {
        Self {
            root,
            root_street,
            starting_pot,
        }
    }

    /// Builds the betting tree described by `config`.
    pub fn build(config: &TreeConfig) -> SolverResult<GameTree> {
        config.check()?;
        let builder = TreeBuilder { config };
        let root = builder.action_node(BuildState {
            street: config.root_street,
            player: 0,
            commit: [0, 0],
            num_raises: 0,
            checked: false,
        });
        Ok(GameTree::new(root, config.root_street, config.starting_pot))
    }

    /// Sizes the per-deal trainable-slot arrays of every action node.
    ///
    /// The slot count encodes the chance history between the root round and
    /// the node's round; more than two chance cards below the root is not a
    /// solvable configuration.
    pub(crate) fn init_slots(&mut self) -> SolverResult<()> {
        let root_index = self.root_street.index();
        Self::init_slots_recursive(&mut self.root, root_index)
    }

    fn init_slots_recursive(node: &mut GameNode, root_index: usize) -> SolverResult<()> {
        match node {
            GameNode::Action(action_node) => {
                let gap = action_node.street.index().checked_sub(root_index);
                let num = match gap {
                    Some(0) => 1,
                    Some(1) => 1 + NUM_CARDS,
                    Some(2) => 1 + NUM_CARDS + NUM_CARDS * NUM_CARDS,
                    _ => {
                        return Err(SolverError::InvalidConfig(format!(
                            "unsupported chance gap {gap:?} between the root and an action node"
                        )))
                    }
                };
                action_node.trainables = (0..num).map(|_| MutexLike::new(None)).collect();
                for child in &mut action_node.children {
                    Self::init_slots_recursive(child, root_index)?;
                }
                Ok(())
            }
            GameNode::Chance(chance_node) => {
                Self::init_slots_recursive(&mut chance_node.child, root_index)
            }
            _ => Ok(()),
        }
    }
}

/// Bet-size abstraction for the tree builder.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Root round: flop, turn, or river.
    pub root_street: Street,

    /// Starting pot at the root. Must be positive.
    pub starting_pot: i32,

    /// Effective remaining stack of both players at the root.
    pub effective_stack: i32,

    /// Bet sizes per player as fractions of the current pot.
    pub bet_sizes: [Vec<f32>; 2],

    /// Raise sizes per player as fractions of the pot after a call.
    pub raise_sizes: [Vec<f32>; 2],

    /// Maximum number of raises per street.
    pub raise_cap: usize,

    /// Add an all-in action when the remaining stack is at most this
    /// multiple of the pot.
    pub add_allin_threshold: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            root_street: Street::Flop,
            starting_pot: 0,
            effective_stack: 0,
            bet_sizes: Default::default(),
            raise_sizes: Default::default(),
            raise_cap: 3,
            add_allin_threshold: 1.5,
        }
    }
}

impl TreeConfig {
    fn check(&self) -> SolverResult<()> {
        if self.root_street == Street::Preflop {
            return Err(SolverError::InvalidConfig(
                "the tree builder starts from flop, turn, or river".to_string(),
            ));
        }
        if self.starting_pot <= 0 {
            return Err(SolverError::InvalidConfig(
                "starting pot must be positive".to_string(),
            ));
        }
        if self.effective_stack < 0 {
            return Err(SolverError::InvalidConfig(
                "effective stack must be non-negative".to_string(),
            ));
        }
        for sizes in self.bet_sizes.iter().chain(&self.raise_sizes) {
            if sizes.iter().any(|&f| f <= 0.0) {
                return Err(SolverError::InvalidConfig(
                    "bet sizes must be positive pot fractions".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct BuildState {
    street: Street,
    player: usize,
    commit: [i32; 2],
    num_raises: usize,
    checked: bool,
}

struct TreeBuilder<'a> {
    config: &'a TreeConfig,
}

impl TreeBuilder<'_> {
    fn half_pot(&self) -> f32 {
        self.config.starting_pot as f32 * 0.5
    }

    fn action_node(&self, state: BuildState) -> GameNode {
        let player = state.player;
        let opponent = player ^ 1;
        let to_call = state.commit[opponent] - state.commit[player];
        let pot = self.config.starting_pot + state.commit[0] + state.commit[1];
        let stack_left = self.config.effective_stack - state.commit[player];

        let mut actions = Vec::new();

        if to_call == 0 {
            actions.push(Action::Check);
            if stack_left > 0 {
                for &fraction in &self.config.bet_sizes[player] {
                    let amount = ((pot as f32 * fraction).round() as i32).clamp(1, stack_left);
                    if amount == stack_left {
                        actions.push(Action::AllIn(state.commit[player] + amount));
                    } else {
                        actions.push(Action::Bet(state.commit[player] + amount));
                    }
                }
                if stack_left as f32 <= pot as f32 * self.config.add_allin_threshold {
                    actions.push(Action::AllIn(self.config.effective_stack));
                }
            }
        } else {
            actions.push(Action::Fold);
            actions.push(Action::Call);
            if state.num_raises < self.config.raise_cap && stack_left > to_call {
                let pot_after_call = pot + to_call;
                let min_target = (state.commit[opponent] + to_call.max(1))
                    .min(self.config.effective_stack);
                for &fraction in &self.config.raise_sizes[player] {
                    let raise_by = (pot_after_call as f32 * fraction).round() as i32;
                    let target = state.commit[opponent] + raise_by.max(to_call);
                    let target = target.clamp(min_target, self.config.effective_stack);
                    if target == self.config.effective_stack {
                        actions.push(Action::AllIn(target));
                    } else {
                        actions.push(Action::Raise(target));
                    }
                }
                let remaining = self.config.effective_stack - state.commit[opponent];
                if remaining as f32 <= pot_after_call as f32 * self.config.add_allin_threshold {
                    actions.push(Action::AllIn(self.config.effective_stack));
                }
            }
        }

        actions.sort_unstable();
        actions.dedup();

        let children = actions
            .iter()
            .map(|&action| self.child_node(state, action))
            .collect();

        GameNode::Action(ActionNode::new(player, state.street, actions, children))
    }

    fn child_node(&self, state: BuildState, action: Action) -> GameNode {
        let player = state.player;
        let opponent = player ^ 1;

        match action {
            Action::Fold => {
                let survivor_gain = self.half_pot() + state.commit[player] as f32;
                let mut payoffs = [0.0; 2];
                payoffs[opponent] = survivor_gain;
                payoffs[player] = -survivor_gain;
                GameNode::Terminal(TerminalNode { payoffs })
            }
            Action::Check => {
                if player == 0 {
                    // IP still to act on this street
                    self.action_node(BuildState {
                        player: opponent,
                        checked: true,
                        ..state
                    })
                } else {
                    debug_assert!(state.checked);
                    self.close_street(state.street, state.commit)
                }
            }
            Action::Call => {
                let mut commit = state.commit;
                commit[player] = commit[opponent];
                self.close_street(state.street, commit)
            }
            Action::Bet(target) | Action::AllIn(target) if state.commit[opponent] == state.commit[player] => {
                let mut commit = state.commit;
                commit[player] = target;
                self.action_node(BuildState {
                    player: opponent,
                    commit,
                    checked: state.checked,
                    num_raises: state.num_raises,
                    street: state.street,
                })
            }
            Action::Raise(target) | Action::AllIn(target) => {
                let mut commit = state.commit;
                commit[player] = target;
                self.action_node(BuildState {
                    player: opponent,
                    commit,
                    num_raises: state.num_raises + 1,
                    checked: state.checked,
                    street: state.street,
                })
            }
            Action::Bet(_) => unreachable!(),
        }
    }

    /// Both commitments matched: deal the next card or go to showdown. An
    /// all-in pair runs out the remaining streets as a chance chain.
    fn close_street(&self, street: Street, commit: [i32; 2]) -> GameNode {
        debug_assert_eq!(commit[0], commit[1]);
        match street.next() {
            None => self.showdown(commit),
            Some(next) => {
                let child = if commit[0] == self.config.effective_stack
                    && self.config.effective_stack > 0
                {
                    Box::new(self.close_street(next, commit))
                } else {
                    Box::new(self.action_node(BuildState {
                        street: next,
                        player: 0,
                        commit,
                        num_raises: 0,
                        checked: false,
                    }))
                };
                GameNode::Chance(ChanceNode {
                    street: next,
                    child,
                })
            }
        }
    }

    fn showdown(&self, commit: [i32; 2]) -> GameNode {
        let win = self.half_pot() + commit[0] as f32;
        GameNode::Showdown(ShowdownNode::new([win, win]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_nodes(node: &GameNode) -> (usize, usize, usize, usize) {
        match node {
            GameNode::Action(n) => {
                let mut counts = (1, 0, 0, 0);
                for child in &n.children {
                    let c = count_nodes(child);
                    counts = (counts.0 + c.0, counts.1 + c.1, counts.2 + c.2, counts.3 + c.3);
                }
                counts
            }
            GameNode::Chance(n) => {
                let c = count_nodes(&n.child);
                (c.0, c.1 + 1, c.2, c.3)
            }
            GameNode::Terminal(_) => (0, 0, 1, 0),
            GameNode::Showdown(_) => (0, 0, 0, 1),
        }
    }

    #[test]
    fn test_check_down_river_tree() {
        let config = TreeConfig {
            root_street: Street::River,
            starting_pot: 10,
            effective_stack: 0,
            ..Default::default()
        };
        let tree = GameTree::build(&config).unwrap();
        // OOP check -> IP check -> showdown
        let (actions, chances, terminals, showdowns) = count_nodes(&tree.root);
        assert_eq!((actions, chances, terminals, showdowns), (2, 0, 0, 1));

        match &tree.root {
            GameNode::Action(n) => {
                assert_eq!(n.player, 0);
                assert_eq!(n.actions, vec![Action::Check]);
            }
            _ => panic!("root must be an action node"),
        }
    }

    #[test]
    fn test_fold_payoffs_sum_to_zero() {
        let config = TreeConfig {
            root_street: Street::River,
            starting_pot: 20,
            effective_stack: 100,
            bet_sizes: [vec![0.5], vec![0.5]],
            raise_sizes: [vec![1.0], vec![1.0]],
            ..Default::default()
        };
        let tree = GameTree::build(&config).unwrap();
        assert_zero_sum(&tree.root);
    }

    fn assert_zero_sum(node: &GameNode) {
        match node {
            GameNode::Action(n) => n.children.iter().for_each(assert_zero_sum),
            GameNode::Chance(n) => assert_zero_sum(&n.child),
            GameNode::Terminal(n) => {
                assert!((n.payoffs[0] + n.payoffs[1]).abs() < 1e-6);
            }
            GameNode::Showdown(n) => {
                assert!((n.win_payoff(0) + n.lose_payoff(1)).abs() < 1e-6);
                assert!((n.win_payoff(1) + n.lose_payoff(0)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_flop_tree_has_chance_chain() {
        let config = TreeConfig {
            root_street: Street::Flop,
            starting_pot: 10,
            effective_stack: 20,
            bet_sizes: [vec![1.0], vec![1.0]],
            ..Default::default()
        };
        let mut tree = GameTree::build(&config).unwrap();
        tree.init_slots().unwrap();

        // the all-in call line must run out turn and river before showdown
        fn max_chance_depth(node: &GameNode) -> usize {
            match node {
                GameNode::Action(n) => n.children.iter().map(max_chance_depth).max().unwrap_or(0),
                GameNode::Chance(n) => 1 + max_chance_depth(&n.child),
                _ => 0,
            }
        }
        assert_eq!(max_chance_depth(&tree.root), 2);

        // slot counts grow with the chance gap
        fn check_slots(node: &GameNode) {
            match node {
                GameNode::Action(n) => {
                    let expected = match n.street {
                        Street::Flop => 1,
                        Street::Turn => 1 + NUM_CARDS,
                        Street::River => 1 + NUM_CARDS + NUM_CARDS * NUM_CARDS,
                        Street::Preflop => unreachable!(),
                    };
                    assert_eq!(n.trainables.len(), expected);
                    n.children.iter().for_each(check_slots);
                }
                GameNode::Chance(n) => check_slots(&n.child),
                _ => {}
            }
        }
        check_slots(&tree.root);
    }
}
