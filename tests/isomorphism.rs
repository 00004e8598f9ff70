use postflop_cfr::*;
use serde_json::{Map, Value};
use std::sync::Arc;

fn as_action(node: &GameNode) -> &ActionNode {
    match node {
        GameNode::Action(n) => n,
        _ => panic!("expected an action node"),
    }
}

fn as_chance(node: &GameNode) -> &ChanceNode {
    match node {
        GameNode::Chance(n) => n,
        _ => panic!("expected a chance node"),
    }
}

/// Check/check street leading into a chance node, ending in a small river
/// betting game (IP may bet pot, OOP may call) so the solved strategies
/// actually depend on the runout.
fn river_subtree() -> GameNode {
    GameNode::Action(ActionNode::new(
        0,
        Street::River,
        vec![Action::Check],
        vec![GameNode::Action(ActionNode::new(
            1,
            Street::River,
            vec![Action::Check, Action::Bet(10)],
            vec![
                GameNode::Showdown(ShowdownNode::new([5.0, 5.0])),
                GameNode::Action(ActionNode::new(
                    0,
                    Street::River,
                    vec![Action::Fold, Action::Call],
                    vec![
                        GameNode::Terminal(TerminalNode {
                            payoffs: [-5.0, 5.0],
                        }),
                        GameNode::Showdown(ShowdownNode::new([15.0, 15.0])),
                    ],
                )),
            ],
        ))],
    ))
}

fn check_street(player_first: usize, street: Street, child: GameNode) -> GameNode {
    GameNode::Action(ActionNode::new(
        player_first,
        street,
        vec![Action::Check],
        vec![GameNode::Action(ActionNode::new(
            player_first ^ 1,
            street,
            vec![Action::Check],
            vec![child],
        ))],
    ))
}

fn toy_flop_tree() -> GameTree {
    let river_chance = GameNode::Chance(ChanceNode {
        street: Street::River,
        child: Box::new(river_subtree()),
    });
    let turn = check_street(0, Street::Turn, river_chance);
    let turn_chance = GameNode::Chance(ChanceNode {
        street: Street::Turn,
        child: Box::new(turn),
    });
    let flop = check_street(0, Street::Flop, turn_chance);
    GameTree::new(flop, Street::Flop, 10)
}

fn toy_turn_tree() -> GameTree {
    let river_chance = GameNode::Chance(ChanceNode {
        street: Street::River,
        child: Box::new(river_subtree()),
    });
    let turn = check_street(0, Street::Turn, river_chance);
    GameTree::new(turn, Street::Turn, 10)
}

fn monotone_flop_solver(use_isomorphism: bool, warmup: i32, iterations: i32) -> Solver {
    let board = board_from_str("AhKhQh").unwrap();
    let config = SolverConfig {
        iteration_number: iterations,
        print_interval: 10,
        warmup,
        use_isomorphism,
        ..Default::default()
    };
    let range = parse_range("JJ+").unwrap();
    let solver = Solver::new(
        toy_flop_tree(),
        [range.clone(), range],
        board,
        Arc::new(HandEvaluator),
        config,
    )
    .unwrap();
    solver.train().unwrap();
    solver
}

fn turn_node_of(solver: &Solver) -> &ActionNode {
    let flop_oop = as_action(&solver.tree().root);
    let flop_ip = as_action(&flop_oop.children[0]);
    let chance = as_chance(&flop_ip.children[0]);
    as_action(&chance.child)
}

/// On a monotone flop the three non-board suits collapse into one: only
/// clubs (the representative) and hearts are explored on the turn.
#[test]
fn monotone_flop_explores_one_quarter_of_the_suits() {
    let solver = monotone_flop_solver(true, -1, 3);
    let turn_node = turn_node_of(&solver);
    let explored = (1..=NUM_CARDS)
        .filter(|&deal| turn_node.trainable(deal).is_some())
        .count();
    // 13 clubs + 10 hearts
    assert_eq!(explored, 23);

    let naive = monotone_flop_solver(false, -1, 3);
    let turn_node = turn_node_of(&naive);
    let explored = (1..=NUM_CARDS)
        .filter(|&deal| turn_node.trainable(deal).is_some())
        .count();
    assert_eq!(explored, 49);
}

fn swap_suit_char(c: char) -> char {
    match c {
        'c' => 'd',
        'd' => 'c',
        _ => c,
    }
}

fn swap_card_name(s: &str) -> Option<String> {
    if s.len() != 2 || card_from_str(s).is_err() {
        return None;
    }
    let mut chars = s.chars();
    let rank = chars.next().unwrap();
    let suit = swap_suit_char(chars.next().unwrap());
    Some(format!("{rank}{suit}"))
}

fn swap_hand_name(s: &str) -> Option<String> {
    if s.len() != 4 {
        return None;
    }
    let card1 = card_from_str(&swap_card_name(&s[0..2])?).ok()?;
    let card2 = card_from_str(&swap_card_name(&s[2..4])?).ok()?;
    let (low, high) = if card1 < card2 {
        (card1, card2)
    } else {
        (card2, card1)
    };
    Some(format!("{}{}", card_to_string(high), card_to_string(low)))
}

/// Renames every card-shaped key under a club/diamond suit swap.
fn swap_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut swapped = Map::new();
            for (key, sub) in map {
                let new_key = swap_card_name(key)
                    .or_else(|| swap_hand_name(key))
                    .unwrap_or_else(|| key.clone());
                swapped.insert(new_key, swap_json(sub));
            }
            Value::Object(swapped)
        }
        Value::Array(items) => Value::Array(items.iter().map(swap_json).collect()),
        other => other.clone(),
    }
}

/// The dumped sub-trees of two isomorphic turn cards are exact suit
/// permutations of each other: the solver only ever trained the club
/// sub-tree, and the dump replays the recorded suit exchange.
#[test]
fn monotone_flop_dump_is_suit_permuted() {
    let solver = monotone_flop_solver(true, 2, 40);
    let dump = solver.dump(3);

    let chance = &dump["childrens"]["CHECK"]["childrens"]["CHECK"];
    assert_eq!(chance["node_type"], "chance_node");
    let dealcards = chance["dealcards"].as_object().unwrap();

    for rank in ["2", "5", "T"] {
        let clubs = &dealcards[&format!("{rank}c")];
        let diamonds = &dealcards[&format!("{rank}d")];
        assert!(!clubs.is_null() && !diamonds.is_null());
        assert_eq!(swap_json(diamonds), *clubs, "turn card {rank}");
    }
}

/// With all four suits on board no isomorphism applies, and enabling the
/// table must not change anything: both runs are bit-for-bit identical.
#[test]
fn four_suit_board_is_unaffected_by_isomorphism() {
    let board = board_from_str("As7h4d2c").unwrap();
    let range = parse_range("JJ+").unwrap();

    let mut dumps = Vec::new();
    for use_isomorphism in [true, false] {
        let config = SolverConfig {
            iteration_number: 25,
            print_interval: 10,
            warmup: -1,
            use_isomorphism,
            ..Default::default()
        };
        let solver = Solver::new(
            toy_turn_tree(),
            [range.clone(), range.clone()],
            board.clone(),
            Arc::new(HandEvaluator),
            config,
        )
        .unwrap();
        solver.train().unwrap();
        dumps.push(solver.dump(2));
    }

    assert_eq!(dumps[0], dumps[1]);
}
