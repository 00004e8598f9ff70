//! A heads-up post-flop CFR solver.
//!
//! Given a betting tree, two weighted hand ranges, and a public board, the
//! solver computes an approximate Nash equilibrium with Discounted CFR (or
//! CFR+), reporting a probability distribution over the legal actions for
//! every decision point and private hand, together with expected values and
//! equities.
//!
//! # Examples
//! ```
//! use postflop_cfr::*;
//! use std::sync::Arc;
//!
//! let board = board_from_str("QsJh2c7d2s").unwrap();
//! let oop_range = parse_range("AhAc,5h5s").unwrap();
//! let ip_range = parse_range("KsKh").unwrap();
//!
//! // a trivial river spot: both players can only check
//! let tree = GameTree::build(&TreeConfig {
//!     root_street: Street::River,
//!     starting_pot: 10,
//!     effective_stack: 0,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let config = SolverConfig {
//!     iteration_number: 10,
//!     ..Default::default()
//! };
//!
//! let solver = Solver::new(
//!     tree,
//!     [oop_range, ip_range],
//!     board,
//!     Arc::new(HandEvaluator),
//!     config,
//! )
//! .unwrap();
//!
//! let exploitability = solver.train().unwrap();
//! assert!(exploitability.abs() < 1e-3);
//!
//! // nested JSON view of the trained strategy
//! let json = solver.dump(1);
//! assert_eq!(json["node_type"], "action_node");
//! ```
//!
//! # Implementation details
//! - **Algorithm**: Discounted CFR with α = 1.5, β = 0, γ = 2 by default;
//!   CFR+ is selectable per run.
//! - **Parallelism**: chance-card children are expanded in parallel
//!   ([rayon]) and reduced serially in deck order, so runs are reproducible
//!   modulo floating-point associativity.
//! - **Isomorphism**: suit-equivalent chance sub-trees are solved once and
//!   reused through a precomputed hand-index permutation.
//!
//! [rayon]: https://github.com/rayon-rs/rayon

mod best_response;
mod card;
mod dump;
mod error;
mod hand;
mod isomorphism;
mod mutex_like;
mod private_cards;
mod range;
mod river_ranges;
mod sliceop;
mod solver;
mod trainable;
mod tree;

pub use card::*;
pub use error::*;
pub use hand::*;
pub use isomorphism::*;
pub use mutex_like::*;
pub use private_cards::*;
pub use range::*;
pub use river_ranges::*;
pub use solver::*;
pub use trainable::*;
pub use tree::*;
