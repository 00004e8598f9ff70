use crate::card::*;
use crate::error::*;
use crate::private_cards::*;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suitedness {
    Suited,
    Offsuit,
    Both,
}

const CLASS_PAT: &str = r"(?:[AKQJT2-9]{2}[os]?)";
const COMBO_PAT: &str = r"(?:[AKQJT2-9][cdhs][AKQJT2-9][cdhs])";
const PROB_PAT: &str = r"(?:(?:[01](?:\.\d*)?)|(?:\.\d+))";

static CLASS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?P<class>{CLASS_PAT}(?:\+|(?:-{CLASS_PAT}))?)(?::(?P<prob>{PROB_PAT}))?$"
    ))
    .unwrap()
});

static COMBO_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^(?P<combo>{COMBO_PAT})(?::(?P<prob>{PROB_PAT}))?$")).unwrap());

static TRIM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*([-:,])\s*").unwrap());

/// Parses a range string into the weighted combo list consumed by the
/// solver.
///
/// Supported syntax (comma-separated): hand classes (`"AA"`, `"AKs"`,
/// `"AKo"`, `"AK"`), classes with `+` (`"99+"`, `"A5s+"`), class spans
/// (`"A5s-A2s"`, `"TT-77"`), explicit combos (`"AhKh"`), each optionally
/// weighted with `":0.5"`.
///
/// ```
/// use postflop_cfr::parse_range;
///
/// let range = parse_range("QQ+, AKs:0.5").unwrap();
/// assert_eq!(range.len(), 3 * 6 + 4);
/// ```
pub fn parse_range(s: &str) -> SolverResult<Vec<PrivateCards>> {
    let trimmed = TRIM_REGEX.replace_all(s.trim(), "$1");
    let mut combos = Vec::new();

    for token in trimmed.split(',') {
        if token.is_empty() {
            return Err(SolverError::InvalidRange(s.to_string()));
        }
        if let Some(caps) = COMBO_REGEX.captures(token) {
            let combo = &caps["combo"];
            let weight = parse_weight(caps.name("prob").map(|m| m.as_str()))?;
            let card1 = card_from_str(&combo[0..2])?;
            let card2 = card_from_str(&combo[2..4])?;
            if card1 == card2 {
                return Err(SolverError::InvalidRange(token.to_string()));
            }
            combos.push(PrivateCards::new(card1, card2, weight));
        } else if let Some(caps) = CLASS_REGEX.captures(token) {
            let weight = parse_weight(caps.name("prob").map(|m| m.as_str()))?;
            expand_class(&caps["class"], weight, &mut combos)?;
        } else {
            return Err(SolverError::InvalidRange(token.to_string()));
        }
    }

    Ok(combos)
}

fn parse_weight(prob: Option<&str>) -> SolverResult<f32> {
    match prob {
        None => Ok(1.0),
        Some(p) => {
            let weight: f32 = p
                .parse()
                .map_err(|_| SolverError::InvalidRange(p.to_string()))?;
            if weight > 0.0 && weight <= 1.0 {
                Ok(weight)
            } else {
                Err(SolverError::InvalidRange(format!("weight {p}")))
            }
        }
    }
}

fn parse_singleton(class: &str) -> SolverResult<(u8, u8, Suitedness)> {
    let mut chars = class.chars();
    let rank1 = char_to_rank(chars.next().unwrap_or(' '))?;
    let rank2 = char_to_rank(chars.next().unwrap_or(' '))?;
    let suitedness = match chars.next() {
        None => Suitedness::Both,
        Some('s') => Suitedness::Suited,
        Some('o') => Suitedness::Offsuit,
        Some(c) => return Err(SolverError::InvalidRange(c.to_string())),
    };
    if rank1 < rank2 {
        return Err(SolverError::InvalidRange(format!(
            "second rank above first: {class}"
        )));
    }
    if rank1 == rank2 && suitedness != Suitedness::Both {
        return Err(SolverError::InvalidRange(format!(
            "pair with suitedness: {class}"
        )));
    }
    Ok((rank1, rank2, suitedness))
}

fn expand_class(class: &str, weight: f32, combos: &mut Vec<PrivateCards>) -> SolverResult<()> {
    if let Some(plus_head) = class.strip_suffix('+') {
        let (rank1, rank2, suitedness) = parse_singleton(plus_head)?;
        if rank1 == rank2 {
            for rank in rank1..=12 {
                push_class(rank, rank, suitedness, weight, combos);
            }
        } else {
            for rank in rank2..rank1 {
                push_class(rank1, rank, suitedness, weight, combos);
            }
        }
    } else if let Some((head, tail)) = class.split_once('-') {
        let (rank1, rank2, suitedness) = parse_singleton(head)?;
        let (rank3, rank4, suitedness2) = parse_singleton(tail)?;
        if suitedness != suitedness2 {
            return Err(SolverError::InvalidRange(class.to_string()));
        }
        if rank1 == rank2 && rank3 == rank4 && rank3 < rank1 {
            for rank in rank3..=rank1 {
                push_class(rank, rank, suitedness, weight, combos);
            }
        } else if rank1 == rank3 && rank4 < rank2 {
            for rank in rank4..=rank2 {
                push_class(rank1, rank, suitedness, weight, combos);
            }
        } else {
            return Err(SolverError::InvalidRange(class.to_string()));
        }
    } else {
        let (rank1, rank2, suitedness) = parse_singleton(class)?;
        push_class(rank1, rank2, suitedness, weight, combos);
    }
    Ok(())
}

fn push_class(
    rank1: u8,
    rank2: u8,
    suitedness: Suitedness,
    weight: f32,
    combos: &mut Vec<PrivateCards>,
) {
    if rank1 == rank2 {
        for suit1 in 0..4 {
            for suit2 in (suit1 + 1)..4 {
                combos.push(PrivateCards::new(
                    rank1 * 4 + suit1,
                    rank1 * 4 + suit2,
                    weight,
                ));
            }
        }
        return;
    }
    for suit1 in 0..4 {
        for suit2 in 0..4 {
            let matches = match suitedness {
                Suitedness::Suited => suit1 == suit2,
                Suitedness::Offsuit => suit1 != suit2,
                Suitedness::Both => true,
            };
            if matches {
                combos.push(PrivateCards::new(rank1 * 4 + suit1, rank2 * 4 + suit2, weight));
            }
        }
    }
}
