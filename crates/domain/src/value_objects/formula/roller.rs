//! Die rolling - advantage selection, exploding criticals, vicious dice,
//! and the composite double-digit path
//!
//! Randomness is injected as a closure producing a uniform value in
//! `[1, sides]`; the domain layer never owns an RNG. Tests script exact
//! sequences through the same seam.

use serde::{Deserialize, Serialize};

use super::notation::DiceNotation;
use super::FormulaError;

/// Hard cap on dice appended by one explosion chain. Guarantees termination
/// even against an RNG that always returns the maximum face.
pub const MAX_EXPLOSIONS: usize = 10;

/// Hard cap on the dice count of one term. Bounds the pool allocation
/// against adversarial counts like `999999999999d6`.
pub const MAX_DICE_PER_TERM: i64 = 100;

/// Injected randomness: returns a uniform integer in `[1, sides]`.
pub type DieRng<'a> = &'a mut dyn FnMut(u32) -> u32;

/// Classification of a single rolled die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DieCategory {
    /// Counts toward the kept sum with no special standing. The die that
    /// triggers an explosion stays `Normal`; only the chain dice rolled
    /// after it are `Critical`.
    Normal,
    /// Removed by advantage/disadvantage selection. Never counted.
    Dropped,
    /// Appended by an explosion chain.
    Critical,
    /// Bonus die granted by the vicious modifier.
    Vicious,
    /// A natural 1 on the first kept d20 when fumbles are enabled.
    Fumble,
}

/// One die as it was rolled. Append-only: never mutated once the outcome
/// is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolledDie {
    pub value: u32,
    pub face_size: u32,
    pub kept: bool,
    pub category: DieCategory,
    /// Roll order, preserved so the trace can show dice as they landed
    /// even though selection sorts a copy.
    pub sequence_index: usize,
}

/// The full stochastic result of one dice term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollOutcome {
    /// All dice in roll order: base pool, then explosion chain, then
    /// vicious bonus dice. Double-digit terms list the tens pool first,
    /// then the ones pool.
    pub dice: Vec<RolledDie>,
    /// Sum of every kept die. For double-digit terms this is the composed
    /// two-digit value, not a sum of faces.
    pub kept_sum: i64,
    /// The trigger die plus each chain die that also rolled maximum.
    /// Vicious dice never count.
    pub critical_hits: u32,
    pub is_fumble: bool,
    pub is_double_digit: bool,
}

/// Caller-supplied roll configuration. Per-term postfix flags are OR'd in:
/// `!` and `v` can enable but never disable behavior for their term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormulaOptions {
    /// Positive: roll extra dice and drop the lowest. Negative: drop the
    /// highest. Zero: keep everything.
    pub advantage_level: i32,
    pub allow_criticals: bool,
    pub allow_fumbles: bool,
    pub vicious: bool,
}

impl FormulaOptions {
    pub fn with_advantage(advantage_level: i32) -> Self {
        Self {
            advantage_level,
            ..Self::default()
        }
    }
}

/// Roll one dice term to completion.
pub fn roll_term(
    notation: &DiceNotation,
    options: &FormulaOptions,
    rng: DieRng,
) -> Result<RollOutcome, FormulaError> {
    if notation.is_double_digit() {
        return roll_double_digit(notation, options, rng);
    }
    if notation.count < 1 || notation.count > MAX_DICE_PER_TERM {
        return Err(FormulaError::InvalidDiceCount(notation.count));
    }

    let sides = notation.sides;
    let explodes = options.allow_criticals || notation.explodes;
    let vicious = options.vicious || notation.vicious;
    let extra = options.advantage_level.unsigned_abs() as usize;
    let base_count = notation.count as usize + extra;

    let mut dice: Vec<RolledDie> = (0..base_count)
        .map(|sequence_index| RolledDie {
            value: rng(sides),
            face_size: sides,
            kept: true,
            category: DieCategory::Normal,
            sequence_index,
        })
        .collect();

    apply_advantage_selection(&mut dice, options.advantage_level);

    let mut critical_hits = 0u32;
    let mut is_fumble = false;

    if let Some(first_kept) = dice.iter().position(|d| d.kept) {
        let value = dice[first_kept].value;
        if options.allow_fumbles && value == 1 && sides == 20 {
            dice[first_kept].category = DieCategory::Fumble;
            is_fumble = true;
        } else if explodes && value == sides {
            critical_hits = 1;
            let mut appended = 0;
            while appended < MAX_EXPLOSIONS {
                let value = rng(sides);
                dice.push(RolledDie {
                    value,
                    face_size: sides,
                    kept: true,
                    category: DieCategory::Critical,
                    sequence_index: dice.len(),
                });
                appended += 1;
                if value == sides {
                    critical_hits += 1;
                } else {
                    break;
                }
            }
        }
    }

    if vicious && critical_hits > 0 {
        for _ in 0..critical_hits {
            dice.push(RolledDie {
                value: rng(sides),
                face_size: sides,
                kept: true,
                category: DieCategory::Vicious,
                sequence_index: dice.len(),
            });
        }
    }

    Ok(RollOutcome {
        kept_sum: kept_sum(&dice),
        dice,
        critical_hits,
        is_fumble,
        is_double_digit: false,
    })
}

/// Composite d44/d66/d88 path: independent tens and ones pools of the base
/// die, each with its own advantage selection. Criticals, fumbles, and
/// vicious modifiers are silently ignored here.
fn roll_double_digit(
    notation: &DiceNotation,
    options: &FormulaOptions,
    rng: DieRng,
) -> Result<RollOutcome, FormulaError> {
    if notation.count != 1 {
        return Err(FormulaError::DoubleDigitMultiRoll {
            count: notation.count,
            sides: notation.sides,
        });
    }

    let base = notation.base_die();
    let pool_size = 1 + options.advantage_level.unsigned_abs() as usize;

    let mut dice = Vec::with_capacity(pool_size * 2);
    let mut digits = [0i64; 2];

    for digit in &mut digits {
        let offset = dice.len();
        for i in 0..pool_size {
            dice.push(RolledDie {
                value: rng(base),
                face_size: base,
                kept: true,
                category: DieCategory::Normal,
                sequence_index: offset + i,
            });
        }
        let pool = &mut dice[offset..];
        let keep = if options.advantage_level >= 0 {
            best_index(pool, |a, b| a > b)
        } else {
            best_index(pool, |a, b| a < b)
        };
        for (i, die) in pool.iter_mut().enumerate() {
            if i != keep {
                die.kept = false;
                die.category = DieCategory::Dropped;
            }
        }
        *digit = pool[keep].value as i64;
    }

    Ok(RollOutcome {
        kept_sum: digits[0] * 10 + digits[1],
        dice,
        critical_hits: 0,
        is_fumble: false,
        is_double_digit: true,
    })
}

/// Index of the first die winning under `better` (first occurrence on ties).
fn best_index(pool: &[RolledDie], better: impl Fn(u32, u32) -> bool) -> usize {
    let mut best = 0;
    for (i, die) in pool.iter().enumerate().skip(1) {
        if better(die.value, pool[best].value) {
            best = i;
        }
    }
    best
}

/// Mark dropped dice per the advantage level, in place, preserving roll
/// order. Sorts a copy of the indices by value (stable), so ties fall to
/// roll order; never drops the last remaining die.
fn apply_advantage_selection(dice: &mut [RolledDie], advantage_level: i32) {
    let extra = advantage_level.unsigned_abs() as usize;
    if extra == 0 || dice.len() < 2 {
        return;
    }
    let num_to_drop = extra.min(dice.len() - 1);

    let mut order: Vec<usize> = (0..dice.len()).collect();
    order.sort_by_key(|&i| dice[i].value);

    let dropped: &[usize] = if advantage_level > 0 {
        &order[..num_to_drop]
    } else {
        &order[order.len() - num_to_drop..]
    };
    for &i in dropped {
        dice[i].kept = false;
        dice[i].category = DieCategory::Dropped;
    }
}

/// Sum of all kept dice. Holds the outcome invariant
/// `kept_sum == sum(value for kept dice)` for standard terms.
fn kept_sum(dice: &[RolledDie]) -> i64 {
    dice.iter()
        .filter(|d| d.kept)
        .map(|d| d.value as i64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notation(count: i64, sides: u32) -> DiceNotation {
        DiceNotation {
            count,
            sides,
            span: (0, 0),
            explodes: false,
            vicious: false,
        }
    }

    fn scripted(values: Vec<u32>) -> impl FnMut(u32) -> u32 {
        let mut iter = values.into_iter();
        move |_sides| iter.next().expect("script exhausted")
    }

    #[test]
    fn plain_roll_keeps_everything() {
        let mut rng = scripted(vec![2, 1, 4]);
        let outcome = roll_term(&notation(3, 6), &FormulaOptions::default(), &mut rng).unwrap();
        assert_eq!(outcome.kept_sum, 7);
        assert_eq!(outcome.dice.len(), 3);
        assert!(outcome.dice.iter().all(|d| d.kept));
        assert_eq!(outcome.critical_hits, 0);
        assert!(!outcome.is_fumble);
    }

    #[test]
    fn rejects_non_positive_count() {
        let mut rng = scripted(vec![]);
        for count in [0, -1, -3] {
            let err =
                roll_term(&notation(count, 6), &FormulaOptions::default(), &mut rng).unwrap_err();
            assert!(matches!(err, FormulaError::InvalidDiceCount(c) if c == count));
        }
    }

    #[test]
    fn rejects_counts_above_the_cap() {
        let mut rng = scripted(vec![]);
        for count in [MAX_DICE_PER_TERM + 1, 999_999_999_999] {
            let err =
                roll_term(&notation(count, 6), &FormulaOptions::default(), &mut rng).unwrap_err();
            assert!(matches!(err, FormulaError::InvalidDiceCount(c) if c == count));
        }
    }

    #[test]
    fn accepts_counts_at_the_cap() {
        let mut rng = scripted(vec![1; MAX_DICE_PER_TERM as usize]);
        let outcome = roll_term(
            &notation(MAX_DICE_PER_TERM, 6),
            &FormulaOptions::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(outcome.dice.len(), MAX_DICE_PER_TERM as usize);
        assert_eq!(outcome.kept_sum, MAX_DICE_PER_TERM);
    }

    #[test]
    fn advantage_drops_lowest_in_roll_order() {
        let mut rng = scripted(vec![4, 2, 5]);
        let outcome = roll_term(&notation(2, 6), &FormulaOptions::with_advantage(1), &mut rng)
            .unwrap();
        assert_eq!(outcome.kept_sum, 9);
        let kept: Vec<bool> = outcome.dice.iter().map(|d| d.kept).collect();
        assert_eq!(kept, vec![true, false, true]);
        assert_eq!(outcome.dice[1].category, DieCategory::Dropped);
    }

    #[test]
    fn disadvantage_drops_highest() {
        let mut rng = scripted(vec![4, 2, 5]);
        let outcome = roll_term(&notation(2, 6), &FormulaOptions::with_advantage(-1), &mut rng)
            .unwrap();
        assert_eq!(outcome.kept_sum, 6);
        let kept: Vec<bool> = outcome.dice.iter().map(|d| d.kept).collect();
        assert_eq!(kept, vec![true, true, false]);
    }

    #[test]
    fn never_drops_every_die() {
        let mut rng = scripted(vec![3, 4, 5, 6, 2, 1]);
        let outcome = roll_term(&notation(1, 6), &FormulaOptions::with_advantage(5), &mut rng)
            .unwrap();
        let dropped = outcome.dice.iter().filter(|d| !d.kept).count();
        assert_eq!(outcome.dice.len(), 6);
        assert_eq!(dropped, 5);
        assert_eq!(outcome.kept_sum, 6);
    }

    #[test]
    fn drop_count_matches_bound() {
        for advantage in [-3, -1, 1, 2, 3] {
            let mut rng = scripted(vec![1, 2, 3, 4, 5, 6, 1, 2]);
            let outcome =
                roll_term(&notation(3, 8), &FormulaOptions::with_advantage(advantage), &mut rng)
                    .unwrap();
            let dropped = outcome.dice.iter().filter(|d| !d.kept).count();
            let expected = (advantage.unsigned_abs() as usize).min(outcome.dice.len() - 1);
            assert_eq!(dropped, expected);
        }
    }

    #[test]
    fn tie_break_is_stable_by_roll_order() {
        let mut rng = scripted(vec![3, 3, 3]);
        let outcome = roll_term(&notation(2, 6), &FormulaOptions::with_advantage(1), &mut rng)
            .unwrap();
        // Stable sort: the earliest-rolled 3 is the dropped one.
        assert!(!outcome.dice[0].kept);
        assert!(outcome.dice[1].kept);
        assert!(outcome.dice[2].kept);
    }

    #[test]
    fn explosion_chain_counts_criticals() {
        let options = FormulaOptions {
            allow_criticals: true,
            ..FormulaOptions::default()
        };
        let mut rng = scripted(vec![6, 6, 3]);
        let outcome = roll_term(&notation(1, 6), &options, &mut rng).unwrap();
        assert_eq!(outcome.kept_sum, 15);
        assert_eq!(outcome.critical_hits, 2);
        assert_eq!(outcome.dice[0].category, DieCategory::Normal);
        assert_eq!(outcome.dice[1].category, DieCategory::Critical);
        assert_eq!(outcome.dice[2].category, DieCategory::Critical);
    }

    #[test]
    fn postfix_flag_enables_explosion_without_global_option() {
        let mut term = notation(1, 6);
        term.explodes = true;
        let mut rng = scripted(vec![6, 2]);
        let outcome = roll_term(&term, &FormulaOptions::default(), &mut rng).unwrap();
        assert_eq!(outcome.kept_sum, 8);
        assert_eq!(outcome.critical_hits, 1);
    }

    #[test]
    fn explosion_only_triggers_on_first_kept_die() {
        let options = FormulaOptions {
            allow_criticals: true,
            ..FormulaOptions::default()
        };
        // First die is not max; the 6 later in the pool must not explode.
        let mut rng = scripted(vec![2, 6]);
        let outcome = roll_term(&notation(2, 6), &options, &mut rng).unwrap();
        assert_eq!(outcome.critical_hits, 0);
        assert_eq!(outcome.dice.len(), 2);
    }

    #[test]
    fn explosion_terminates_at_cap_under_adversarial_rng() {
        let options = FormulaOptions {
            allow_criticals: true,
            ..FormulaOptions::default()
        };
        let mut always_max = |sides: u32| sides;
        let outcome = roll_term(&notation(1, 6), &options, &mut always_max).unwrap();
        assert_eq!(outcome.dice.len(), 1 + MAX_EXPLOSIONS);
        assert_eq!(outcome.critical_hits as usize, 1 + MAX_EXPLOSIONS);
        assert_eq!(outcome.kept_sum, 6 * (1 + MAX_EXPLOSIONS as i64));
    }

    #[test]
    fn vicious_appends_one_die_per_critical() {
        let options = FormulaOptions {
            allow_criticals: true,
            vicious: true,
            ..FormulaOptions::default()
        };
        let mut rng = scripted(vec![6, 6, 3, 4, 5]);
        let outcome = roll_term(&notation(1, 6), &options, &mut rng).unwrap();
        assert_eq!(outcome.critical_hits, 2);
        let vicious: Vec<&RolledDie> = outcome
            .dice
            .iter()
            .filter(|d| d.category == DieCategory::Vicious)
            .collect();
        assert_eq!(vicious.len(), 2);
        assert_eq!(outcome.kept_sum, 6 + 6 + 3 + 4 + 5);
    }

    #[test]
    fn vicious_dice_do_not_explode() {
        let options = FormulaOptions {
            allow_criticals: true,
            vicious: true,
            ..FormulaOptions::default()
        };
        // Vicious die rolls max; nothing further may be appended.
        let mut rng = scripted(vec![6, 3, 6]);
        let outcome = roll_term(&notation(1, 6), &options, &mut rng).unwrap();
        assert_eq!(outcome.dice.len(), 3);
        assert_eq!(outcome.critical_hits, 1);
    }

    #[test]
    fn vicious_without_criticals_adds_nothing() {
        let options = FormulaOptions {
            allow_criticals: true,
            vicious: true,
            ..FormulaOptions::default()
        };
        let mut rng = scripted(vec![4]);
        let outcome = roll_term(&notation(1, 6), &options, &mut rng).unwrap();
        assert_eq!(outcome.dice.len(), 1);
    }

    #[test]
    fn fumble_on_natural_one_d20() {
        let options = FormulaOptions {
            allow_fumbles: true,
            ..FormulaOptions::default()
        };
        let mut rng = scripted(vec![1]);
        let outcome = roll_term(&notation(1, 20), &options, &mut rng).unwrap();
        assert!(outcome.is_fumble);
        assert_eq!(outcome.dice[0].category, DieCategory::Fumble);
        assert_eq!(outcome.kept_sum, 1);
    }

    #[test]
    fn no_fumble_on_non_d20() {
        let options = FormulaOptions {
            allow_fumbles: true,
            ..FormulaOptions::default()
        };
        let mut rng = scripted(vec![1]);
        let outcome = roll_term(&notation(1, 6), &options, &mut rng).unwrap();
        assert!(!outcome.is_fumble);
    }

    #[test]
    fn no_fumble_when_disabled() {
        let mut rng = scripted(vec![1]);
        let outcome = roll_term(&notation(1, 20), &FormulaOptions::default(), &mut rng).unwrap();
        assert!(!outcome.is_fumble);
        assert_eq!(outcome.dice[0].category, DieCategory::Normal);
    }

    #[test]
    fn fumble_checked_on_first_kept_die_after_selection() {
        let options = FormulaOptions {
            allow_fumbles: true,
            advantage_level: 1,
            ..FormulaOptions::default()
        };
        // Advantage drops the 1; the first kept die is the 15, no fumble.
        let mut rng = scripted(vec![1, 15]);
        let outcome = roll_term(&notation(1, 20), &options, &mut rng).unwrap();
        assert!(!outcome.is_fumble);
        assert_eq!(outcome.kept_sum, 15);
    }

    #[test]
    fn kept_sum_invariant_holds() {
        let options = FormulaOptions {
            advantage_level: 2,
            allow_criticals: true,
            vicious: true,
            ..FormulaOptions::default()
        };
        let mut rng = scripted(vec![8, 8, 2, 5, 8, 3, 7, 1]);
        let outcome = roll_term(&notation(2, 8), &options, &mut rng).unwrap();
        let manual: i64 = outcome
            .dice
            .iter()
            .filter(|d| d.kept)
            .map(|d| d.value as i64)
            .sum();
        assert_eq!(outcome.kept_sum, manual);
    }

    #[test]
    fn sequence_indices_are_roll_order() {
        let options = FormulaOptions {
            allow_criticals: true,
            ..FormulaOptions::default()
        };
        let mut rng = scripted(vec![6, 6, 2]);
        let outcome = roll_term(&notation(1, 6), &options, &mut rng).unwrap();
        let indices: Vec<usize> = outcome.dice.iter().map(|d| d.sequence_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn double_digit_composes_tens_and_ones() {
        let mut rng = scripted(vec![3, 2]);
        let outcome =
            roll_term(&notation(1, 44), &FormulaOptions::default(), &mut rng).unwrap();
        assert!(outcome.is_double_digit);
        assert_eq!(outcome.kept_sum, 32);
        assert_eq!(outcome.dice.len(), 2);
        assert_eq!(outcome.dice[0].face_size, 4);
    }

    #[test]
    fn double_digit_advantage_selects_per_digit() {
        // Tens pool [2, 5], ones pool [1, 4]: advantage keeps 5 and 4 -> 54.
        let mut rng = scripted(vec![2, 5, 1, 4]);
        let outcome = roll_term(&notation(1, 66), &FormulaOptions::with_advantage(1), &mut rng)
            .unwrap();
        assert_eq!(outcome.kept_sum, 54);
        assert_eq!(outcome.dice.len(), 4);
        let kept: Vec<bool> = outcome.dice.iter().map(|d| d.kept).collect();
        assert_eq!(kept, vec![false, true, false, true]);
    }

    #[test]
    fn double_digit_disadvantage_keeps_lowest_per_digit() {
        let mut rng = scripted(vec![2, 5, 1, 4]);
        let outcome = roll_term(&notation(1, 66), &FormulaOptions::with_advantage(-1), &mut rng)
            .unwrap();
        assert_eq!(outcome.kept_sum, 21);
    }

    #[test]
    fn double_digit_rejects_multi_roll() {
        let mut rng = scripted(vec![]);
        let err =
            roll_term(&notation(2, 44), &FormulaOptions::default(), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            FormulaError::DoubleDigitMultiRoll { count: 2, sides: 44 }
        ));
    }

    #[test]
    fn double_digit_ignores_critical_and_vicious_modifiers() {
        let mut term = notation(1, 88);
        term.explodes = true;
        term.vicious = true;
        let options = FormulaOptions {
            allow_criticals: true,
            allow_fumbles: true,
            vicious: true,
            ..FormulaOptions::default()
        };
        let mut rng = scripted(vec![8, 8]);
        let outcome = roll_term(&term, &options, &mut rng).unwrap();
        assert_eq!(outcome.dice.len(), 2);
        assert_eq!(outcome.critical_hits, 0);
        assert!(!outcome.is_fumble);
        assert_eq!(outcome.kept_sum, 88);
    }
}
