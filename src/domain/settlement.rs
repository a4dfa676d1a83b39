use super::balance::{BalanceMap, aggregate};
use super::expense::ExpenseRecord;
use super::ids::{ParticipantId, TripId};
use super::money::Money;
use crate::error::{Result, SettleError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single directed payment that moves a debtor and a creditor toward zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementInstruction {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}

/// Balances of a trip together with the payments that settle them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub balances: BalanceMap,
    pub instructions: Vec<SettlementInstruction>,
}

impl Settlement {
    /// Aggregates `expenses` and resolves the resulting balances.
    ///
    /// The balance snapshot is kept untouched; the resolver works on its own
    /// copy.
    pub fn compute(trip: &TripId, expenses: &[ExpenseRecord]) -> Result<Self> {
        if expenses.is_empty() {
            return Err(SettleError::NoExpenses { trip: trip.clone() });
        }
        let balances = aggregate(expenses)?;
        let instructions = resolve(balances.clone());
        Ok(Self {
            balances,
            instructions,
        })
    }
}

/// Greedy minimum cash flow.
///
/// Repeatedly matches the largest debtor with the largest creditor and moves
/// the smaller of the two magnitudes between them. Each step zeroes at least
/// one side, so at most `N - 1` instructions are produced for `N` non-zero
/// balances. This is a heuristic: it does not always reach the true minimum
/// number of payments.
///
/// Ties on the extremal balance go to the smallest participant identifier.
/// Balances are rounded to cents on entry; those that round to zero are
/// treated as settled. If the input does not sum to zero the leftover is
/// logged and left in place.
pub fn resolve(balances: BalanceMap) -> Vec<SettlementInstruction> {
    let mut open: BTreeMap<ParticipantId, Money> = balances
        .into_iter()
        .map(|(participant, balance)| (participant, balance.round_cents()))
        .filter(|(_, balance)| !balance.is_settled())
        .collect();

    let bound = open.len().saturating_sub(1);
    let mut instructions = Vec::with_capacity(bound);

    while instructions.len() < bound {
        let (Some((debtor, owed)), Some((creditor, due))) =
            (largest_debtor(&open), largest_creditor(&open))
        else {
            break;
        };

        let amount = owed.abs().min(due).round_cents();
        tracing::debug!(%debtor, %creditor, %amount, "settlement step");

        settle_side(&mut open, &debtor, owed + amount);
        settle_side(&mut open, &creditor, due - amount);

        instructions.push(SettlementInstruction {
            from: debtor,
            to: creditor,
            amount,
        });
    }

    if !open.is_empty() {
        let residue: Money = open.values().sum();
        tracing::warn!(
            participants = open.len(),
            %residue,
            "balances do not net to zero; leaving remainder unsettled"
        );
    }

    instructions
}

fn settle_side(open: &mut BTreeMap<ParticipantId, Money>, participant: &ParticipantId, left: Money) {
    if left.is_settled() {
        open.remove(participant);
    } else {
        open.insert(participant.clone(), left);
    }
}

// Both selectors walk the map in identifier order and only replace the
// current pick on a strictly better balance, so the first identifier wins ties.

fn largest_creditor(open: &BTreeMap<ParticipantId, Money>) -> Option<(ParticipantId, Money)> {
    let mut best: Option<(&ParticipantId, Money)> = None;
    for (participant, &balance) in open.iter().filter(|(_, b)| b.is_positive()) {
        if best.is_none_or(|(_, current)| balance > current) {
            best = Some((participant, balance));
        }
    }
    best.map(|(participant, balance)| (participant.clone(), balance))
}

fn largest_debtor(open: &BTreeMap<ParticipantId, Money>) -> Option<(ParticipantId, Money)> {
    let mut best: Option<(&ParticipantId, Money)> = None;
    for (participant, &balance) in open.iter().filter(|(_, b)| b.is_negative()) {
        if best.is_none_or(|(_, current)| balance < current) {
            best = Some((participant, balance));
        }
    }
    best.map(|(participant, balance)| (participant.clone(), balance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn id(s: &str) -> ParticipantId {
        ParticipantId::from(s)
    }

    fn balances(entries: &[(&str, Decimal)]) -> BalanceMap {
        entries
            .iter()
            .map(|(p, b)| (id(p), Money::new(*b)))
            .collect()
    }

    fn instruction(from: &str, to: &str, amount: Decimal) -> SettlementInstruction {
        SettlementInstruction {
            from: id(from),
            to: id(to),
            amount: Money::new(amount),
        }
    }

    fn assert_settles(input: &BalanceMap, instructions: &[SettlementInstruction]) {
        let mut replay = input.clone();
        for instruction in instructions {
            replay.apply(instruction);
        }
        assert!(replay.is_settled(), "left unsettled: {:?}", replay);
    }

    #[test]
    fn test_empty_and_single_participant() {
        assert!(resolve(BalanceMap::new()).is_empty());
        assert!(resolve(balances(&[("A", dec!(0))])).is_empty());
        assert!(resolve(balances(&[("A", dec!(25))])).is_empty());
    }

    #[test]
    fn test_all_zero_is_idempotent() {
        let input = balances(&[("A", dec!(0)), ("B", dec!(0)), ("C", dec!(0))]);
        assert!(resolve(input).is_empty());
    }

    #[test]
    fn test_within_epsilon_is_settled() {
        let input = balances(&[("A", dec!(0.0000001)), ("B", dec!(-0.0000001))]);
        assert!(resolve(input).is_empty());
    }

    #[test]
    fn test_sub_cent_residue_is_settled() {
        let input = balances(&[("A", dec!(0.004)), ("B", dec!(-0.004))]);
        assert!(resolve(input).is_empty());
    }

    #[test]
    fn test_one_creditor_two_debtors() {
        let input = balances(&[("A", dec!(200)), ("B", dec!(-100)), ("C", dec!(-100))]);
        let result = resolve(input.clone());

        assert_eq!(
            result,
            vec![
                instruction("B", "A", dec!(100)),
                instruction("C", "A", dec!(100)),
            ]
        );
        assert_settles(&input, &result);
    }

    #[test]
    fn test_chain_collapse() {
        let input = balances(&[("A", dec!(50)), ("B", dec!(-30)), ("C", dec!(-20))]);
        let result = resolve(input.clone());

        assert_eq!(
            result,
            vec![
                instruction("B", "A", dec!(30)),
                instruction("C", "A", dec!(20)),
            ]
        );
        assert_settles(&input, &result);
    }

    #[test]
    fn test_largest_pair_first() {
        let input = balances(&[
            ("A", dec!(10)),
            ("B", dec!(70)),
            ("C", dec!(-60)),
            ("D", dec!(-20)),
        ]);
        let result = resolve(input.clone());

        assert_eq!(result[0], instruction("C", "B", dec!(60)));
        assert!(result.len() <= 3);
        assert_settles(&input, &result);
    }

    #[test]
    fn test_ties_break_on_identifier() {
        let input = balances(&[
            ("zoe", dec!(40)),
            ("amy", dec!(40)),
            ("max", dec!(-40)),
            ("bob", dec!(-40)),
        ]);
        let result = resolve(input);

        assert_eq!(
            result,
            vec![
                instruction("bob", "amy", dec!(40)),
                instruction("max", "zoe", dec!(40)),
            ]
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let input = balances(&[
            ("A", dec!(12.5)),
            ("B", dec!(12.5)),
            ("C", dec!(-8.25)),
            ("D", dec!(-8.25)),
            ("E", dec!(-8.5)),
        ]);
        assert_eq!(resolve(input.clone()), resolve(input));
    }

    #[test]
    fn test_cent_amounts() {
        let input = balances(&[("A", dec!(33.34)), ("B", dec!(-16.67)), ("C", dec!(-16.67))]);
        let result = resolve(input.clone());

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|i| i.amount == Money::new(dec!(16.67))));
        assert_settles(&input, &result);
    }

    #[test]
    fn test_unbalanced_input_terminates() {
        let input = balances(&[("A", dec!(50)), ("B", dec!(-30))]);
        let result = resolve(input);
        assert_eq!(result, vec![instruction("B", "A", dec!(30))]);
    }

    #[test]
    fn test_resolve_leaves_caller_snapshot_untouched() {
        let input = balances(&[("A", dec!(5)), ("B", dec!(-5))]);
        let snapshot = input.clone();
        let _ = resolve(input.clone());
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_compute_pipeline() {
        let trip = TripId::from("alps");
        let expenses = vec![
            ExpenseRecord::new("e1", "alps", "A", Money::new(dec!(300)))
                .with_contribution("B", Money::new(dec!(100)))
                .with_contribution("C", Money::new(dec!(100)))
                .with_contribution("A", Money::new(dec!(100))),
        ];

        let settlement = Settlement::compute(&trip, &expenses).unwrap();
        assert_eq!(settlement.balances.get(&id("A")), Some(Money::new(dec!(200))));
        assert_eq!(settlement.instructions.len(), 2);
        assert_settles(&settlement.balances, &settlement.instructions);
    }

    #[test]
    fn test_compute_without_expenses() {
        let trip = TripId::from("empty");
        let result = Settlement::compute(&trip, &[]);
        assert!(matches!(result, Err(SettleError::NoExpenses { trip }) if trip.as_str() == "empty"));
    }
}
