use tracing::{debug, error};

use crate::model::{Money, ParticipantBalances, ParticipantName, Settlement, SettlementId};
use crate::services::settlement_planner::PlanError;

/// Greedy minimum-transfer netting across the whole group.
///
/// The user's own position is reconstructed as the negative sum of the
/// balances, then the largest creditor is repeatedly matched with the largest
/// debtor. Transfers may pair two non-user participants, which is exactly
/// what `SettlementPlanner` refuses to do; picking this strategy changes who
/// pays whom, so it is never substituted silently.
pub struct DebtNetting;

impl DebtNetting {
    /// Produces a near-minimal set of transfers that zeroes every position.
    ///
    /// Ids are sequential from 1 in emission order. Ties on magnitude break
    /// toward the lexicographically first name, with the user considered
    /// last.
    pub fn plan(
        &self,
        balances: &ParticipantBalances,
        user: &ParticipantName,
    ) -> Result<Vec<Settlement>, PlanError> {
        if balances.contains_key(user.as_str()) {
            error!(
                reject_reason = "user_in_balance_set",
                user = %user,
                "Debt netting rejected"
            );
            return Err(PlanError::InvalidBalanceSet { name: user.clone() });
        }

        // Positions are held in "should receive" terms: a participant who
        // owes the user has a negative position, a creditor a positive one.
        let mut positions: Vec<(ParticipantName, Money)> = balances
            .iter()
            .map(|(name, balance)| (name.clone(), -*balance))
            .collect();
        let user_position: Money = balances.values().sum();
        if !user_position.is_zero() {
            positions.push((user.clone(), user_position));
        }

        let mut settlements = Vec::new();
        let mut next_id = SettlementId(1);
        loop {
            let Some(creditor) = largest(&positions, 1) else {
                break;
            };
            let Some(debtor) = largest(&positions, -1) else {
                break;
            };

            let amount = positions[creditor].1.min(positions[debtor].1.abs());
            positions[creditor].1 -= amount;
            positions[debtor].1 += amount;

            settlements.push(Settlement {
                id: next_id,
                from: positions[debtor].0.clone(),
                to: positions[creditor].0.clone(),
                amount,
            });
            next_id = SettlementId(next_id.0 + 1);
        }

        debug!(
            balance_count = balances.len(),
            settlement_count = settlements.len(),
            "Debt netting plan built"
        );
        Ok(settlements)
    }
}

/// Index of the position with the largest magnitude among those matching
/// `sign`. Earlier entries win ties, and `positions` lists participants in
/// name order with the user appended last.
fn largest(positions: &[(ParticipantName, Money)], sign: i64) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, (_, position)) in positions.iter().enumerate() {
        if position.signum() != sign {
            continue;
        }
        match best {
            Some(current) if positions[current].1.abs() >= position.abs() => {}
            _ => best = Some(index),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::{fixture, rstest};
    use rust_decimal::Decimal;

    use super::*;

    #[fixture]
    fn netting() -> DebtNetting {
        DebtNetting
    }

    fn money(value: &str) -> Money {
        Money::from_decimal(Decimal::from_str(value).expect("valid decimal"))
    }

    fn balances(entries: &[(&str, &str)]) -> ParticipantBalances {
        entries
            .iter()
            .map(|(name, amount)| (ParticipantName::from(*name), money(amount)))
            .collect()
    }

    #[rstest]
    #[case::single_debtor_pays_user(
        &[("Alex", "40.00")],
        &[("Alex", "You", "40.00")]
    )]
    #[case::user_pays_single_creditor(
        &[("Alex", "-25.00")],
        &[("You", "Alex", "25.00")]
    )]
    #[case::offsetting_debts_bypass_the_user(
        &[("Alex", "-10.00"), ("Jamie", "10.00")],
        &[("Jamie", "Alex", "10.00")]
    )]
    #[case::partial_offset_leaves_user_leg(
        &[("Alex", "-10.00"), ("Jamie", "5.00")],
        &[("Jamie", "Alex", "5.00"), ("You", "Alex", "5.00")]
    )]
    #[case::empty_balances(&[], &[])]
    fn plan_matches_largest_creditor_and_debtor(
        netting: DebtNetting,
        #[case] input: &[(&str, &str)],
        #[case] expected: &[(&str, &str, &str)],
    ) {
        let user = ParticipantName::from("You");

        let settlements = netting
            .plan(&balances(input), &user)
            .expect("netting should succeed");

        let expected: Vec<Settlement> = expected
            .iter()
            .enumerate()
            .map(|(position, (from, to, amount))| Settlement {
                id: SettlementId(position as u64 + 1),
                from: ParticipantName::from(*from),
                to: ParticipantName::from(*to),
                amount: money(amount),
            })
            .collect();
        assert_eq!(settlements, expected);
    }

    #[rstest]
    fn netting_never_emits_more_transfers_than_user_routing(netting: DebtNetting) {
        let user = ParticipantName::from("You");
        let input = balances(&[
            ("Alex", "-9.9249"),
            ("Jamie", "30.225"),
            ("Taylor", "9.625"),
        ]);

        let settlements = netting.plan(&input, &user).expect("netting should succeed");

        // Three nonzero balances plus the user's reconstructed position give
        // at most three transfers.
        assert!(settlements.len() <= 3);

        let mut positions = ParticipantBalances::new();
        for (name, balance) in &input {
            positions.insert(name.clone(), -*balance);
        }
        positions.insert(user.clone(), input.values().sum());
        for settlement in &settlements {
            *positions
                .get_mut(&settlement.from)
                .expect("transfer names a known position") += settlement.amount;
            *positions
                .get_mut(&settlement.to)
                .expect("transfer names a known position") -= settlement.amount;
        }
        assert!(positions.values().all(|position| position.is_zero()));
    }

    #[rstest]
    fn magnitude_ties_break_by_name(netting: DebtNetting) {
        let user = ParticipantName::from("You");
        let input = balances(&[
            ("Alex", "-10.00"),
            ("Jamie", "10.00"),
            ("Taylor", "10.00"),
        ]);

        let settlements = netting.plan(&input, &user).expect("netting should succeed");

        // Jamie and Taylor owe the same amount; Jamie settles first, and the
        // leftover debtor pays the user's reconstructed creditor leg.
        let expected = [
            Settlement {
                id: SettlementId(1),
                from: ParticipantName::from("Jamie"),
                to: ParticipantName::from("Alex"),
                amount: money("10.00"),
            },
            Settlement {
                id: SettlementId(2),
                from: ParticipantName::from("Taylor"),
                to: ParticipantName::from("You"),
                amount: money("10.00"),
            },
        ];
        assert_eq!(settlements, expected);
    }

    #[rstest]
    fn balance_set_containing_the_user_is_rejected(netting: DebtNetting) {
        let user = ParticipantName::from("You");
        let input = balances(&[("You", "10.00")]);

        let error = netting
            .plan(&input, &user)
            .expect_err("user entry should be rejected");

        assert_eq!(error, PlanError::InvalidBalanceSet { name: user });
    }
}
