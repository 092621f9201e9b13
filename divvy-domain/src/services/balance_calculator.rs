use fxhash::FxHashSet;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, error};

use crate::model::{Expense, Money, ParticipantBalances, ParticipantName};

/// Tolerance for caller-supplied share vectors, in currency units. Shares
/// produced by `Money::split_even` reassemble the amount exactly and never
/// need it.
fn share_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Rejection reasons for the balance fold.
///
/// Each variant carries the position of the offending expense in input order,
/// so callers can point at the exact record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("expense {index} references unknown participant \"{name}\"")]
    UnknownParticipant { name: ParticipantName, index: usize },

    #[error("expense {index} has nobody to share the cost")]
    EmptyParticipantSet { index: usize },

    #[error("expense {index} has non-positive amount {amount}")]
    NonPositiveAmount { amount: Money, index: usize },

    #[error("expense {index} shares sum to {actual}, expected {expected}")]
    ShareSumMismatch {
        expected: Money,
        actual: Money,
        index: usize,
    },
}

/// Derives net balances from an expense history.
///
/// The fold is a single pass: each expense credits its payer with the full
/// amount and debits every share holder by their share. Reporting then flips
/// the sign and drops the user, so a positive balance reads "owes the user"
/// and a negative one "the user owes them".
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Folds `expenses` into a net balance per participant other than `user`.
    ///
    /// The whole computation fails on the first invalid expense; no partial
    /// balances escape. Validation runs against the full expense list even
    /// when earlier expenses already folded cleanly.
    ///
    /// # Arguments
    /// * `participants` - Every known name. Must include `user`; expenses
    ///   referencing names outside this set are rejected.
    /// * `user` - The distinguished participant balances are relative to.
    /// * `expenses` - Expense history in input order.
    ///
    /// # Returns
    /// Balances keyed by name, excluding `user`, or the first rejection.
    pub fn calculate(
        &self,
        participants: &[ParticipantName],
        user: &ParticipantName,
        expenses: &[Expense],
    ) -> Result<ParticipantBalances, BalanceError> {
        let known: FxHashSet<&str> = participants.iter().map(ParticipantName::as_str).collect();
        let mut accumulator: ParticipantBalances = participants
            .iter()
            .map(|name| (name.clone(), Money::ZERO))
            .collect();

        debug!(
            participant_count = accumulator.len(),
            expense_count = expenses.len(),
            user = %user,
            "Balance fold started"
        );

        for (index, expense) in expenses.iter().enumerate() {
            validate_expense(&known, index, expense)?;

            if let Some(balance) = accumulator.get_mut(expense.payer.as_str()) {
                *balance += expense.amount;
            }
            for (name, share) in &expense.shares {
                if let Some(balance) = accumulator.get_mut(name.as_str()) {
                    *balance -= *share;
                }
            }
        }

        let balances: ParticipantBalances = accumulator
            .into_iter()
            .filter(|(name, _)| name != user)
            .map(|(name, net)| (name, -net))
            .collect();

        debug!(balance_count = balances.len(), "Balance fold finished");
        Ok(balances)
    }
}

fn validate_expense(
    known: &FxHashSet<&str>,
    index: usize,
    expense: &Expense,
) -> Result<(), BalanceError> {
    if !known.contains(expense.payer.as_str()) {
        error!(
            reject_reason = "unknown_payer",
            index,
            name = %expense.payer,
            "Expense rejected"
        );
        return Err(BalanceError::UnknownParticipant {
            name: expense.payer.clone(),
            index,
        });
    }

    if let Some(name) = expense
        .shares
        .keys()
        .find(|name| !known.contains(name.as_str()))
    {
        error!(
            reject_reason = "unknown_share_holder",
            index,
            name = %name,
            "Expense rejected"
        );
        return Err(BalanceError::UnknownParticipant {
            name: name.clone(),
            index,
        });
    }

    if expense.shares.is_empty() {
        error!(reject_reason = "empty_participant_set", index, "Expense rejected");
        return Err(BalanceError::EmptyParticipantSet { index });
    }

    if expense.amount <= Money::ZERO {
        error!(
            reject_reason = "non_positive_amount",
            index,
            amount = %expense.amount,
            "Expense rejected"
        );
        return Err(BalanceError::NonPositiveAmount {
            amount: expense.amount,
            index,
        });
    }

    let share_sum: Money = expense.shares.values().sum();
    if (share_sum - expense.amount).abs().as_decimal() > share_tolerance() {
        error!(
            reject_reason = "share_sum_mismatch",
            index,
            expected = %expense.amount,
            actual = %share_sum,
            "Expense rejected"
        );
        return Err(BalanceError::ShareSumMismatch {
            expected: expense.amount,
            actual: share_sum,
            index,
        });
    }

    Ok(())
}
