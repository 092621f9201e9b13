use divvy_domain::{Expense, Money, ParticipantName, Settlement};

/// Immutable view of the ledger handed to each computation.
///
/// Mutators only append; records never change in place, so two computations
/// over the same snapshot see the same history.
#[derive(Clone, Debug)]
pub struct LedgerSnapshot {
    participants: Vec<ParticipantName>,
    user: ParticipantName,
    expenses: Vec<Expense>,
}

impl LedgerSnapshot {
    /// Builds a snapshot. The user counts as a participant whether or not
    /// the caller listed them; duplicate names collapse, first mention wins.
    pub fn new(
        user: ParticipantName,
        participants: impl IntoIterator<Item = ParticipantName>,
        expenses: Vec<Expense>,
    ) -> Self {
        let mut unique = vec![user.clone()];
        for name in participants {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self {
            participants: unique,
            user,
            expenses,
        }
    }

    pub fn user(&self) -> &ParticipantName {
        &self.user
    }

    pub fn participants(&self) -> &[ParticipantName] {
        &self.participants
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Appends one expense to the history.
    pub fn push_expense(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    /// Registers another participant; already-known names are ignored.
    pub fn add_participant(&mut self, name: ParticipantName) {
        if !self.participants.contains(&name) {
            self.participants.push(name);
        }
    }
}

/// One row of the balances view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticipantBalance {
    pub name: ParticipantName,
    pub amount: Money,
}

/// Everything the balances screen shows: per-participant rows, the suggested
/// settlements, and the user's summary totals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerReport {
    pub balances: Vec<ParticipantBalance>,
    pub settlements: Vec<Settlement>,
    /// Sum of all positive balances.
    pub total_owed_to_user: Money,
    /// Sum of the magnitudes of all negative balances.
    pub total_user_owes: Money,
    /// `total_owed_to_user - total_user_owes`.
    pub net_balance: Money,
}
