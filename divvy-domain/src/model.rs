use std::{
    borrow::Borrow,
    collections::{BTreeMap, BTreeSet},
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use arcstr::ArcStr;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Extra fractional digits used when splitting an amount, so that shares stay
/// finer-grained than the amount itself.
const SPLIT_SCALE_MARGIN: u32 = 2;

/// Hard cap on the working scale; `Decimal` cannot represent more digits.
const MAX_SPLIT_SCALE: u32 = 28;

/// Monetary amount with exact decimal semantics.
///
/// Arithmetic never goes through binary floating point, so folding the same
/// expenses always yields the same balances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Builds an amount of `value * 10^-scale`, e.g. `Money::new(12050, 2)`
    /// for 120.50.
    pub fn new(value: i64, scale: u32) -> Self {
        Self(Decimal::new(value, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// -1, 0 or 1 depending on the sign of the amount.
    pub fn signum(self) -> i64 {
        if self.0.is_zero() {
            0
        } else if self.0.is_sign_negative() {
            -1
        } else {
            1
        }
    }

    /// Splits the amount into `count` shares that sum back to it exactly.
    ///
    /// Shares are computed at a working scale `SPLIT_SCALE_MARGIN` digits
    /// finer than the amount's own scale, truncating toward zero. Whatever
    /// remainder the truncation leaves is handed out one quantum at a time
    /// according to `policy`, so the shares always reassemble the full
    /// amount without any epsilon.
    ///
    /// # Arguments
    /// * `count` - Number of shares; zero yields an empty iterator.
    /// * `policy` - Which shares absorb the leftover quanta.
    ///
    /// # Example
    /// ```
    /// use divvy_domain::model::{Money, RemainderPolicy};
    ///
    /// let shares: Vec<Money> = Money::new(7835, 2)
    ///     .split_even(3, RemainderPolicy::FrontLoad)
    ///     .collect();
    /// assert_eq!(shares[0], Money::new(261167, 4));
    /// assert_eq!(shares[2], Money::new(261166, 4));
    /// assert_eq!(shares.iter().sum::<Money>(), Money::new(7835, 2));
    /// ```
    pub fn split_even(self, count: usize, policy: RemainderPolicy) -> impl Iterator<Item = Money> {
        let (base, step, remainder) = if count == 0 {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        } else {
            let scale = (self.0.scale() + SPLIT_SCALE_MARGIN).min(MAX_SPLIT_SCALE);
            let divisor = Decimal::from(count as u64);
            let base = (self.0 / divisor).trunc_with_scale(scale);
            let remainder = self.0 - base * divisor;
            let quantum = Decimal::new(1, scale);
            let step = if remainder.is_sign_negative() {
                -quantum
            } else {
                quantum
            };
            (base, step, remainder)
        };

        // Invariant: `remainder` is an exact multiple of `step` and smaller in
        // magnitude than `count * step`, so it drains to exactly zero.
        let mut remainder = remainder;
        (0..count).map(move |_| match policy {
            RemainderPolicy::FrontLoad => {
                if remainder.is_zero() {
                    Money(base)
                } else {
                    remainder -= step;
                    Money(base + step)
                }
            }
        })
    }
}

/// How `Money::split_even` hands out the sub-quantum remainder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemainderPolicy {
    /// Earlier shares absorb the leftover quanta first.
    FrontLoad,
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        Money(iter.map(|money| money.0).sum())
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        Money(iter.map(|money| money.0).sum())
    }
}

/// Display name identifying one participant.
///
/// Comparison is exact and case-sensitive; `"alex"` and `"Alex"` are two
/// different people. Cloning is cheap, the backing string is shared.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantName(ArcStr);

impl ParticipantName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(ArcStr::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantName {
    fn from(name: &str) -> Self {
        Self(ArcStr::from(name))
    }
}

impl From<String> for ParticipantName {
    fn from(name: String) -> Self {
        Self(ArcStr::from(name))
    }
}

impl Borrow<str> for ParticipantName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Net balance per participant, relative to the user.
///
/// Positive means the participant owes the user, negative means the user owes
/// the participant. The user never appears as a key.
///
/// Invariant for deterministic settlement ids: this is a `BTreeMap` keyed by
/// `ParticipantName`, so iteration order is stable.
pub type ParticipantBalances = BTreeMap<ParticipantName, Money>;

/// One shared cost.
///
/// `shares` maps each consuming participant to their portion of `amount`; the
/// payer fronted the whole amount and may or may not hold a share themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct Expense {
    pub description: String,
    pub date: NaiveDate,
    pub group: Option<String>,
    pub amount: Money,
    pub payer: ParticipantName,
    pub shares: BTreeMap<ParticipantName, Money>,
}

impl Expense {
    /// Builds an expense split evenly across `participants`.
    ///
    /// Shares come from `Money::split_even`, remainder quanta going to the
    /// earliest names in sorted order, so they sum to `amount` exactly.
    /// Duplicate names collapse to one share. An empty participant set yields
    /// an empty share mapping, which the balance fold rejects.
    pub fn split_evenly(
        description: impl Into<String>,
        date: NaiveDate,
        amount: Money,
        payer: ParticipantName,
        participants: impl IntoIterator<Item = ParticipantName>,
    ) -> Self {
        let participants: BTreeSet<ParticipantName> = participants.into_iter().collect();
        let shares = participants
            .iter()
            .cloned()
            .zip(amount.split_even(participants.len(), RemainderPolicy::FrontLoad))
            .collect();
        Self {
            description: description.into(),
            date,
            group: None,
            amount,
            payer,
            shares,
        }
    }

    /// Builds an expense from caller-supplied per-participant shares.
    ///
    /// Construction does not validate; the balance fold checks that the
    /// shares add up to `amount` when the expense is actually used.
    pub fn itemized(
        description: impl Into<String>,
        date: NaiveDate,
        amount: Money,
        payer: ParticipantName,
        shares: BTreeMap<ParticipantName, Money>,
    ) -> Self {
        Self {
            description: description.into(),
            date,
            group: None,
            amount,
            payer,
            shares,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// The user's stake in this expense, as an expense list would label it.
    pub fn position_for(&self, user: &ParticipantName) -> ExpensePosition {
        let own_share = self.shares.get(user).copied().unwrap_or(Money::ZERO);
        if self.payer == *user {
            ExpensePosition::Lent(self.amount - own_share)
        } else if self.shares.contains_key(user) {
            ExpensePosition::Owes(own_share)
        } else {
            ExpensePosition::NotInvolved
        }
    }
}

/// The user's relationship to a single expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpensePosition {
    /// The user paid; the other share holders owe the user this much in total.
    Lent(Money),
    /// Someone else paid; the user owes them this share.
    Owes(Money),
    NotInvolved,
}

/// Identifier of a settlement, fresh per computation starting from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SettlementId(pub u64);

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A suggested transfer that moves one or two balances toward zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub id: SettlementId,
    pub from: ParticipantName,
    pub to: ParticipantName,
    pub amount: Money,
}
