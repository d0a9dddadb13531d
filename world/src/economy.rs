//! Gold ledger shared by tower purchases, sales and kill rewards.

use waypoint_defence_core::Event;

/// Non-negative gold balance.
///
/// Every successful mutation reports the new balance as
/// [`Event::GoldChanged`] on the caller's event queue before returning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EconomyManager {
    balance: u32,
}

impl EconomyManager {
    /// Creates a ledger holding `balance` gold.
    #[must_use]
    pub const fn new(balance: u32) -> Self {
        Self { balance }
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> u32 {
        self.balance
    }

    /// Reports whether `amount` can be spent.
    #[must_use]
    pub const fn can_afford(&self, amount: u32) -> bool {
        amount <= self.balance
    }

    /// Adds `amount` gold, saturating at the numeric limit.
    pub fn earn_gold(&mut self, amount: u32, out: &mut Vec<Event>) {
        if amount == 0 {
            return;
        }
        self.balance = self.balance.saturating_add(amount);
        out.push(Event::GoldChanged {
            balance: self.balance,
        });
    }

    /// Removes `amount` gold if the balance covers it.
    ///
    /// Returns `false` and leaves the balance untouched otherwise.
    pub fn spend_gold(&mut self, amount: u32, out: &mut Vec<Event>) -> bool {
        if !self.can_afford(amount) {
            return false;
        }
        if amount > 0 {
            self.balance -= amount;
            out.push(Event::GoldChanged {
                balance: self.balance,
            });
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overspending_is_refused_without_mutation() {
        let mut economy = EconomyManager::new(30);
        let mut events = Vec::new();

        assert!(!economy.spend_gold(31, &mut events));
        assert_eq!(economy.balance(), 30);
        assert!(events.is_empty());
    }

    #[test]
    fn mutations_report_new_balance() {
        let mut economy = EconomyManager::new(30);
        let mut events = Vec::new();

        assert!(economy.spend_gold(30, &mut events));
        economy.earn_gold(12, &mut events);

        assert_eq!(economy.balance(), 12);
        assert_eq!(
            events,
            vec![
                Event::GoldChanged { balance: 0 },
                Event::GoldChanged { balance: 12 },
            ]
        );
    }

    #[test]
    fn earning_saturates() {
        let mut economy = EconomyManager::new(u32::MAX - 1);
        let mut events = Vec::new();
        economy.earn_gold(10, &mut events);
        assert_eq!(economy.balance(), u32::MAX);
    }

    #[test]
    fn zero_amounts_are_silent() {
        let mut economy = EconomyManager::new(5);
        let mut events = Vec::new();
        economy.earn_gold(0, &mut events);
        assert!(economy.spend_gold(0, &mut events));
        assert!(events.is_empty());
    }

    #[test]
    fn balance_never_goes_negative_over_random_walk() {
        let mut economy = EconomyManager::new(50);
        let mut events = Vec::new();
        let mut expected: u64 = 50;

        for step in 0..500_u32 {
            let amount = step.wrapping_mul(2_654_435_761) % 97;
            if step % 3 == 0 {
                economy.earn_gold(amount, &mut events);
                expected += u64::from(amount);
            } else if economy.spend_gold(amount, &mut events) {
                expected -= u64::from(amount);
            } else {
                assert!(u64::from(amount) > expected);
            }
            assert_eq!(u64::from(economy.balance()), expected);
        }
    }
}
