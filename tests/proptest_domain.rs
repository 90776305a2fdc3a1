//! Property-Based Tests - Domain Layer Invariants
//!
//! Uses `proptest` to verify that the constant-product pricing engine
//! maintains its mathematical invariants across random trade
//! sequences.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use prediction_ledger::domain::market::Side;
use prediction_ledger::domain::pricing;
use prediction_ledger::domain::trade::Direction;

fn side_of(tag: u8) -> Side {
    if tag % 2 == 0 { Side::Yes } else { Side::No }
}

// ── Spot price properties ───────────────────────────────────

proptest! {
    /// YES and NO prices always sum to exactly 1.
    #[test]
    fn prices_sum_to_one(yes in 1u32..100_000, no in 1u32..100_000) {
        let yes = Decimal::from(yes);
        let no = Decimal::from(no);
        let sum = pricing::spot_price(yes, no, Side::Yes)
            + pricing::spot_price(yes, no, Side::No);
        let diff = (sum - Decimal::ONE).abs();
        prop_assert!(diff < dec!(0.0000000001), "Prices must sum to 1, got {sum}");
    }

    /// Each price lies strictly inside (0, 1).
    #[test]
    fn prices_in_unit_interval(yes in 1u32..100_000, no in 1u32..100_000) {
        let price = pricing::spot_price(Decimal::from(yes), Decimal::from(no), Side::Yes);
        prop_assert!(price > Decimal::ZERO);
        prop_assert!(price < Decimal::ONE);
    }
}

// ── Trade effect properties ─────────────────────────────────

proptest! {
    /// Buying strictly raises the quoted price of the bought side.
    #[test]
    fn buying_raises_spot_price(tag in 0u8..2, pct in 1u32..=79) {
        let side = side_of(tag);
        let quantity = dec!(100) * Decimal::from(pct) / dec!(100);
        let before = pricing::spot_price(dec!(100), dec!(100), side);
        let effect = pricing::buy_effect(dec!(100), dec!(100), side, quantity).unwrap();
        let after = pricing::spot_price(effect.yes_pool, effect.no_pool, side);
        prop_assert!(after > before, "Buy must raise {side} price: {before} -> {after}");
    }

    /// Average cost per share grows strictly with order size.
    #[test]
    fn price_impact_grows_with_size(pct1 in 1u32..=39, extra in 1u32..=39) {
        let q1 = Decimal::from(pct1);
        let q2 = Decimal::from(pct1 + extra);
        let small = pricing::buy_effect(dec!(100), dec!(100), Side::Yes, q1).unwrap();
        let large = pricing::buy_effect(dec!(100), dec!(100), Side::Yes, q2).unwrap();
        prop_assert!(
            large.price > small.price,
            "Per-share cost must grow with size: {} vs {}",
            small.price,
            large.price
        );
    }

    /// A buy followed by selling the same quantity back is zero-sum
    /// and restores the pools.
    #[test]
    fn buy_sell_round_trip_is_zero_sum(tag in 0u8..2, pct in 1u32..=79) {
        let side = side_of(tag);
        let quantity = Decimal::from(pct);
        let buy = pricing::buy_effect(dec!(100), dec!(100), side, quantity).unwrap();
        let sell = pricing::sell_effect(buy.yes_pool, buy.no_pool, side, quantity).unwrap();

        let eps = dec!(0.000000001);
        prop_assert!((sell.amount - buy.amount).abs() < eps);
        prop_assert!((sell.yes_pool - dec!(100)).abs() < eps);
        prop_assert!((sell.no_pool - dec!(100)).abs() < eps);
    }
}

// ── Trade sequence properties ───────────────────────────────

proptest! {
    /// Across any random trade sequence, the pool product stays within
    /// tolerance of the original k, pools stay positive, and every
    /// priced amount is positive.
    #[test]
    fn invariant_holds_across_trade_sequences(
        steps in proptest::collection::vec((0u8..4, 1u32..=60), 1..40)
    ) {
        let mut yes = dec!(100);
        let mut no = dec!(100);
        let k0 = yes * no;

        for (tag, pct) in steps {
            let side = side_of(tag);
            let direction = if tag < 2 { Direction::Buy } else { Direction::Sell };
            let pool = match side {
                Side::Yes => yes,
                Side::No => no,
            };
            let quantity = pool * Decimal::from(pct) / dec!(100);
            if quantity <= Decimal::ZERO {
                continue;
            }

            let effect = pricing::trade_effect(yes, no, side, direction, quantity).unwrap();
            yes = effect.yes_pool;
            no = effect.no_pool;

            prop_assert!(yes > Decimal::ZERO, "YES pool went non-positive: {yes}");
            prop_assert!(no > Decimal::ZERO, "NO pool went non-positive: {no}");
            prop_assert!(effect.amount > Decimal::ZERO);

            let drift = pricing::invariant_drift(yes, no, k0);
            prop_assert!(
                drift <= dec!(0.000000001),
                "Invariant drift {drift} exceeds tolerance after trade"
            );
        }
    }

    /// Quantities at or above the pool are always rejected, never
    /// silently clamped.
    #[test]
    fn overdrawing_the_pool_always_fails(excess in 0u32..1_000) {
        let quantity = dec!(100) + Decimal::from(excess);
        let result = pricing::buy_effect(dec!(100), dec!(100), Side::Yes, quantity);
        prop_assert!(result.is_err());
    }
}
