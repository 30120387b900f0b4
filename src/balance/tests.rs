use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

fn line(kind: EntryKind, from: Option<i64>, to: i64, amount: Decimal) -> BalanceLine {
    BalanceLine {
        kind,
        from_account_id: from,
        to_account_id: to,
        amount,
    }
}

#[test]
fn test_empty_is_zero() {
    assert_eq!(derive_balance(1, &[]), Decimal::ZERO);
}

#[test]
fn test_non_transfer_component() {
    let lines = [
        line(EntryKind::Income, None, 1, dec!(500)),
        line(EntryKind::Expense, None, 1, dec!(120.50)),
        line(EntryKind::Income, None, 2, dec!(999)),
    ];
    assert_eq!(non_transfer_component(1, &lines), dec!(379.50));
    assert_eq!(transfer_component(1, &lines), Decimal::ZERO);
}

#[test]
fn test_transfer_component_both_sides() {
    let lines = [
        line(EntryKind::Transfer, Some(1), 2, dec!(100)),
        line(EntryKind::Transfer, Some(2), 1, dec!(30)),
        line(EntryKind::Transfer, Some(3), 4, dec!(7)),
    ];
    assert_eq!(transfer_component(1, &lines), dec!(-70));
    assert_eq!(transfer_component(2, &lines), dec!(70));
    assert_eq!(transfer_component(5, &lines), Decimal::ZERO);
}

#[test]
fn test_transfers_ignored_by_non_transfer_component() {
    let lines = [line(EntryKind::Transfer, Some(2), 1, dec!(40))];
    assert_eq!(non_transfer_component(1, &lines), Decimal::ZERO);
}

#[test]
fn test_transfer_symmetry() {
    let base = vec![
        line(EntryKind::Income, None, 1, dec!(450)),
        line(EntryKind::Expense, None, 2, dec!(10)),
    ];
    let mut with_transfer = base.clone();
    with_transfer.push(line(EntryKind::Transfer, Some(1), 2, dec!(100)));

    let spread_before = derive_balance(2, &base) - derive_balance(1, &base);
    let spread_after = derive_balance(2, &with_transfer) - derive_balance(1, &with_transfer);
    assert_eq!(spread_after - spread_before, dec!(200));
    assert_eq!(derive_balance(1, &with_transfer), dec!(350));
    assert_eq!(derive_balance(2, &with_transfer), dec!(90));
}

#[test]
fn test_signed_amount() {
    assert_eq!(signed_amount(EntryKind::Income, dec!(3)), dec!(3));
    assert_eq!(signed_amount(EntryKind::Expense, dec!(3)), dec!(-3));
    assert_eq!(signed_amount(EntryKind::Transfer, dec!(3)), Decimal::ZERO);
}

#[test]
fn test_rate_zero_last_month() {
    assert_eq!(month_over_month_rate(dec!(100), Decimal::ZERO), Decimal::ZERO);
}

#[test]
fn test_rate_growth_and_decline() {
    assert_eq!(month_over_month_rate(dec!(150), dec!(100)), dec!(50));
    assert_eq!(month_over_month_rate(dec!(50), dec!(200)), dec!(-75));
    assert_eq!(month_over_month_rate(dec!(10), dec!(3)), dec!(233.33));
}

#[test]
fn test_rate_negative_base() {
    // Sign follows the formula literally
    assert_eq!(month_over_month_rate(dec!(-50), dec!(-100)), dec!(-50));
}
