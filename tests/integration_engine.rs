//! Aggregation engine integration tests

use chrono::Duration;
use rust_decimal_macros::dec;
use uuid::Uuid;

use sec_incentives::domain::{PersonRosterEntry, RankTable, SaleEvent};
use sec_incentives::engine::{
    group_by_rank, select_best_submission, IncentiveAggregator, IncentiveRules, Leaderboard,
    LeaderboardFilter, PersonKey, ReportWindow,
};

mod common;

use common::{day, money, paid_sale, phone_only_roster, submission, window_start};

const NO_PHONES: &[&str] = &[];

fn aggregator() -> IncentiveAggregator {
    IncentiveAggregator::new(IncentiveRules::default())
}

#[test]
fn test_end_to_end_bonus_stacking_scenario() {
    let roster = vec![phone_only_roster("9990001111").with_bonus_flag()];
    let events = vec![SaleEvent::new(Uuid::new_v4(), "p1", money(25_000), day(3))
        .with_phone("9990001111")
        .paid(day(4))];

    let outcome = aggregator().aggregate(&events, &roster, &["9990001111"], window_start());

    assert_eq!(outcome.people.len(), 1);
    let person = &outcome.people[0];
    assert_eq!(person.person_key, PersonKey::Id("p1".to_string()));
    assert_eq!(person.total_sales_amount.value(), dec!(56000));
    assert_eq!(person.rank, "Sales Captain");
    assert!(person.bonus_applied);
    assert!(person.manual_bonus_applied);
}

#[test]
fn test_bonus_added_once_when_person_has_sales_and_flag() {
    let roster = vec![PersonRosterEntry::new("p1", "9000000001").with_bonus_flag()];
    let events = vec![paid_sale("p1", 1_000, 2), paid_sale("p1", 2_000, 3)];

    let outcome = aggregator().aggregate(&events, &roster, NO_PHONES, window_start());

    assert_eq!(outcome.people.len(), 1);
    assert_eq!(outcome.people[0].total_sales_amount.value(), dec!(13000));
    assert_eq!(outcome.stats.stackable_bonuses, 1);
}

#[test]
fn test_rank_thresholds_inclusive_on_lower_edge() {
    let table = RankTable::default();
    assert_eq!(table.assign(&money(150_000)), "Sales Chief Marshal");
    assert_eq!(table.assign(&money(149_999)), "Sales Commander");
    assert_eq!(table.assign(&money(120_000)), "Sales Commander");
    assert_eq!(table.assign(&money(119_999)), "Sales Major");
    assert_eq!(table.assign(&money(51_000)), "Sales Captain");
    assert_eq!(table.assign(&money(21_000)), "Sales Lieutenant");
    assert_eq!(table.assign(&money(20_999)), "Salesveer");
    assert_eq!(table.assign(&money(0)), "Salesveer");
}

#[test]
fn test_duplicate_manual_phones_apply_once() {
    let roster = vec![PersonRosterEntry::new("p1", "9000000001")];
    let phones = ["9000000001", " 9000000001 ", "9000000001"];

    let outcome = aggregator().aggregate(&[], &roster, &phones, window_start());

    assert_eq!(outcome.people.len(), 1);
    assert_eq!(outcome.people[0].total_sales_amount.value(), dec!(21000));
    assert_eq!(outcome.stats.manual_bonuses, 1);
}

#[test]
fn test_duplicate_roster_rows_for_manual_phone_apply_once() {
    let roster = vec![
        PersonRosterEntry::new("p1", "9000000001"),
        PersonRosterEntry::new("p1", " 9000000001"),
    ];

    let outcome = aggregator().aggregate(&[], &roster, &["9000000001"], window_start());

    assert_eq!(outcome.people.len(), 1);
    assert_eq!(outcome.people[0].total_sales_amount.value(), dec!(21000));
}

#[test]
fn test_best_submission_tie_prefers_newest() {
    let t1 = day(2);
    let t2 = t1 + Duration::hours(3);
    let submissions = vec![submission("p1", 80, t2), submission("p1", 80, t1)];

    let result = select_best_submission(&submissions);

    assert_eq!(result.best.len(), 1);
    assert_eq!(result.best[0].submitted_at, t2);
}

#[test]
fn test_best_submission_tie_prefers_newest_regardless_of_input_order() {
    let t1 = day(2);
    let t2 = day(3);
    let submissions = vec![submission("p1", 80, t1), submission("p1", 80, t2)];

    let result = select_best_submission(&submissions);

    assert_eq!(result.best[0].submitted_at, t2);
}

#[test]
fn test_best_submission_higher_score_beats_recency() {
    let t1 = day(2);
    let t2 = day(9);
    let submissions = vec![submission("p1", 60, t2), submission("p1", 90, t1)];

    let result = select_best_submission(&submissions);

    assert_eq!(result.best.len(), 1);
    assert_eq!(result.best[0].submitted_at, t1);
    assert_eq!(result.best[0].score, dec!(90));
}

#[test]
fn test_empty_input_returns_empty_result() {
    let outcome = aggregator().aggregate(&[], &[], NO_PHONES, window_start());

    assert!(outcome.is_empty());
    assert!(Leaderboard::from_people(&outcome.people).is_empty());
    assert!(group_by_rank(&outcome.people, &RankTable::default()).is_empty());
}

#[test]
fn test_equal_totals_keep_insertion_order() {
    let events = vec![
        paid_sale("first", 5_000, 2),
        paid_sale("second", 5_000, 3),
        paid_sale("third", 5_000, 4),
    ];

    for _ in 0..3 {
        let outcome = aggregator().aggregate(&events, &[], NO_PHONES, window_start());
        let ids: Vec<_> = outcome
            .people
            .iter()
            .filter_map(|p| p.person_id.as_deref())
            .collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }
}

#[test]
fn test_sum_of_qualifying_sales() {
    let events = vec![
        paid_sale("p1", 1_000, 2),
        paid_sale("p1", 2_000, 3),
        paid_sale("p1", 1_500, 4),
    ];

    let outcome = aggregator().aggregate(&events, &[], NO_PHONES, window_start());

    assert_eq!(outcome.people[0].total_sales_amount.value(), dec!(4500));
    assert_eq!(outcome.people[0].sale_count, 3);
    assert_eq!(outcome.people[0].name, "Unknown");
}

#[test]
fn test_unpaid_and_out_of_window_events_ignored() {
    let mut unpaid = paid_sale("p1", 9_000, 2);
    unpaid.paid_at = None;
    let before_window = paid_sale("p1", 7_000, 1);
    let mut early = before_window.clone();
    early.date_of_sale = window_start() - Duration::days(1);

    let events = vec![unpaid, early, paid_sale("p1", 1_000, 3)];
    let outcome = aggregator().aggregate(&events, &[], NO_PHONES, window_start());

    assert_eq!(outcome.people[0].total_sales_amount.value(), dec!(1000));
    assert_eq!(outcome.stats.events_unpaid, 1);
    assert_eq!(outcome.stats.events_outside_window, 1);
    assert_eq!(outcome.stats.events_considered, 1);
}

#[test]
fn test_window_end_is_exclusive() {
    let window = ReportWindow::between(window_start(), day(4)).unwrap();
    let events = vec![paid_sale("p1", 1_000, 3), paid_sale("p1", 2_000, 4)];

    let outcome = aggregator().aggregate_window(&events, &[], NO_PHONES, window);

    assert_eq!(outcome.people[0].total_sales_amount.value(), dec!(1000));
    assert!(ReportWindow::between(day(4), day(3)).is_err());
}

#[test]
fn test_events_without_identity_kept_as_unknown_rows() {
    let mut orphan = paid_sale("ignored", 4_000, 2);
    orphan.person_id = None;

    let outcome = aggregator().aggregate(&[orphan.clone()], &[], NO_PHONES, window_start());

    assert_eq!(outcome.people.len(), 1);
    assert_eq!(outcome.people[0].person_key, PersonKey::Unknown(orphan.event_id));
    assert_eq!(outcome.people[0].name, "Unknown");
    assert_eq!(outcome.stats.events_unattributed, 1);
}

#[test]
fn test_leaderboard_filters_keep_global_positions() {
    let roster = vec![
        PersonRosterEntry::new("p1", "9000000001").with_region("West"),
        PersonRosterEntry::new("p2", "9000000002").with_region("North"),
        PersonRosterEntry::new("p3", "9000000003").with_region("west"),
    ];
    let events = vec![
        paid_sale("p1", 30_000, 2),
        paid_sale("p2", 20_000, 2),
        paid_sale("p3", 10_000, 2),
    ];

    let outcome = aggregator().aggregate(&events, &roster, NO_PHONES, window_start());
    let board = Leaderboard::from_people(&outcome.people);
    let filter = LeaderboardFilter {
        region: Some("WEST".to_string()),
        ..LeaderboardFilter::default()
    };

    let rows = board.filtered(&filter);
    let positions: Vec<_> = rows.iter().map(|r| r.rank).collect();
    assert_eq!(positions, vec![1, 3]);
}

#[test]
fn test_flagged_roster_person_without_sales_gets_stackable_bonus_only() {
    let roster = vec![PersonRosterEntry::new("p1", "9000000001")
        .with_name("Asha")
        .with_bonus_flag()];

    let outcome = aggregator().aggregate(&[], &roster, NO_PHONES, window_start());

    assert_eq!(outcome.people.len(), 1);
    let person = &outcome.people[0];
    assert_eq!(person.name, "Asha");
    assert_eq!(person.total_sales_amount.value(), dec!(10000));
    assert!(person.bonus_applied);
    assert!(!person.manual_bonus_applied);
    assert_eq!(person.sale_count, 0);
}

#[test]
fn test_manual_bonus_person_without_sales_also_gets_stackable_bonus() {
    let roster = vec![PersonRosterEntry::new("p1", "9000000001").with_bonus_flag()];

    let outcome = aggregator().aggregate(&[], &roster, &["9000000001"], window_start());

    assert_eq!(outcome.people.len(), 1);
    let person = &outcome.people[0];
    assert_eq!(person.total_sales_amount.value(), dec!(31000));
    assert!(person.bonus_applied);
    assert!(person.manual_bonus_applied);
    assert_eq!(person.rank, "Sales Lieutenant");
}

#[test]
fn test_phone_and_id_sales_merge_regardless_of_order() {
    let with_id = paid_sale("p1", 4_000, 2).with_phone("9000000001");
    let mut phone_only = paid_sale("ignored", 6_000, 3).with_phone(" 9000000001");
    phone_only.person_id = None;

    let id_first = aggregator().aggregate(
        &[with_id.clone(), phone_only.clone()],
        &[],
        NO_PHONES,
        window_start(),
    );
    let phone_first =
        aggregator().aggregate(&[phone_only, with_id], &[], NO_PHONES, window_start());

    for outcome in [&id_first, &phone_first] {
        assert_eq!(outcome.people.len(), 1);
        let person = &outcome.people[0];
        assert_eq!(person.person_key, PersonKey::Id("p1".to_string()));
        assert_eq!(person.person_id.as_deref(), Some("p1"));
        assert_eq!(person.total_sales_amount.value(), dec!(10000));
        assert_eq!(person.sale_count, 2);
    }
}

#[test]
fn test_total_past_money_limit_skips_sale_and_keeps_other_rows() {
    let events = vec![
        paid_sale("p1", 600_000_000_000, 2),
        paid_sale("p1", 600_000_000_000, 3),
        paid_sale("p2", 5, 3),
    ];

    let outcome = aggregator().aggregate(&events, &[], NO_PHONES, window_start());

    assert_eq!(outcome.people.len(), 2);
    assert_eq!(outcome.people[0].total_sales_amount.value(), dec!(600000000000));
    assert_eq!(outcome.people[0].sale_count, 1);
    assert_eq!(outcome.people[1].total_sales_amount.value(), dec!(5));
    assert_eq!(outcome.stats.amounts_rejected, 1);
    assert_eq!(outcome.stats.events_considered, 3);
}
