//! Property-based tests for the stats record and its store.
//!
//! Drives a record through arbitrary view/skip/vote sequences across day
//! boundaries and checks the counter invariants, then checks that the
//! store hands back exactly what was last written.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use xeyes::host::MemoryStorage;
use xeyes::managers::stats_store::StatsStore;
use xeyes::messaging::{StatsRequest, StatsResponse};
use xeyes::types::stats::StatsRecord;

#[derive(Debug, Clone)]
enum Event {
    View,
    Skip,
    Vote(bool),
    NextDay,
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => Just(Event::View),
        4 => Just(Event::Skip),
        2 => any::<bool>().prop_map(Event::Vote),
        1 => Just(Event::NextDay),
    ]
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn arb_record() -> impl Strategy<Value = StatsRecord> {
    (
        (0u64..10_000, 0u64..10_000, 0u64..500, 0u64..500),
        (0u64..100, 0u64..100, 0u64..3650),
        (0u64..1000, 0u64..1000),
    )
        .prop_map(
            |((total_viewed, total_skipped, current, extra), (today_viewed, today_skipped, offset), (satisfied, unsatisfied))| {
                let mut record = StatsRecord::new(start() + Days::new(offset));
                record.total_viewed = total_viewed;
                record.total_skipped = total_skipped;
                record.current_streak = current;
                record.best_streak = current + extra;
                record.today_viewed = today_viewed;
                record.today_skipped = today_skipped;
                record.satisfied_count = satisfied;
                record.unsatisfied_count = unsatisfied;
                record
            },
        )
}

// **Property 1: Counter invariants hold under any event sequence**
//
// *For any* sequence of events, the current streak SHALL never exceed the
// best streak, totals SHALL count every event, daily counters SHALL only
// count events of the current day, and the best streak SHALL never drop.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn counters_stay_consistent(events in proptest::collection::vec(arb_event(), 0..80)) {
        let mut today = start();
        let mut record = StatsRecord::new(today);
        let (mut views, mut skips, mut votes_yes, mut votes_no) = (0u64, 0u64, 0u64, 0u64);
        let (mut views_today, mut skips_today) = (0u64, 0u64);

        for event in events {
            let best_before = record.best_streak;
            match &event {
                Event::View => {
                    record.record_view(today);
                    views += 1;
                    views_today += 1;
                    prop_assert_eq!(record.current_streak, 0);
                }
                Event::Skip => {
                    record.record_skip(today);
                    skips += 1;
                    skips_today += 1;
                }
                Event::Vote(satisfied) => {
                    record.record_satisfaction(*satisfied);
                    if *satisfied { votes_yes += 1 } else { votes_no += 1 }
                }
                Event::NextDay => {
                    today = today + Days::new(1);
                    views_today = 0;
                    skips_today = 0;
                    continue;
                }
            }

            prop_assert!(record.current_streak <= record.best_streak);
            prop_assert!(record.best_streak >= best_before);
            prop_assert_eq!(record.total_viewed, views);
            prop_assert_eq!(record.total_skipped, skips);
            // Votes do not touch the daily counters, so a new day shows up
            // only after the next view or skip.
            if record.last_date == today {
                prop_assert_eq!(record.today_viewed, views_today);
                prop_assert_eq!(record.today_skipped, skips_today);
            } else {
                prop_assert!(matches!(event, Event::Vote(_)));
            }
            prop_assert_eq!(record.satisfied_count, votes_yes);
            prop_assert_eq!(record.unsatisfied_count, votes_no);
        }
    }
}

// **Property 2: Rollover keeps lifetime fields**
//
// *For any* record and any later day, rolling over SHALL zero only the
// daily counters and move the date.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn rollover_keeps_lifetime_fields(record in arb_record(), gap in 1u64..400) {
        let later = record.last_date + Days::new(gap);
        let mut rolled = record.clone();
        prop_assert!(rolled.roll_over(later));
        prop_assert_eq!(rolled.today_viewed, 0);
        prop_assert_eq!(rolled.today_skipped, 0);
        prop_assert_eq!(rolled.last_date, later);
        prop_assert_eq!(rolled.total_viewed, record.total_viewed);
        prop_assert_eq!(rolled.total_skipped, record.total_skipped);
        prop_assert_eq!(rolled.current_streak, record.current_streak);
        prop_assert_eq!(rolled.best_streak, record.best_streak);
        prop_assert_eq!(rolled.satisfied_count, record.satisfied_count);
        prop_assert_eq!(rolled.unsatisfied_count, record.unsatisfied_count);
    }
}

// **Property 3: The store returns the last record written**
//
// *For any* sequence of records written through the store, a following
// get SHALL return the last one unchanged.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn store_returns_last_write(records in proptest::collection::vec(arb_record(), 1..5)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to build runtime");

        let last = records.last().cloned();
        let response = runtime.block_on(async move {
            let store = StatsStore::new(MemoryStorage::new(), "stats");
            for record in records {
                let ack = store.handle(StatsRequest::Set { record }).await;
                assert_eq!(ack, StatsResponse::ack(true));
            }
            store.handle(StatsRequest::Get).await
        });

        prop_assert_eq!(response, StatsResponse::record(last));
    }
}
