use std::time::Duration;

use tokio::time::sleep;
use xeyes::managers::redirect_guard::{RedirectGuard, RedirectGuardTrait};
use xeyes::types::navigation::NO_TAB;

fn guard() -> RedirectGuard {
    RedirectGuard::new(Duration::from_millis(1000))
}

#[tokio::test(start_paused = true)]
async fn test_mark_then_clear() {
    let guard = guard();
    assert!(!guard.should_suppress(4));
    guard.mark_redirecting(4);
    assert!(guard.should_suppress(4));
    guard.clear(4);
    assert!(!guard.should_suppress(4));
}

#[tokio::test(start_paused = true)]
async fn test_mark_is_idempotent() {
    let guard = guard();
    guard.mark_redirecting(4);
    guard.mark_redirecting(4);
    assert_eq!(guard.tracked_count(), 1);
    guard.clear(4);
    guard.clear(4);
    assert_eq!(guard.tracked_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_no_tab_is_never_tracked() {
    let guard = guard();
    assert!(guard.mark_redirecting(NO_TAB).is_none());
    assert!(!guard.should_suppress(NO_TAB));
    assert_eq!(guard.tracked_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_tabs_are_independent() {
    let guard = guard();
    guard.mark_redirecting(1);
    guard.mark_redirecting(2);
    guard.clear(1);
    assert!(!guard.should_suppress(1));
    assert!(guard.should_suppress(2));
}

#[tokio::test(start_paused = true)]
async fn test_safety_net_clears_after_delay() {
    let guard = guard();
    guard.mark_redirecting(9);
    assert!(guard.has_pending_timer(9));

    sleep(Duration::from_millis(900)).await;
    assert!(guard.should_suppress(9));

    sleep(Duration::from_millis(200)).await;
    tokio::task::yield_now().await;
    assert!(!guard.should_suppress(9));
}

#[tokio::test(start_paused = true)]
async fn test_stale_timer_does_not_clear_newer_redirect() {
    let guard = guard();
    guard.mark_redirecting(5);

    sleep(Duration::from_millis(600)).await;
    guard.clear(5);
    guard.mark_redirecting(5);

    // The first episode's timer would have fired at 1000ms.
    sleep(Duration::from_millis(500)).await;
    tokio::task::yield_now().await;
    assert!(guard.should_suppress(5));

    // The second episode's own safety net fires at 1600ms.
    sleep(Duration::from_millis(600)).await;
    tokio::task::yield_now().await;
    assert!(!guard.should_suppress(5));
}

#[tokio::test(start_paused = true)]
async fn test_clear_generation_ignores_stale_token() {
    let guard = guard();
    let first = guard.mark_redirecting(5).unwrap();
    let second = guard.mark_redirecting(5).unwrap();
    assert_ne!(first, second);

    assert!(!guard.clear_generation(5, first));
    assert!(guard.should_suppress(5));
    assert!(guard.clear_generation(5, second));
    assert!(!guard.should_suppress(5));
}

#[tokio::test(start_paused = true)]
async fn test_schedule_clear_replaces_safety_net() {
    let guard = guard();
    let generation = guard.mark_redirecting(3).unwrap();
    guard.schedule_clear(3, generation, Duration::from_millis(3000));

    sleep(Duration::from_millis(1500)).await;
    tokio::task::yield_now().await;
    assert!(guard.should_suppress(3));

    sleep(Duration::from_millis(1600)).await;
    tokio::task::yield_now().await;
    assert!(!guard.should_suppress(3));
}

#[tokio::test(start_paused = true)]
async fn test_explicit_clear_cancels_timer() {
    let guard = guard();
    let generation = guard.mark_redirecting(8).unwrap();
    guard.clear(8);
    assert!(!guard.has_pending_timer(8));
    // A schedule for a cleared episode is a no-op.
    guard.schedule_clear(8, generation, Duration::from_millis(10));
    assert_eq!(guard.tracked_count(), 0);
}
