//! End-to-end exercises of the full economy through [`MojoCore`].

use std::sync::Arc;

use chrono::NaiveDate;
use mojo_sdk::{
    FixedClock, GroupId, InMemoryGroups, InMemoryProfiles, Mojo, MojoCore, QuestState, QuestType,
    RecordingSink, SpeculationState, UserId, WagerOutcome, ALLIANCE_BONUS_MOJO, BASE_LOG_MOJO,
    WEEKLY_BONUS_MOJO,
};

struct Harness {
    core: MojoCore<FixedClock>,
    clock: Arc<FixedClock>,
    groups: Arc<InMemoryGroups>,
    sink: Arc<RecordingSink>,
}

/// Fresh core pinned to Monday 2026-08-24
fn harness() -> Harness {
    let clock = Arc::new(FixedClock::new(
        NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
    ));
    let groups = Arc::new(InMemoryGroups::new());
    let sink = Arc::new(RecordingSink::new());
    let core = MojoCore::new(
        groups.clone(),
        Arc::new(InMemoryProfiles::new()),
        sink.clone(),
        clock.clone(),
    );
    Harness {
        core,
        clock,
        groups,
        sink,
    }
}

#[tokio::test]
async fn test_goal_week_funds_a_rank_upgrade() {
    let h = harness();
    let user = UserId::new();

    h.core.select_goal(&user, 2).await.unwrap();
    let first = h.core.log_goal_completion(&user).await.unwrap();
    assert!(!first.outcome.weekly_goal_met);

    h.clock.advance_days(1);
    let second = h.core.log_goal_completion(&user).await.unwrap();
    assert!(second.outcome.weekly_goal_met);

    let stats = h.core.get_or_create_statistics(&user).await;
    assert_eq!(stats.mojo.value(), 2.0 * BASE_LOG_MOJO + WEEKLY_BONUS_MOJO);
    assert_eq!(stats.credibility, 55);
    assert_eq!(stats.lifetime_goals_logged, 2);

    // Top up to Striver requirements (60 credibility, 50 mojo) and buy in
    h.core.ledger().apply_delta(&user, 5, 20.0).await.unwrap();
    let upgraded = h.core.upgrade_rank(&user, 2).await.unwrap();
    assert_eq!(upgraded.rank_id, 2);
    assert_eq!(upgraded.mojo.value(), 0.0);

    let rank_notes: Vec<_> = h
        .sink
        .sent_to(&user)
        .await
        .into_iter()
        .filter(|n| n.title.starts_with("Rank up"))
        .collect();
    assert_eq!(rank_notes.len(), 1);
    assert_eq!(rank_notes[0].mojo_change, -50.0);
}

#[tokio::test]
async fn test_same_day_double_log_rejected_but_week_rolls_over() {
    let h = harness();
    let user = UserId::new();

    h.core.select_goal(&user, 2).await.unwrap();
    h.core.log_goal_completion(&user).await.unwrap();
    assert!(h.core.log_goal_completion(&user).await.is_err());

    // Next Monday: progress resets, logging works again
    h.clock.advance_days(7);
    let goal = h.core.current_goal(&user).await.unwrap();
    assert_eq!(goal.current_progress, 0);
    let report = h.core.log_goal_completion(&user).await.unwrap();
    assert_eq!(report.outcome.progress, 1);
}

#[tokio::test]
async fn test_alliance_bonus_pays_both_once_per_week() {
    let h = harness();
    let group = GroupId::new();
    let a = UserId::new();
    let b = UserId::new();

    h.core.select_goal(&a, 2).await.unwrap();
    h.core.select_goal(&b, 2).await.unwrap();

    let quest = h
        .core
        .request_quest(&group, &a, &b, QuestType::Alliance, Mojo::zero())
        .await
        .unwrap();
    h.core.respond_to_quest(&quest.id, &b, true).await.unwrap();

    for week in 0..2 {
        if week > 0 {
            h.clock.advance_days(6);
        }
        // a finishes first; the bonus lands when b closes the week
        let a_done = {
            h.core.log_goal_completion(&a).await.unwrap();
            h.core.log_goal_completion(&b).await.unwrap();
            h.clock.advance_days(1);
            h.core.log_goal_completion(&a).await.unwrap()
        };
        assert!(a_done.outcome.weekly_goal_met);
        assert!(a_done.alliance_bonuses.is_empty());

        let b_done = h.core.log_goal_completion(&b).await.unwrap();
        assert_eq!(b_done.alliance_bonuses.len(), 1);
        assert_eq!(b_done.alliance_bonuses[0].partner, a);
    }

    // Two full weeks: 2 logs + weekly bonus + alliance bonus each week
    let per_week = 2.0 * BASE_LOG_MOJO + WEEKLY_BONUS_MOJO + ALLIANCE_BONUS_MOJO;
    for user in [&a, &b] {
        let stats = h.core.get_or_create_statistics(user).await;
        assert_eq!(stats.mojo.value(), 2.0 * per_week);
        let alliance_notes = h
            .sink
            .sent_to(user)
            .await
            .into_iter()
            .filter(|n| n.source_quest.as_ref() == Some(&quest.id))
            .count();
        // request/response notes plus one bonus note per week
        assert!(alliance_notes >= 2);
    }
}

#[tokio::test]
async fn test_prophecy_wager_full_lifecycle() {
    let h = harness();
    let group = GroupId::new();
    let sender = UserId::new();
    let receiver = UserId::new();

    h.core
        .ledger()
        .credit(&sender, Mojo::new(100.0))
        .await
        .unwrap();

    // Receiver at default credibility 50 gives prophecy odds of 2.0
    let quest = h
        .core
        .request_quest(&group, &sender, &receiver, QuestType::Prophecy, Mojo::new(10.0))
        .await
        .unwrap();
    assert_eq!(h.core.ledger().available(&sender).await.value(), 90.0);

    let received = h.sink.sent_to(&receiver).await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].source_quest, Some(quest.id.clone()));

    h.core
        .respond_to_quest(&quest.id, &receiver, true)
        .await
        .unwrap();
    assert_eq!(
        h.core.get_or_create_statistics(&sender).await.mojo.value(),
        90.0
    );

    let resolved = h
        .core
        .resolve_quest(&quest.id, WagerOutcome::Won)
        .await
        .unwrap();
    match resolved.state {
        QuestState::Resolved { payout, .. } => assert_eq!(payout.value(), 30.0),
        other => panic!("expected resolved state, got {:?}", other),
    }
    assert_eq!(
        h.core.get_or_create_statistics(&sender).await.mojo.value(),
        120.0
    );
    // Receiver's balance never moves
    assert_eq!(
        h.core.get_or_create_statistics(&receiver).await.mojo.value(),
        0.0
    );
}

#[tokio::test]
async fn test_rejected_wager_releases_the_stake() {
    let h = harness();
    let group = GroupId::new();
    let sender = UserId::new();
    let receiver = UserId::new();

    h.core
        .ledger()
        .credit(&sender, Mojo::new(50.0))
        .await
        .unwrap();
    let quest = h
        .core
        .request_quest(&group, &sender, &receiver, QuestType::Curse, Mojo::new(20.0))
        .await
        .unwrap();
    assert_eq!(h.core.ledger().available(&sender).await.value(), 30.0);

    h.core
        .respond_to_quest(&quest.id, &receiver, false)
        .await
        .unwrap();
    assert_eq!(h.core.ledger().available(&sender).await.value(), 50.0);
    assert_eq!(
        h.core.get_or_create_statistics(&sender).await.mojo.value(),
        50.0
    );
}

#[tokio::test]
async fn test_duplicate_open_quest_rejected() {
    let h = harness();
    let group = GroupId::new();
    let a = UserId::new();
    let b = UserId::new();

    h.core
        .request_quest(&group, &a, &b, QuestType::Alliance, Mojo::zero())
        .await
        .unwrap();
    let err = h
        .core
        .request_quest(&group, &a, &b, QuestType::Alliance, Mojo::zero())
        .await
        .unwrap_err();
    assert!(matches!(err, mojo_sdk::MojoError::DuplicateQuest { .. }));

    // The reverse direction is a distinct tuple and goes through
    h.core
        .request_quest(&group, &b, &a, QuestType::Alliance, Mojo::zero())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_credibility_slide_demotes_through_the_warning_band() {
    let h = harness();
    let user = UserId::new();

    // Reach Striver (60 credibility, 50 mojo)
    h.core.ledger().apply_delta(&user, 10, 50.0).await.unwrap();
    h.core.upgrade_rank(&user, 2).await.unwrap();

    // Slide to the floor (50): in warning, still rank 2
    h.core.ledger().apply_delta(&user, -10, 0.0).await.unwrap();
    assert!(h.core.in_rank_warning(&user).await);
    assert_eq!(h.core.get_or_create_statistics(&user).await.rank_id, 2);

    // One more point: demoted, out of the band
    let outcome = h.core.ledger().apply_delta(&user, -1, 0.0).await.unwrap();
    assert!(outcome.demotion.is_some());
    assert_eq!(outcome.statistics.rank_id, 1);
    assert!(!h.core.in_rank_warning(&user).await);
}

#[tokio::test]
async fn test_speculation_conserves_total_mojo() {
    let h = harness();
    let group = GroupId::new();
    let creator = UserId::new();
    let accepter = UserId::new();
    let resolver = UserId::new();
    for user in [&creator, &accepter, &resolver] {
        h.groups.add_member(&group, user).await;
    }
    h.core
        .ledger()
        .credit(&creator, Mojo::new(50.0))
        .await
        .unwrap();
    h.core
        .ledger()
        .credit(&accepter, Mojo::new(50.0))
        .await
        .unwrap();

    let spec = h
        .core
        .create_speculation(&group, &creator, "it rains on Saturday", true, 1.0, Mojo::new(10.0))
        .await
        .unwrap();
    h.core
        .accept_speculation(&spec.id, &accepter)
        .await
        .unwrap();

    let resolved = h
        .core
        .resolve_speculation(&spec.id, &resolver, true)
        .await
        .unwrap();
    match &resolved.state {
        SpeculationState::Resolved { winner, payout, .. } => {
            assert_eq!(winner, &creator);
            assert_eq!(payout.value(), 20.0);
        }
        other => panic!("expected resolved state, got {:?}", other),
    }

    let creator_mojo = h.core.get_or_create_statistics(&creator).await.mojo;
    let accepter_mojo = h.core.get_or_create_statistics(&accepter).await.mojo;
    assert_eq!(creator_mojo.value(), 60.0);
    assert_eq!(accepter_mojo.value(), 40.0);
    assert_eq!((creator_mojo + accepter_mojo).value(), 100.0);

    let winner_notes = h.sink.sent_to(&creator).await;
    assert!(winner_notes.iter().any(|n| n.title.contains("won")));
}
