use partydeck_game::{
    BundledContent, GameMode, MemoryRosterStore, PartyEngine, PartySession, Player, PlayerId,
    ProgressKind, SessionConfig, SessionError, SessionPhase, TurnStrategy, catalog::catalog,
    redistribute,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn roster(points: &[u64]) -> Vec<Player> {
    points
        .iter()
        .enumerate()
        .map(|(idx, pts)| {
            let mut player = Player::new(PlayerId(idx as u64), format!("P{idx}"));
            player.points = *pts;
            player
        })
        .collect()
}

#[tokio::test]
async fn two_player_session_ends_when_threshold_reached() {
    let mut session = PartySession::new(MemoryRosterStore::new(), 1);
    session
        .start_new_round(SessionConfig::for_mode(GameMode::CardDeck).with_win_threshold(10))
        .unwrap();
    let a = session.add_player("A").await.unwrap();
    let _b = session.add_player("B").await.unwrap();

    let update = session
        .apply_points(a.id, 10, ProgressKind::Drink)
        .await
        .unwrap();
    assert_eq!(update.winner, Some(a.id));
    assert_eq!(session.phase(), SessionPhase::Completed { winner: a.id });
}

#[tokio::test]
async fn leaving_player_points_are_shared_in_roster_order() {
    let store = MemoryRosterStore::with_players(roster(&[9, 3, 0]));
    let mut session = PartySession::load(store.clone(), 2).await.unwrap();
    session.remove_player(PlayerId(0)).await.unwrap();

    let points: Vec<u64> = session.players().iter().map(|p| p.points).collect();
    assert_eq!(points, [7, 4]);
    assert_eq!(store.snapshot(), session.players());
}

#[test]
fn selecting_from_empty_roster_fails() {
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let config = SessionConfig::for_mode(GameMode::Wheel);
    let err = TurnStrategy::for_mode(GameMode::Wheel)
        .select_turn(&config, &[], catalog(), &mut rng)
        .unwrap_err();
    assert!(matches!(err, SessionError::EmptyRoster));
}

#[test]
fn redistribution_total_holds_for_random_rosters() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5EED);
    for _ in 0..500 {
        let size = rng.gen_range(1..8);
        let points: Vec<u64> = (0..size).map(|_| rng.gen_range(0..200)).collect();
        let players = roster(&points);
        let leaving = rng.gen_range(0..size);
        let removed = players[leaving].clone();
        let remaining: Vec<Player> = players
            .iter()
            .filter(|p| p.id != removed.id)
            .cloned()
            .collect();

        let before: u64 = remaining.iter().map(|p| p.points).sum();
        let added: u64 = redistribute(&removed, &remaining)
            .iter()
            .map(|d| d.delta)
            .sum();
        let expected = if remaining.is_empty() {
            0
        } else {
            let count = remaining.len() as u64;
            (removed.points / count) * count
        };
        assert_eq!(before + added, before + expected);
    }
}

#[tokio::test]
async fn seeded_sessions_complete_exactly_once_in_every_mode() {
    for mode in GameMode::ALL {
        let engine = PartyEngine::new(BundledContent);
        let mut session = engine
            .create_session(MemoryRosterStore::new(), 0xC0FFEE, mode)
            .unwrap();
        for name in ["Ana", "Bo", "Cy", "Dee"] {
            session.add_player(name).await.unwrap();
        }

        let mut completions = 0;
        let mut turns = 0;
        while !session.phase().is_completed() {
            session.next_turn().unwrap();
            let update = session.resolve_turn(ProgressKind::Drink).await.unwrap();
            if update.winner.is_some() {
                completions += 1;
            }
            turns += 1;
            assert!(turns < 1_000, "{mode} never completed");
        }
        assert_eq!(completions, 1);

        let winner = session.phase().winner().unwrap();
        let threshold = session.config().unwrap().win_threshold;
        let first_qualifier = session
            .players()
            .iter()
            .find(|p| p.points >= threshold)
            .unwrap();
        assert_eq!(first_qualifier.id, winner);
        assert!(matches!(
            session.next_turn(),
            Err(SessionError::SessionCompleted { .. })
        ));
    }
}

#[tokio::test]
async fn snapshot_serializes_for_the_ui() {
    let engine = PartyEngine::new(BundledContent);
    let mut session = engine
        .create_session(MemoryRosterStore::new(), 5, GameMode::TruthOrDare)
        .unwrap();
    session.add_player("Ana").await.unwrap();
    session.add_player("Bo").await.unwrap();
    session.next_turn().unwrap();

    let value = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(value["phase"]["phase"], "playing");
    assert_eq!(value["config"]["mode"], "truth_or_dare");
    assert_eq!(value["players"].as_array().unwrap().len(), 2);
    assert!(value["active_turn"]["prompt"]["text"].is_string());
}
