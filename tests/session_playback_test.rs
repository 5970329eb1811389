use chain_reaction::core::DetonationWave;
use chain_reaction::engine::{replay, Phase, Session};
use chain_reaction::types::{Position, WAVE_DELAY_MS};

/// Red builds a loaded corner while Blue plays along the far edge; Red's
/// last move sets off three waves.
fn loaded_corner_session() -> (Session, Vec<DetonationWave>) {
    let mut session = Session::with_players(2).unwrap();
    let moves = [
        (0, 0),
        (8, 5),
        (0, 1),
        (8, 4),
        (0, 1),
        (8, 3),
        (1, 0),
        (7, 5),
        (1, 0),
        (6, 5),
    ];
    for (r, c) in moves {
        let accepted = session.submit(Position::new(r, c)).unwrap();
        assert!(accepted.waves.is_empty());
    }
    let accepted = session.submit(Position::new(0, 0)).unwrap();
    (session, accepted.waves)
}

#[test]
fn waves_play_back_one_per_delay() {
    let (mut session, waves) = loaded_corner_session();
    assert_eq!(waves.len(), 3);
    assert_eq!(session.phase(), Phase::Resolving);
    assert_eq!(session.display_board().total_units(), 11);

    session.tick(WAVE_DELAY_MS - 1);
    assert_eq!(session.playback().unwrap().waves_shown(), 0);

    session.tick(1);
    let playback = session.playback().unwrap();
    assert_eq!(playback.waves_shown(), 1);
    assert_eq!(playback.last_wave(), Some(&waves[0]));

    session.tick(WAVE_DELAY_MS);
    assert_eq!(
        session.playback().unwrap().last_wave().unwrap().origins,
        vec![Position::new(0, 1), Position::new(1, 0)]
    );

    session.tick(WAVE_DELAY_MS);
    assert_eq!(session.phase(), Phase::InProgress);
    assert!(!session.state().is_animating());
    assert_eq!(session.display_board(), session.state().board());
    assert_eq!(session.state().board().total_units(), 11);
}

#[test]
fn skipping_playback_lands_on_the_resolved_board() {
    let (mut session, _) = loaded_corner_session();
    let resolved = session.state().board().clone();

    session.finish_playback();
    assert_eq!(session.phase(), Phase::InProgress);
    assert_eq!(session.display_board(), &resolved);
    session.submit(Position::new(5, 5)).unwrap();
}

#[test]
fn history_replays_to_the_same_state() {
    let (mut session, _) = loaded_corner_session();
    session.finish_playback();

    let players = session.state().players().to_vec();
    let rebuilt = replay(players, session.history()).unwrap();
    assert_eq!(rebuilt.board(), session.state().board());
    assert_eq!(rebuilt.state_hash(), session.state().state_hash());
    assert_eq!(rebuilt.move_count(), 11);
}
