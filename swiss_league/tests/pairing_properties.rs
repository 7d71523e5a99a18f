//! Property-based tests for pairing and standings.
//!
//! Random fields are played through full Swiss events with random results,
//! then every produced round is checked against the pairing guarantees.

use proptest::prelude::*;
use std::collections::HashMap;
use swiss_league::{
    pairing::{PairingEngine, PairingHistory, PairingRequest, SeedingSplit},
    registry::{Player, PlayerId, PlayerRegistry},
    round::{MatchId, MatchResult, RoundKind},
    standings::{ScoringPolicy, compute_standings},
    tournament::{Tournament, TournamentConfig, TournamentFormat},
};

fn split_strategy() -> impl Strategy<Value = SeedingSplit> {
    prop_oneof![Just(SeedingSplit::Slide), Just(SeedingSplit::Adjacent)]
}

// Field size, number of Swiss rounds (never more than the field allows
// without repeat byes), result stream and pairing split
fn event_strategy() -> impl Strategy<Value = (usize, u32, Vec<u8>, SeedingSplit)> {
    (2usize..=10)
        .prop_flat_map(|players| {
            let max_rounds = (players as u32).min(5);
            (
                Just(players),
                1..=max_rounds,
                prop::collection::vec(0u8..3, 1..40),
                split_strategy(),
            )
        })
}

fn play(players: usize, rounds: u32, outcomes: &[u8], seeding: SeedingSplit) -> Tournament {
    let registry = PlayerRegistry::new(
        (1..=players as PlayerId).map(|id| Player::new(id, format!("Player {id}"))),
    );
    let format = TournamentFormat {
        swiss_rounds: rounds,
        top_rounds: 0,
        rated: false,
        seeding,
    };
    let mut tournament = Tournament::new(1, TournamentConfig::new("Property", format));
    for id in 1..=players as PlayerId {
        tournament.register(id, &registry).unwrap();
    }
    tournament.start(&registry).unwrap();

    let mut results = outcomes.iter().cycle();
    loop {
        let number = tournament.current_round;
        let open: Vec<MatchId> = tournament
            .last_round()
            .unwrap()
            .matches
            .iter()
            .filter(|m| !m.is_decided())
            .map(|m| m.id)
            .collect();
        for id in open {
            let result = match results.next() {
                Some(0) => MatchResult::Win1,
                Some(1) => MatchResult::Win2,
                _ => MatchResult::Draw,
            };
            tournament.record_result(number, id, result.into()).unwrap();
        }

        if number == rounds {
            return tournament;
        }
        tournament.advance_round().unwrap();
    }
}

/// Exhaustive check for a perfect pairing without rematches
fn perfect_pairing_exists(players: &[PlayerId], history: &PairingHistory) -> bool {
    let Some((&first, rest)) = players.split_first() else {
        return true;
    };
    rest.iter().enumerate().any(|(i, &other)| {
        if history.have_met(first, other) {
            return false;
        }
        let mut remaining = rest.to_vec();
        remaining.remove(i);
        perfect_pairing_exists(&remaining, history)
    })
}

/// Whether any eligible bye choice leaves a rematch-free pairing
fn rematch_free_round_exists(players: &[PlayerId], history: &PairingHistory) -> bool {
    if players.len() % 2 == 0 {
        return perfect_pairing_exists(players, history);
    }
    let fewest = players.iter().map(|&p| history.byes(p)).min().unwrap_or(0);
    players
        .iter()
        .filter(|&&p| history.byes(p) == fewest)
        .any(|&bye| {
            let rest: Vec<_> = players.iter().copied().filter(|&p| p != bye).collect();
            perfect_pairing_exists(&rest, history)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_rematches_only_when_unavoidable(
        (players, rounds, outcomes, seeding) in event_strategy()
    ) {
        let tournament = play(players, rounds, &outcomes, seeding);

        for index in 1..tournament.rounds.len() {
            let history = PairingHistory::from_rounds(&tournament.rounds[..index]);
            let round = &tournament.rounds[index];

            let rematch = round
                .matches
                .iter()
                .filter_map(|m| m.player2.map(|p2| (m.player1, p2)))
                .any(|(a, b)| history.have_met(a, b));

            if rematch {
                let field: Vec<PlayerId> = round
                    .matches
                    .iter()
                    .flat_map(|m| [Some(m.player1), m.player2])
                    .flatten()
                    .collect();
                prop_assert!(
                    !rematch_free_round_exists(&field, &history),
                    "round {} repeats a pairing although a rematch-free one exists",
                    round.number
                );
            }
        }
    }

    #[test]
    fn test_at_most_one_bye_per_participant(
        (players, rounds, outcomes, seeding) in event_strategy()
    ) {
        let tournament = play(players, rounds, &outcomes, seeding);

        let mut byes: HashMap<PlayerId, u32> = HashMap::new();
        for round in tournament.swiss_rounds() {
            let in_round: Vec<_> = round.matches.iter().filter(|m| m.is_bye()).collect();
            prop_assert!(in_round.len() <= 1);
            for m in in_round {
                *byes.entry(m.player1).or_default() += 1;
            }
        }
        prop_assert!(byes.values().all(|&count| count == 1));
    }

    #[test]
    fn test_every_active_participant_paired_once(
        (players, rounds, outcomes, seeding) in event_strategy()
    ) {
        let tournament = play(players, rounds, &outcomes, seeding);

        for round in &tournament.rounds {
            let mut seen: Vec<PlayerId> = round
                .matches
                .iter()
                .flat_map(|m| [Some(m.player1), m.player2])
                .flatten()
                .collect();
            seen.sort_unstable();
            let expected: Vec<PlayerId> = (1..=players as PlayerId).collect();
            prop_assert_eq!(seen, expected);
        }
    }

    #[test]
    fn test_match_points_conserved(
        (players, rounds, outcomes, seeding) in event_strategy()
    ) {
        let tournament = play(players, rounds, &outcomes, seeding);
        let policy = ScoringPolicy::default();

        for round in &tournament.rounds {
            let awarded: u32 = round.matches.iter().map(|m| m.points1 + m.points2).sum();
            let expected: u32 = round
                .matches
                .iter()
                .map(|m| match (m.is_bye(), m.result) {
                    (true, _) => policy.bye_points,
                    (false, Some(MatchResult::Draw)) => 2 * policy.draw_points,
                    (false, Some(_)) => policy.win_points + policy.loss_points,
                    (false, None) => 0,
                })
                .sum();
            prop_assert_eq!(awarded, expected);
        }

        let standings = tournament.standings();
        let total: u32 = standings.iter().map(|s| s.match_points).sum();
        let per_round: u32 = tournament
            .rounds
            .iter()
            .flat_map(|r| &r.matches)
            .map(|m| m.points1 + m.points2)
            .sum();
        prop_assert_eq!(total, per_round);
    }

    #[test]
    fn test_pairing_and_standings_deterministic(
        (players, rounds, outcomes, seeding) in event_strategy()
    ) {
        let tournament = play(players, rounds, &outcomes, seeding);
        let policy = ScoringPolicy::default();
        let active = tournament.active_participants();

        let request = PairingRequest {
            participants: &active,
            history: &tournament.rounds,
            round_number: tournament.current_round + 1,
            policy: &policy,
        };
        let engine = PairingEngine::swiss(seeding);
        let first = engine.pair(&request).unwrap();
        let second = engine.pair(&request).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.kind, RoundKind::Swiss);

        prop_assert_eq!(
            compute_standings(&tournament.participants, &tournament.rounds, &policy),
            compute_standings(&tournament.participants, &tournament.rounds, &policy)
        );
    }
}
