use super::*;
use shared::domain::TeamColor;

use crate::session::SessionIdentity;

fn colors() -> Vec<Category> {
    let mut colors = vec![Category::Neutral; 25];
    colors[0] = Category::Assassin;
    for slot in colors.iter_mut().skip(1).take(9) {
        *slot = Category::Red;
    }
    for slot in colors.iter_mut().skip(10).take(8) {
        *slot = Category::Blue;
    }
    colors
}

fn start_payload(with_colors: bool) -> GameStart {
    GameStart {
        board: (0..25).map(|i| format!("word{i}")).collect(),
        revealed: vec![false; 25],
        clue_giver: "giver".into(),
        team_color: TeamColor::Red,
        score: 0,
        hard_mode: false,
        colors: with_colors.then(colors),
        clue: None,
        guesses_remaining: 0,
    }
}

fn guesser() -> GameSession {
    let mut session = GameSession::new(SessionIdentity::new("guesser", "abc123"));
    session
        .apply(ServerEvent::StartGame(start_payload(false)))
        .expect("start");
    session
}

fn clue_giver() -> GameSession {
    let mut session = GameSession::new(SessionIdentity::new("giver", "abc123"));
    session
        .apply(ServerEvent::StartGame(start_payload(true)))
        .expect("start");
    session
}

fn clue(guesses_remaining: i64) -> ServerEvent {
    ServerEvent::ClueGiven {
        clue: "ocean".into(),
        guesses_remaining,
    }
}

fn resolved(index: usize, color: Category, score: i64, guesses_remaining: i64) -> CellResolution {
    CellResolution {
        index: CellIndex(index),
        color,
        score,
        guesses_remaining,
        lose: false,
        lose_msg: None,
        win: false,
        wins_awarded: None,
        flag: None,
    }
}

fn update(resolution: CellResolution) -> ServerEvent {
    ServerEvent::CellResolved(resolution)
}

#[test]
fn identity_code_is_normalised() {
    let identity = SessionIdentity::new("alice", " abc123 ");
    assert_eq!(identity.code, "ABC123");
}

#[test]
fn start_game_assigns_role_from_clue_giver_name() {
    let session = guesser();
    assert_eq!(session.role(), Some(Role::Guesser));
    assert_eq!(session.phase(), Phase::CluePhase);
    assert!(session.board().cells().iter().all(|c| c.category().is_none()));

    let session = clue_giver();
    assert_eq!(session.role(), Some(Role::ClueGiver));
    assert_eq!(session.phase(), Phase::CluePhase);
    assert!(session.clue_entry_enabled());
    assert_eq!(
        session.board().get(CellIndex(0)).expect("cell").category(),
        Some(Category::Assassin)
    );
}

#[test]
fn guesser_drops_color_map_even_if_sent() {
    let mut session = GameSession::new(SessionIdentity::new("guesser", "abc123"));
    session
        .apply(ServerEvent::StartGame(start_payload(true)))
        .expect("start");
    assert!(session.board().cells().iter().all(|c| c.category().is_none()));
}

#[test]
fn start_game_resumes_active_clue() {
    let mut payload = start_payload(false);
    payload.clue = Some("river".into());
    payload.guesses_remaining = 2;
    payload.revealed[4] = true;

    let mut session = GameSession::new(SessionIdentity::new("guesser", "abc123"));
    session.apply(ServerEvent::StartGame(payload)).expect("start");

    assert_eq!(session.phase(), Phase::GuessPhase);
    let state = session.state().expect("state");
    assert_eq!(
        state.active_clue,
        Some(Clue {
            word: "river".into(),
            number: 2
        })
    );
    assert!(session.board().get(CellIndex(4)).expect("cell").is_revealed());
}

#[test]
fn start_game_with_malformed_board_is_rejected() {
    let mut payload = start_payload(false);
    payload.revealed.pop();
    let mut session = GameSession::new(SessionIdentity::new("guesser", "abc123"));
    let err = session
        .apply(ServerEvent::StartGame(payload))
        .expect_err("shape mismatch");
    assert!(matches!(err, EventRejected::Board(BoardError::RevealedShape { .. })));
    assert_eq!(session.phase(), Phase::Waiting);
    assert!(session.state().is_none());
}

#[test]
fn second_start_game_is_ignored() {
    let mut session = guesser();
    let err = session
        .apply(ServerEvent::StartGame(start_payload(false)))
        .expect_err("already started");
    assert_eq!(
        err,
        EventRejected::UnexpectedPhase {
            event: "start_game",
            phase: Phase::CluePhase
        }
    );
}

#[test]
fn events_before_start_are_ignored() {
    let mut session = GameSession::new(SessionIdentity::new("guesser", "abc123"));
    assert!(session.apply(clue(2)).is_err());
    assert!(session
        .apply(update(resolved(1, Category::Red, 1, 1)))
        .is_err());
    assert_eq!(session.phase(), Phase::Waiting);
}

#[test]
fn clue_given_enters_guess_phase() {
    let mut session = guesser();
    let effects = session.apply(clue(2)).expect("clue");
    assert_eq!(effects, vec![Effect::Render]);
    assert_eq!(session.phase(), Phase::GuessPhase);
    assert!(session.guessing_enabled());
    let state = session.state().expect("state");
    assert_eq!(state.guesses_remaining, 2);
    assert_eq!(
        state.active_clue,
        Some(Clue {
            word: "ocean".into(),
            number: 2
        })
    );
}

#[test]
fn clue_with_no_guesses_stays_in_clue_phase() {
    let mut session = clue_giver();
    session.apply(clue(0)).expect("clue");
    assert_eq!(session.phase(), Phase::CluePhase);
    assert_eq!(session.state().expect("state").active_clue, None);
    assert!(session.clue_entry_enabled());
}

#[test]
fn clue_during_guess_phase_is_ignored() {
    let mut session = guesser();
    session.apply(clue(2)).expect("clue");
    assert!(session.apply(clue(3)).is_err());
    assert_eq!(session.guesses_remaining(), 2);
}

#[test]
fn non_terminal_reveal_updates_score_and_guesses() {
    let mut session = guesser();
    session.apply(clue(2)).expect("clue");
    session
        .apply(update(resolved(3, Category::Red, 1, 1)))
        .expect("update");

    assert_eq!(session.phase(), Phase::GuessPhase);
    let state = session.state().expect("state");
    assert_eq!(state.score, 1);
    assert_eq!(state.guesses_remaining, 1);
    let cell = session.board().get(CellIndex(3)).expect("cell");
    assert!(cell.is_revealed());
    assert_eq!(cell.category(), Some(Category::Red));
}

#[test]
fn exhausting_guesses_returns_to_clue_phase() {
    let mut session = clue_giver();
    session.apply(clue(1)).expect("clue");
    assert!(!session.clue_entry_enabled());

    session
        .apply(update(resolved(12, Category::Blue, -1, 0)))
        .expect("update");
    assert_eq!(session.phase(), Phase::CluePhase);
    assert_eq!(session.state().expect("state").active_clue, None);
    assert!(session.clue_entry_enabled());
}

#[test]
fn negative_guess_count_is_clamped() {
    let mut session = guesser();
    session.apply(clue(1)).expect("clue");
    session
        .apply(update(resolved(20, Category::Neutral, 0, -3)))
        .expect("update");
    assert_eq!(session.guesses_remaining(), 0);
    assert_eq!(session.phase(), Phase::CluePhase);
}

#[test]
fn duplicate_reveal_is_idempotent() {
    let mut session = guesser();
    session.apply(clue(3)).expect("clue");
    let event = update(resolved(5, Category::Red, 1, 2));
    session.apply(event.clone()).expect("first");
    let after_first = (session.state().cloned(), session.board().clone(), session.phase());

    let err = session.apply(event).expect_err("duplicate");
    assert_eq!(err, EventRejected::AlreadyRevealed(CellIndex(5)));
    let after_second = (session.state().cloned(), session.board().clone(), session.phase());
    assert_eq!(after_first, after_second);
}

#[test]
fn out_of_range_reveal_is_rejected() {
    let mut session = guesser();
    session.apply(clue(1)).expect("clue");
    let err = session
        .apply(update(resolved(25, Category::Red, 1, 0)))
        .expect_err("out of range");
    assert_eq!(
        err,
        EventRejected::Board(BoardError::OutOfRange {
            index: CellIndex(25),
            len: 25
        })
    );
    assert_eq!(session.phase(), Phase::GuessPhase);
}

#[test]
fn lose_takes_precedence_over_exhaustion() {
    let mut session = guesser();
    session.apply(clue(1)).expect("clue");
    let mut resolution = resolved(0, Category::Assassin, 0, 0);
    resolution.lose = true;

    let effects = session.apply(update(resolution)).expect("update");
    assert_eq!(session.phase(), Phase::Lost);
    assert_eq!(
        effects,
        vec![
            Effect::Render,
            Effect::Terminal(TerminalNotice::Lost {
                message: "Sorry, you lost!".into()
            })
        ]
    );
}

#[test]
fn standard_win_defaults_to_single_award() {
    let mut session = guesser();
    session.apply(clue(1)).expect("clue");
    let mut resolution = resolved(9, Category::Red, 9, 0);
    resolution.win = true;

    let effects = session.apply(update(resolution)).expect("update");
    assert_eq!(session.phase(), Phase::Won);
    assert_eq!(
        effects[1],
        Effect::Terminal(TerminalNotice::Won {
            message: "Congratulations! You won!".into(),
            wins_awarded: 1,
            hard_mode_double: false,
            secret: None,
        })
    );
}

#[test]
fn terminal_phase_absorbs_further_events() {
    let mut session = guesser();
    session.apply(clue(2)).expect("clue");
    let mut resolution = resolved(9, Category::Red, 9, 1);
    resolution.win = true;
    session.apply(update(resolution)).expect("win");

    let snapshot = (session.state().cloned(), session.board().clone());
    assert_eq!(
        session.apply(update(resolved(10, Category::Blue, 8, 0))),
        Err(EventRejected::Finished(Phase::Won))
    );
    assert_eq!(
        session.apply(clue(4)),
        Err(EventRejected::Finished(Phase::Won))
    );
    assert_eq!(snapshot, (session.state().cloned(), session.board().clone()));
    assert_eq!(session.phase(), Phase::Won);
}

#[test]
fn clue_giver_reveal_marks_emphasis_and_keeps_category() {
    let mut session = clue_giver();
    session.apply(clue(2)).expect("clue");
    session
        .apply(update(resolved(1, Category::Red, 1, 1)))
        .expect("update");

    let view = session.view();
    assert!(view.cells[1].emphasis);
    assert_eq!(view.cells[1].category, Some(Category::Red));
    assert!(!view.cells[2].emphasis);
    assert_eq!(view.cells[2].category, Some(Category::Red));
}

#[test]
fn phase_never_moves_backwards_past_terminal() {
    assert!(Phase::Waiting.can_advance_to(Phase::CluePhase));
    assert!(Phase::GuessPhase.can_advance_to(Phase::CluePhase));
    assert!(Phase::GuessPhase.can_advance_to(Phase::Lost));
    assert!(!Phase::CluePhase.can_advance_to(Phase::Waiting));
    assert!(!Phase::Won.can_advance_to(Phase::CluePhase));
}
