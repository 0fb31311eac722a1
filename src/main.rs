//! Quarto-Rust: a Quarto player built on Monte Carlo tree search.
//!
//! ## Usage
//!
//! - `quarto-rust` / `quarto-rust play` - Play against the engine
//! - `quarto-rust selfplay` - Let the engine play against itself or a random player
//! - `quarto-rust replay <history>` - Validate and show a recorded game

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quarto_rust::ai::{Ai, AiController, RandomAi};
use quarto_rust::config::SearchConfig;
use quarto_rust::console::Session;
use quarto_rust::constants::{EXPLORATION_CONSTANT, ITERATIONS_PER_MOVE};
use quarto_rust::game::{GameState, Player};
use quarto_rust::notation::{encode_history, replay_history};

/// Quarto-Rust: a Quarto player built on Monte Carlo tree search
#[derive(Parser)]
#[command(name = "quarto-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Search iterations per move
    #[arg(long, global = true, default_value_t = ITERATIONS_PER_MOVE)]
    iterations: u32,

    /// Exploration constant of the UCB formula
    #[arg(long, global = true, default_value_t = EXPLORATION_CONSTANT)]
    exploration: f64,

    /// Seed for the random generator (default: from entropy)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log search statistics
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game against the engine on the console
    Play {
        /// Let the engine make the first move
        #[arg(long)]
        ai_first: bool,
    },
    /// Let the engine play complete games without human input
    Selfplay {
        /// Number of games to play
        #[arg(long, default_value_t = 1)]
        games: u32,
        /// Second player
        #[arg(long, value_enum, default_value_t = Opponent::Mcts)]
        opponent: Opponent,
    },
    /// Replay a recorded game history and show the final position
    Replay {
        /// Encoded move history (one base-34 digit per move)
        history: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Opponent {
    Mcts,
    Random,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "quarto_rust=debug" } else { "quarto_rust=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config = SearchConfig::default()
        .with_iterations(cli.iterations)
        .with_exploration(cli.exploration)
        .with_verbose(cli.verbose);
    let mut rng = cli.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

    match cli.command.unwrap_or(Commands::Play { ai_first: false }) {
        Commands::Play { ai_first } => play(config, rng, ai_first),
        Commands::Selfplay { games, opponent } => self_play(config, &mut rng, games, opponent),
        Commands::Replay { history } => replay(&history),
    }
}

fn play(config: SearchConfig, rng: fastrand::Rng, ai_first: bool) -> Result<()> {
    let human = if ai_first { Player::Second } else { Player::First };
    let ai = AiController::with_rng(GameState::new(), config, rng);
    let mut session = Session::new(ai, human);
    let stdin = std::io::stdin();
    session
        .run(stdin.lock(), &mut std::io::stdout())
        .context("console I/O failed")?;
    Ok(())
}

fn make_player(kind: Opponent, config: &SearchConfig, rng: fastrand::Rng) -> Box<dyn Ai> {
    match kind {
        Opponent::Mcts => Box::new(AiController::with_rng(GameState::new(), config.clone(), rng)),
        Opponent::Random => Box::new(RandomAi::new(GameState::new(), rng)),
    }
}

fn self_play(config: SearchConfig, rng: &mut fastrand::Rng, games: u32, opponent: Opponent) -> Result<()> {
    // Wins of the engine, wins of the opponent, ties.
    let mut tally = [0u32; 3];
    for game in 0..games {
        let engine = make_player(Opponent::Mcts, &config, fastrand::Rng::with_seed(rng.u64(..)));
        let other = make_player(opponent, &config, fastrand::Rng::with_seed(rng.u64(..)));
        // Alternate who moves first.
        let engine_seat = if game % 2 == 0 { Player::First } else { Player::Second };
        let mut players = if engine_seat == Player::First { [engine, other] } else { [other, engine] };

        let mut state = GameState::new();
        let mut history = Vec::new();
        while !state.over() {
            let mv = players[state.next_player().index()].calculate_move();
            ensure!(state.execute(mv), "{} produced an illegal move: {mv}", state.next_player());
            for (seat, player) in players.iter_mut().enumerate() {
                ensure!(player.execute(mv), "player in seat {} rejected {mv}", seat + 1);
            }
            history.push(mv);
        }

        let result = match state.winner() {
            Some(winner) if winner == engine_seat => {
                tally[0] += 1;
                format!("{winner} (engine) won")
            }
            Some(winner) => {
                tally[1] += 1;
                format!("{winner} won")
            }
            None => {
                tally[2] += 1;
                "tie".to_string()
            }
        };
        println!("game {}: {result} in {} moves: {}", game + 1, history.len(), encode_history(&history));
    }
    info!("engine won {}, lost {}, tied {}", tally[0], tally[1], tally[2]);
    Ok(())
}

fn replay(history: &str) -> Result<()> {
    let state = replay_history(history).with_context(|| format!("cannot replay {history:?}"))?;
    print!("{state}");
    match state.winner() {
        Some(winner) => println!("{winner} won."),
        None if state.over() => println!("It's a tie."),
        None => println!("Game in progress, {} to move.", state.next_player()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_play_keeps_players_in_sync() {
        let config = SearchConfig::for_testing().with_iterations(200);
        let mut rng = fastrand::Rng::with_seed(21);
        // Both seat orders; every player must accept every move played.
        assert!(self_play(config.clone(), &mut rng, 2, Opponent::Random).is_ok());
        assert!(self_play(config, &mut rng, 1, Opponent::Mcts).is_ok());
    }

    #[test]
    fn test_replay_rejects_bad_history() {
        assert!(replay("0g1").is_ok());
        assert!(replay("0g0").is_err());
    }
}
