use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chess_rules::{Color, Game};

/// Play random legal games and report how they end.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: u32,

    /// Stop a game after this many plies
    #[arg(long, default_value_t = 300)]
    max_plies: u32,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final snapshot of each game as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Default)]
struct Tally {
    white_wins: u32,
    black_wins: u32,
    stalemates: u32,
    unfinished: u32,
}

fn play_game(rng: &mut StdRng, max_plies: u32) -> (Game, u32) {
    let mut game = Game::new();
    let mut plies = 0;

    while !game.is_over() && plies < max_plies {
        let moves = game.legal_moves();
        let Some(&mv) = moves.get_index(rng.gen_range(0..moves.len())) else {
            break;
        };
        let start = (mv.start.0 as i32, mv.start.1 as i32);
        let end = (mv.end.0 as i32, mv.end.1 as i32);
        if !game.attempt_move(start, end) {
            warn!(%mv, "listed move was rejected");
            break;
        }
        plies += 1;
    }

    (game, plies)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);
    info!(seed, games = args.games, max_plies = args.max_plies, "starting self-play");

    let mut tally = Tally::default();
    for n in 1..=args.games {
        let (game, plies) = play_game(&mut rng, args.max_plies);

        let outcome = if game.in_checkmate() {
            match game.side_to_move() {
                Color::White => {
                    tally.black_wins += 1;
                    "Black wins"
                }
                Color::Black => {
                    tally.white_wins += 1;
                    "White wins"
                }
            }
        } else if game.in_stalemate() {
            tally.stalemates += 1;
            "Stalemate"
        } else {
            tally.unfinished += 1;
            "Unfinished"
        };
        println!("Game {n}: {outcome} after {plies} plies");

        if args.json {
            match game.snapshot().to_json() {
                Ok(json) => println!("{json}"),
                Err(err) => warn!(%err, "could not serialize snapshot"),
            }
        } else {
            print!("{}", game.board());
        }
    }

    println!(
        "White {} / Black {} / Stalemate {} / Unfinished {} (seed {seed})",
        tally.white_wins, tally.black_wins, tally.stalemates, tally.unfinished
    );
}
