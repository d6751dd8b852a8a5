//! Selfplay command - AI against AI over many seeded boards
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use hexahunt_core::{Action, GameResult, Match, MatchConfig, Player};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct SelfplayArgs {
    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Board radius
    #[arg(long, default_value = "2")]
    pub radius: i32,

    /// AI search depth for both seats
    #[arg(long, default_value = "3")]
    pub depth: i32,

    /// Flush each AI's transposition table beyond this many entries
    #[arg(long)]
    pub table_capacity: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    seed: u64,
    result: GameResult,
    score: [i32; 2],
    moves: usize,
    artifacts_used: usize,
    positions_evaluated: u64,
    cache_hits: u64,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    red_wins: usize,
    blue_wins: usize,
    ties: usize,
    avg_margin: f32,
    hit_rate: f64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: SelfplayArgs, seed: Option<u64>) -> Result<()> {
    let base = MatchConfig::new(args.radius, args.depth);
    base.validate().context("Invalid selfplay settings")?;

    tracing::info!(
        "Starting selfplay: {} games, radius={}, depth={}",
        args.games,
        args.radius,
        args.depth
    );

    let start = Instant::now();
    let results = play_match(&args, seed)?;
    tracing::info!("Selfplay finished in {:.2?}", start.elapsed());

    report_results(&results, &args);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games, one board seed per game, in parallel
fn play_match(args: &SelfplayArgs, seed: Option<u64>) -> Result<MatchResults> {
    let mut rng = create_rng(seed);
    let seeds: Vec<u64> = (0..args.games).map(|_| rng.gen()).collect();

    let games = seeds
        .par_iter()
        .enumerate()
        .map(|(i, &game_seed)| play_single_game(args, i + 1, game_seed))
        .collect::<Result<Vec<_>>>()?;

    for record in &games {
        tracing::info!(
            "Game {}: {:?} ({}-{}, {} moves)",
            record.game_number,
            record.result,
            record.score[0],
            record.score[1],
            record.moves
        );
    }

    Ok(compute_match_statistics(games))
}

fn report_results(results: &MatchResults, args: &SelfplayArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_game(args: &SelfplayArgs, game_number: usize, seed: u64) -> Result<GameRecord> {
    let mut config = MatchConfig::new(args.radius, args.depth).with_seed(seed);
    config.table_capacity = args.table_capacity;

    let mut game = Match::new(&config)?;
    let mut positions_evaluated = 0;
    let mut cache_hits = 0;

    while !game.is_over() {
        let turn = game.commit_ai()?;
        if let Some(search) = turn.search {
            positions_evaluated += search.stats.positions_evaluated;
            cache_hits += search.stats.cache_hits;
        }
    }

    let history = game.history();
    Ok(GameRecord {
        game_number,
        seed,
        result: game.result(),
        score: game.state().score(),
        moves: history.iter().filter(|a| matches!(a, Action::Move { .. })).count(),
        artifacts_used: history.iter().filter(|a| !matches!(a, Action::Move { .. })).count(),
        positions_evaluated,
        cache_hits,
    })
}

fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let count = |outcome: GameResult| games.iter().filter(|g| g.result == outcome).count();
    let red_wins = count(GameResult::Win(Player::Red));
    let blue_wins = count(GameResult::Win(Player::Blue));
    let ties = count(GameResult::Tie);

    let total_margin: i32 = games.iter().map(|g| g.score[1] - g.score[0]).sum();
    let avg_margin = if games.is_empty() {
        0.0
    } else {
        total_margin as f32 / games.len() as f32
    };

    let evaluated: u64 = games.iter().map(|g| g.positions_evaluated).sum();
    let hits: u64 = games.iter().map(|g| g.cache_hits).sum();
    let hit_rate = if evaluated + hits == 0 {
        0.0
    } else {
        hits as f64 / (evaluated + hits) as f64 * 100.0
    };

    MatchResults {
        games,
        red_wins,
        blue_wins,
        ties,
        avg_margin,
        hit_rate,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(part: usize, total: usize) -> f32 {
    if total > 0 {
        part as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        seed: u64,
        result: GameResult,
        score: [i32; 2],
        moves: usize,
        artifacts_used: usize,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        red_wins: usize,
        blue_wins: usize,
        ties: usize,
        avg_margin: f32,
        cache_hit_rate: f64,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        red_wins: results.red_wins,
        blue_wins: results.blue_wins,
        ties: results.ties,
        avg_margin: results.avg_margin,
        cache_hit_rate: results.hit_rate,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                seed: g.seed,
                result: g.result,
                score: g.score,
                moves: g.moves,
                artifacts_used: g.artifacts_used,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Selfplay Results ===");
    println!("Total games: {}", total);
    println!("Red wins:    {} ({:.1}%)", results.red_wins, percent(results.red_wins, total));
    println!("Blue wins:   {} ({:.1}%)", results.blue_wins, percent(results.blue_wins, total));
    println!("Ties:        {} ({:.1}%)", results.ties, percent(results.ties, total));
    println!("Avg margin:  {:+.1} (Blue - Red)", results.avg_margin);
    println!("Cache hits:  {:.1}%", results.hit_rate);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {:?} {}-{} in {} moves, {} artifacts used (seed {})",
            game.game_number, game.result, game.score[0], game.score[1], game.moves, game.artifacts_used, game.seed
        );
    }
}
