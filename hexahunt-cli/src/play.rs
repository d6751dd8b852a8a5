//! Play command - a human (Red) against the AI (Blue) on stdin/stdout
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: human_turn(), ai_turn(), report_final()
//! - Level 3: parse_command()
//! - Level 4: formatting utilities

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hexahunt_core::{
    Action, AiTurn, CellId, EdgeId, GameResult, GameState, Hex, Item, Match, MatchConfig, Player,
};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Board radius
    #[arg(long)]
    pub radius: Option<i32>,

    /// AI search depth (2 easy, 3 medium, 4 hard)
    #[arg(long)]
    pub depth: Option<i32>,

    /// Load settings from a JSON config file (flags override it)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// A line of human input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Draw(EdgeId),
    Gauntlet(Option<i32>),
    Compass(Hex),
    Moves,
    Quit,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = resolve_config(&args, seed)?;
    let mut game = Match::new(&config).context("Failed to set up match")?;

    println!(
        "HexaHunt: radius {}, {} cells, {} edges, AI depth {} ({:?})",
        config.radius,
        game.topology().cell_count(),
        game.topology().edge_count(),
        config.depth,
        config.difficulty()
    );
    println!("You are Red. Type an edge number, `gauntlet [n]`, `compass <q> <r>`, `moves` or `quit`.");
    print_moves(game.state());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !game.is_over() {
        print_state(game.state());

        let keep_going = match game.state().turn() {
            Player::Red => human_turn(&mut game, &mut lines)?,
            Player::Blue => {
                ai_turn(&mut game)?;
                true
            }
        };
        if !keep_going {
            println!("Bye.");
            return Ok(());
        }
    }

    report_final(&game);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn resolve_config(args: &PlayArgs, seed: Option<u64>) -> Result<MatchConfig> {
    let mut config = match &args.config {
        Some(path) => MatchConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => MatchConfig::default(),
    };

    if let Some(radius) = args.radius {
        config.radius = radius;
    }
    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    if seed.is_some() {
        config.seed = seed;
    }

    config.validate()?;
    Ok(config)
}

/// Read commands until Red has committed an edge. `false` means quit.
fn human_turn<B: BufRead>(game: &mut Match, lines: &mut io::Lines<B>) -> Result<bool> {
    loop {
        print!("red> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(false);
        };
        let line = line?;

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(msg) => {
                println!("{}", msg);
                continue;
            }
        };

        match command {
            Command::Quit => return Ok(false),
            Command::Moves => print_moves(game.state()),
            Command::Gauntlet(amount) => match game.use_gauntlet(amount) {
                Some(stolen) => println!("Gauntlet stole {} points.", stolen),
                None => println!("No gauntlet to use, or nothing to steal."),
            },
            Command::Compass(hex) => {
                let used = game
                    .topology()
                    .cell_at(hex)
                    .map(|cell| game.use_compass(cell))
                    .unwrap_or(false);
                if used {
                    println!("Compass swapped your cell with {}.", hex);
                } else {
                    println!("Compass cannot target {}.", hex);
                }
            }
            Command::Draw(edge) => match game.commit_human(edge) {
                Ok(true) => {
                    println!("You completed a cell or spent an hourglass: move again.");
                    return Ok(true);
                }
                Ok(false) => return Ok(true),
                Err(err) => println!("{}", err),
            },
        }
    }
}

fn ai_turn(game: &mut Match) -> Result<()> {
    let turn = game.commit_ai()?;
    print_ai_turn(game, &turn);
    Ok(())
}

fn report_final(game: &Match) {
    print_state(game.state());
    let [red, blue] = game.state().score();
    match game.result() {
        GameResult::Win(Player::Red) => println!("You win {} to {}!", red, blue),
        GameResult::Win(Player::Blue) => println!("The AI wins {} to {}.", blue, red),
        GameResult::Tie => println!("Tie at {}.", red),
        GameResult::Ongoing => {}
    }
}

// ============================================================================
// LEVEL 3 - INPUT
// ============================================================================

fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("Enter a command.".to_string());
    };

    let number = |w: Option<&str>| -> std::result::Result<i32, String> {
        w.ok_or_else(|| "Missing number.".to_string())?
            .parse::<i32>()
            .map_err(|e| format!("Bad number: {}", e))
    };

    match head {
        "quit" | "q" => Ok(Command::Quit),
        "moves" | "m" => Ok(Command::Moves),
        "gauntlet" | "g" => match words.next() {
            Some(w) => Ok(Command::Gauntlet(Some(number(Some(w))?))),
            None => Ok(Command::Gauntlet(None)),
        },
        "compass" | "c" => {
            let q = number(words.next())?;
            let r = number(words.next())?;
            Ok(Command::Compass(Hex::new(q, r)))
        }
        other => other
            .parse::<u32>()
            .map(|i| Command::Draw(EdgeId(i)))
            .map_err(|_| format!("Unknown command: {}", other)),
    }
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn owner_mark(owner: Option<Player>) -> char {
    match owner {
        Some(Player::Red) => 'R',
        Some(Player::Blue) => 'B',
        None => '.',
    }
}

fn print_state(state: &GameState) {
    let topology = state.topology();
    let [red, blue] = state.score();

    println!();
    println!("Score  Red {}  Blue {}   ({} edges left)", red, blue, state.possible_moves().len());
    for cell in topology.cells() {
        let revealed = match state.claimed_item(cell) {
            Some(item) => item_label(item),
            None => String::new(),
        };
        println!(
            "  {:>8} {} {}/6 {}",
            topology.hex(cell).to_string(),
            owner_mark(state.cell_owner(cell)),
            state.edges_drawn(cell),
            revealed
        );
    }

    for player in Player::ALL {
        let held = state.player_items(player);
        let mut parts = Vec::new();
        if held.gauntlet_available {
            parts.push(format!("gauntlet ({} moves left)", held.gauntlet_timer));
        }
        if held.hourglass_bonus > 0 {
            parts.push(format!("hourglass x{}", held.hourglass_bonus));
        }
        if held.compass_available {
            parts.push("compass".to_string());
        }
        if !parts.is_empty() {
            println!("  {:?} holds: {}", player, parts.join(", "));
        }
    }
}

fn item_label(item: Item) -> String {
    match item {
        Item::Treasure(t) => format!("[{} +{}]", t.name(), t.value()),
        Item::Artifact(a) => format!("[{}]", a.name()),
    }
}

fn print_moves(state: &GameState) {
    let topology = state.topology();
    for edge in state.possible_moves() {
        let cells: Vec<String> = topology
            .edge_cells(edge)
            .map(|c: CellId| topology.hex(c).to_string())
            .collect();
        println!("  {:>4}  between {}", edge.0, cells.join(" / "));
    }
}

fn print_ai_turn(game: &Match, turn: &AiTurn) {
    for action in &turn.actions {
        match *action {
            Action::Gauntlet { stolen, .. } => println!("AI used its gauntlet and stole {} points.", stolen),
            Action::Compass { source, target, .. } => println!(
                "AI used its compass: {} <-> {}",
                game.topology().hex(source),
                game.topology().hex(target)
            ),
            Action::Move { .. } => {}
        }
    }

    if let Some(edge) = turn.edge {
        println!("AI draws edge {}{}", edge.0, if turn.extra_turn { " and moves again" } else { "" });
    }

    if let Some(search) = turn.search {
        let stats = search.stats;
        println!(
            "  value {}  evaluated {}  cache hits {} ({:.1}%)  table {}  {:.2?}",
            search.value,
            stats.positions_evaluated,
            stats.cache_hits,
            stats.hit_rate(),
            stats.table_size,
            stats.elapsed
        );
    }
}
