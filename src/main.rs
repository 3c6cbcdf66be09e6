use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::style::{style, Stylize};
use fifteen_puzzle::puzzle::{symbol_char, BLANK, SIDE};
use fifteen_puzzle::{codec, PatternDatabase, Solver, SolverConfig, State};
use rand::{rngs::StdRng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thousands::Separable;

#[derive(Debug, Parser)]
#[command(name = "fifteen-puzzle", about = "Optimal 15-puzzle solver using additive pattern databases")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the pattern database and write it to disk
    Build {
        /// Output path (defaults to $FIFTEEN_PDB or fifteen.pdb)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Build the groups one after another instead of in parallel
        #[arg(long)]
        sequential: bool,
    },
    /// Solve the board in FILE (four rows of four symbols)
    Solve {
        file: PathBuf,

        /// Pattern database path; built and saved there when missing
        #[arg(long)]
        db: Option<PathBuf>,

        /// Goal board file (defaults to 0123/4567/89AB/CDEF)
        #[arg(long)]
        goal: Option<PathBuf>,
    },
    /// Print a random solvable board
    Scramble {
        #[arg(short, long, default_value_t = 40)]
        moves: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn show_state(state: &State, heading: &str) {
    println!("{}", style(heading).bold());
    for row in state.layout().chunks(SIDE) {
        let cells: Vec<String> = row
            .iter()
            .map(|&v| {
                let c = symbol_char(v).to_string();
                if v == BLANK {
                    style(c).reverse().to_string()
                } else {
                    c
                }
            })
            .collect();
        println!("{}", cells.join(" "));
    }
}

fn read_state(path: &Path) -> anyhow::Result<State> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    State::parse(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut config = SolverConfig::from_env();

    match args.command {
        Command::Build { out, sequential } => {
            if let Some(out) = out {
                config.database_path = out;
            }
            if sequential {
                config.parallel_build = false;
            }
            let stopwatch = Instant::now();
            let db = PatternDatabase::build(&config.goal, &config.partition, config.parallel_build)?;
            codec::save(&db, &config.database_path)?;
            println!(
                "Wrote {} in {:.2?}",
                config.database_path.display(),
                stopwatch.elapsed()
            );
        }
        Command::Solve { file, db, goal } => {
            if let Some(db) = db {
                config.database_path = db;
            }
            if let Some(goal) = goal {
                config.goal = read_state(&goal)?;
            }
            let initial = read_state(&file)?;
            show_state(&initial, "Initial state:");
            show_state(&config.goal, "Goal state:");

            let database = config
                .load_or_build_database()
                .context("preparing the pattern database")?;

            let stopwatch = Instant::now();
            let solution = Solver::new(&database).solve(&initial, &config.goal)?;
            let elapsed = stopwatch.elapsed();

            let actions: Vec<String> = solution.moves.iter().map(|m| m.to_string()).collect();
            println!("{}", style("Output:").bold());
            println!("   Minimum path cost : {}", solution.moves.len());
            println!("   Actions in minimum path : [{}]", actions.join(", "));
            println!(
                "   Nodes generated : {}",
                solution.nodes_generated.separate_with_commas()
            );
            println!("   Time taken : {:.4} s", elapsed.as_secs_f64());
        }
        Command::Scramble { moves, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            print!("{}", config.goal.scrambled(moves, &mut rng));
        }
    }

    Ok(())
}
