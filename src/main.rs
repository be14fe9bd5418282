use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};
use tree23::card::{Card, Rank};
use tree23::Tree23;

type DemoResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "tree23", about = "Fills a 2-3 tree with random values and removes some of them")]
struct Args {
    /// RNG seed; derived from the clock when absent.
    #[arg(long, env = "TREE23_SEED")]
    seed: Option<u64>,

    /// Random values added after the fixed sequence.
    #[arg(long, default_value_t = 100)]
    random: usize,

    /// Random removal attempts.
    #[arg(long, default_value_t = 20)]
    removals: usize,

    /// Exclusive upper bound of the random values.
    #[arg(long, default_value_t = 200)]
    max: u32,

    /// Shuffle a deck into a tree instead.
    #[arg(long)]
    cards: bool,
}

const FIXED_SEQUENCE: [u32; 16] = [5, 10, 4, 8, 20, 30, 40, 50, 60, 2, 70, 200, 65, 1, 62, 6];

fn main() -> DemoResult<()> {
    env_logger::init();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    println!("seed: {} (set TREE23_SEED={} to reproduce)", seed, seed);
    let mut rng = StdRng::seed_from_u64(seed);

    if args.cards {
        return run_cards(&mut rng);
    }
    if args.max == 0 {
        return Err("--max must be at least 1".into());
    }

    let mut tree = Tree23::new();
    tree.add_all(FIXED_SEQUENCE);
    for _ in 0..args.random {
        tree.add(rng.gen_range(0..args.max));
    }
    println!("{} elements, height {}", tree.len(), tree.height());
    print_pre_order(&tree);

    for _ in 0..args.removals {
        let element = rng.gen_range(0..args.max);
        if tree.remove(&element) {
            println!("Removing {}: removed", element);
        } else {
            println!("Removing {}: not found", element);
        }
    }
    tree.validate()?;

    println!("{} elements, height {}", tree.len(), tree.height());
    print_pre_order(&tree);
    println!("{}", tree);
    Ok(())
}

fn run_cards(rng: &mut StdRng) -> DemoResult<()> {
    let mut deck: Vec<Card> = Card::deck().collect();
    // Fisher-Yates
    for i in (1..deck.len()).rev() {
        deck.swap(i, rng.gen_range(0..=i));
    }

    let mut tree = Tree23::new();
    if !tree.add_all_safe(deck.iter().copied()) {
        return Err("deck contained a duplicate card".into());
    }
    tree.validate()?;

    let top = tree.find_max().ok_or("empty deck")?;
    println!("{} cards, height {}, highest {}", tree.len(), tree.height(), top);
    for card in tree.in_order(|card| card.rank >= Rank::Jack) {
        println!("{}", card);
    }
    Ok(())
}

fn print_pre_order<T: std::fmt::Display>(tree: &Tree23<T>) {
    let line: Vec<String> = tree.pre_order(|_| true).iter().map(|e| e.to_string()).collect();
    println!("{}", line.join(" "));
}
