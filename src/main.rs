use chime::app::{self, AppOptions};
use chime::config::{self, Dirs};
use chime::recommend::{self, SongPool};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    root: Option<PathBuf>,
    recommend: Option<usize>,
    goal: Option<f64>,
    pool: Option<PathBuf>,
    no_audio: bool,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;

    if let Some(count) = args.recommend {
        return run_recommend(&args, count);
    }

    app::run(AppOptions {
        root: args.root,
        no_audio: args.no_audio,
    })
}

fn run_recommend(args: &CliArgs, count: usize) -> anyhow::Result<()> {
    let pool_path = match &args.pool {
        Some(path) => path.clone(),
        None => Dirs::from_root(config::resolve_root(args.root.as_deref())?).pool,
    };

    let pool = SongPool::from_file(&pool_path)?;
    if pool.is_empty() {
        anyhow::bail!("song pool {} is empty", pool_path.display());
    }

    let mut rng = SmallRng::from_os_rng();
    let picks = pool.pick(count, &mut rng);
    for (number, name) in picks.iter().enumerate() {
        println!("{}. {name}", number + 1);
    }

    let sentence = recommend::share_sentence(&picks, args.goal, &mut rng);
    println!("\n{sentence}");

    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(&sentence)) {
        Ok(()) => println!("\n(copied to clipboard)"),
        Err(_) => println!("\n(clipboard unavailable; copy the line above by hand)"),
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--root" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--root requires a directory");
                };
                out.root = Some(PathBuf::from(value));
            }
            "--recommend" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--recommend requires a song count");
                };
                let count: usize = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("--recommend expects a positive number"))?;
                if count == 0 {
                    anyhow::bail!("--recommend expects a positive number");
                }
                out.recommend = Some(count);
            }
            "--goal" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--goal requires an amount");
                };
                out.goal = Some(
                    value
                        .parse()
                        .map_err(|_| anyhow::anyhow!("--goal expects a number"))?,
                );
            }
            "--pool" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--pool requires a file path");
                };
                out.pool = Some(PathBuf::from(value));
            }
            "--no-audio" => out.no_audio = true,
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("chime");
    println!("  --root DIR        Player root holding songs/ and images/");
    println!("  --recommend N     Pick N random songs and print a share line");
    println!("  --goal AMOUNT     Fundraising amount woven into the share line");
    println!("  --pool FILE       Song pool for --recommend (default_songs.txt)");
    println!("  --no-audio        Run the player without an output device");
}
