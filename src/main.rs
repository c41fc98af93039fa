#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::time::Instant;

use life_inc_rules::field::render::{self, AsciiSink, RenderOptions};
use life_inc_rules::{EngineConfig, LayoutKind, LifeField};
use tracing_subscriber::EnvFilter;

const DEFAULT_STEPS: u64 = 200;
const CHECK_INTERVAL: u64 = 50;

const USAGE: &str = "usage: life-inc-rules [--size-log N] [--layout KIND] [--steps N] [--seed N] \
[--threads N] [--max-age N] [--gliders] [--age-colors] [--no-frame]";

struct MainArgs {
    config: EngineConfig,
    steps: u64,
    gliders: bool,
    age_colors: bool,
    print_frame: bool,
}

fn parse_args() -> Result<MainArgs, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = EngineConfig::default();
    let mut steps = DEFAULT_STEPS;
    let mut gliders = false;
    let mut age_colors = false;
    let mut print_frame = true;

    let next_arg = |i: usize, flag: &str| -> Result<&str, String> {
        args.get(i)
            .map(String::as_str)
            .ok_or_else(|| format!("{flag} requires a value"))
    };
    let number = |value: &str, flag: &str| -> Result<u64, String> {
        value
            .parse()
            .map_err(|_| format!("{flag} requires a non-negative integer, got {value}"))
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--size-log" => {
                i += 1;
                let log = number(next_arg(i, "--size-log")?, "--size-log")?;
                let log = u32::try_from(log).map_err(|e| e.to_string())?;
                config = config.field_size_log(log);
            }
            "--layout" => {
                i += 1;
                let kind: LayoutKind = next_arg(i, "--layout")?
                    .parse()
                    .map_err(|e: life_inc_rules::FieldError| e.to_string())?;
                config = config.layout(kind);
            }
            "--steps" => {
                i += 1;
                steps = number(next_arg(i, "--steps")?, "--steps")?;
            }
            "--seed" => {
                i += 1;
                config = config.seed(number(next_arg(i, "--seed")?, "--seed")?);
            }
            "--threads" => {
                i += 1;
                let n = number(next_arg(i, "--threads")?, "--threads")?;
                config = config.thread_count(n as usize);
            }
            "--max-age" => {
                i += 1;
                let max_age = number(next_arg(i, "--max-age")?, "--max-age")?;
                config = config.max_age(u32::try_from(max_age).unwrap_or(u32::MAX));
            }
            "--gliders" => gliders = true,
            "--age-colors" => age_colors = true,
            "--no-frame" => print_frame = false,
            "--help" | "-h" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown argument: {other}\n{USAGE}")),
        }
        i += 1;
    }

    Ok(MainArgs {
        config,
        steps,
        gliders,
        age_colors,
        print_frame,
    })
}

fn run(args: MainArgs) -> life_inc_rules::Result<()> {
    let mut field = LifeField::with_config(args.config)?;
    if args.gliders {
        field.reset_with_gliders()?;
    }

    println!(
        "Field {0}x{0}, layout {1}, rules {2}",
        field.size(),
        field.layout_kind(),
        field.rules()
    );

    let start = Instant::now();
    let mut done = 0;
    while done < args.steps {
        let chunk = CHECK_INTERVAL.min(args.steps - done);
        field.step_n(chunk);
        done += chunk;
        println!("{} | rules {}", field.stats(), field.rules());
    }
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    if args.steps > 0 {
        println!(
            "{} generations in {elapsed_ms:.3} ms ({:.6} ms/gen)",
            args.steps,
            elapsed_ms / args.steps as f64
        );
    }

    if args.print_frame {
        let mut sink = AsciiSink::new();
        let options = RenderOptions {
            show_grid: false,
            age_colors: args.age_colors,
        };
        render::render(&field, &mut sink, options);
        print!("{}", sink.to_text());
    }
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("life_inc_rules=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };
    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
