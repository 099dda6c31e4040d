//! Offline checker for sprite definition files
//!
//! `check` reports which definitions the cache would accept. `simulate`
//! drives one definition through a spawn strategy tick by tick and prints
//! what the host would see.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tas_core::actions::{ActionRunner, ParsedAction};
use tas_core::definitions::{self, TasDefinition};
use tas_core::{
    ConditionEvaluator, DefinitionCache, DelayQueue, FileContentPipeline, PluginConfig,
    SpawnedSprite, SpriteHost, SpriteId,
};
use tas_types::{Vec2, parse_color};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Check and simulate temporary sprite definitions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List valid and invalid definitions in a data file
    Check { file: PathBuf },
    /// Run one definition through a spawn strategy
    Simulate {
        /// Definition file (defaults to the plugin config's data file)
        file: Option<PathBuf>,
        #[arg(long)]
        id: String,
        /// Override the plugin config's mod id
        #[arg(long)]
        mod_id: Option<String>,
        #[arg(long, default_value_t = 40)]
        ticks: u32,
        #[arg(long, default_value_t = 16)]
        tick_ms: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = Mode::Respawn)]
        mode: Mode,
        /// Make every condition evaluate to false
        #[arg(long)]
        fail_conditions: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Immediate,
    Delayed,
    Respawn,
}

fn main() -> Result<(), String> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => check(&file),
        Commands::Simulate {
            file,
            id,
            mod_id,
            ticks,
            tick_ms,
            seed,
            mode,
            fail_conditions,
        } => simulate(
            plugin_config(PluginConfig::load(), file.as_deref(), mod_id)?,
            &id,
            ticks,
            Duration::from_millis(tick_ms),
            seed,
            mode,
            !fail_conditions,
        ),
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // If TAS_LOG_PATH is set, append to that file instead of stderr
    if let Ok(path) = std::env::var("TAS_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════
// check
// ═══════════════════════════════════════════════════════════════════════════

fn check(file: &Path) -> Result<(), String> {
    let map = definitions::load_file(file).map_err(|e| e.to_string())?;

    let mut ids: Vec<&String> = map.keys().collect();
    ids.sort();

    let mut invalid = 0;
    for id in ids {
        let def = &map[id];
        let problems = problems(def);
        if problems.is_empty() {
            println!(
                "ok       {id}  frames={} interval={}{}{}",
                def.frames,
                def.interval,
                if def.has_rand() { " rand" } else { "" },
                if def.has_end_actions() {
                    format!(" end_actions={}", def.parsed_end_actions().len())
                } else {
                    String::new()
                },
            );
        } else {
            invalid += 1;
            println!("invalid  {id}  {}", problems.join("; "));
        }
    }

    println!("{} definitions, {invalid} invalid", map.len());
    Ok(())
}

fn problems(def: &TasDefinition) -> Vec<String> {
    let mut problems = Vec::new();
    if def.frames <= 0 {
        problems.push(format!("frames must be positive (got {})", def.frames));
    }
    if def.interval <= 0.0 {
        problems.push(format!("interval must be positive (got {})", def.interval));
    }
    if let Some(color) = &def.color
        && let Err(e) = parse_color(color)
    {
        problems.push(format!("color {color:?}: {e} (renders white)"));
    }
    if def.parsed_end_actions().len() != def.end_actions.len() {
        problems.push("some end actions do not parse".to_string());
    }
    problems
}

// ═══════════════════════════════════════════════════════════════════════════
// simulate
// ═══════════════════════════════════════════════════════════════════════════

/// Host stand-in that prints spawns and tracks sprite lifetimes
#[derive(Default)]
struct PrintingHost {
    now_ms: f64,
    /// (sprite, expiry time in ms)
    live: Vec<(SpriteId, f64)>,
}

impl PrintingHost {
    fn take_expired(&mut self) -> Vec<SpriteId> {
        let now = self.now_ms;
        let mut expired = Vec::new();
        self.live.retain(|&(id, expires_at)| {
            if expires_at <= now {
                expired.push(id);
                false
            } else {
                true
            }
        });
        expired
    }
}

impl SpriteHost for PrintingHost {
    fn add_sprite(&mut self, spawned: SpawnedSprite) {
        let s = &spawned.sprite;
        println!(
            "{:>8.1}ms  spawn  #{} at ({:.1}, {:.1}) scale={:.2} alpha={:.2} depth={:.5}",
            self.now_ms,
            spawned.id.raw(),
            s.position.x,
            s.position.y,
            s.scale,
            s.alpha,
            s.layer_depth
        );
        let lifetime = s.interval as f64 * s.frames as f64 * (s.loops.max(0) as f64 + 1.0);
        self.live.push((spawned.id, self.now_ms + lifetime));
    }

    fn unload_sprite(&mut self, _id: SpriteId) {}

    fn remove_sprite(&mut self, id: SpriteId) {
        self.live.retain(|&(live, _)| live != id);
        println!("{:>8.1}ms  remove #{}", self.now_ms, id.raw());
    }
}

struct FixedConditions {
    pass: bool,
}

impl ConditionEvaluator for FixedConditions {
    type Context = ();

    fn evaluate(&mut self, expression: &str, _context: &()) -> bool {
        tracing::debug!(expression, pass = self.pass, "Evaluating condition");
        self.pass
    }
}

struct PrintingActions;

impl ActionRunner for PrintingActions {
    fn try_run_action(&mut self, action: &ParsedAction) -> Result<Option<String>, String> {
        println!("            action {} {:?}", action.name, action.args);
        Ok(None)
    }
}

/// Apply command-line overrides on top of the saved plugin config.
///
/// An explicit file becomes the data file, relative to its own directory.
fn plugin_config(
    mut config: PluginConfig,
    file: Option<&Path>,
    mod_id: Option<String>,
) -> Result<PluginConfig, String> {
    if let Some(file) = file {
        config.data_file = file
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| format!("not a file: {}", file.display()))?;
        config.content_root = file.parent().map(Path::to_path_buf).unwrap_or_default();
    }
    if let Some(mod_id) = mod_id {
        config.mod_id = mod_id;
    }
    Ok(config)
}

fn simulate(
    config: PluginConfig,
    id: &str,
    ticks: u32,
    tick: Duration,
    seed: u64,
    mode: Mode,
    conditions_pass: bool,
) -> Result<(), String> {
    let file = config.content_root.join(&config.data_file);
    tracing::info!(asset = %config.asset_name(), path = ?file, "Simulating sprite definition");

    let pipeline = Rc::new(FileContentPipeline::new(config.content_root.clone()));
    let cache = Rc::new(DefinitionCache::from_config(&config, Rc::clone(&pipeline)));
    DefinitionCache::register(&cache, &*pipeline);

    let mut context = cache
        .try_get_context(id, Vec2::new(640.0, 640.0))
        .ok_or_else(|| format!("no valid definition {id:?} in {}", file.display()))?;

    let mut rng = SmallRng::seed_from_u64(seed);
    let mut host = PrintingHost::default();
    let mut evaluator = FixedConditions {
        pass: conditions_pass,
    };
    let mut actions = PrintingActions;
    let mut queue = DelayQueue::new();

    match mode {
        Mode::Immediate => {
            if !context.try_create(&mut evaluator, &(), &mut rng, &mut host) {
                println!("condition failed, nothing spawned");
            }
        }
        Mode::Delayed => {
            if !context.try_create_delayed(&mut evaluator, &(), &mut rng, &mut queue) {
                println!("nothing scheduled (needs SpawnDelay > 0 and a passing condition)");
            }
        }
        Mode::Respawn => {}
    }

    for _ in 0..ticks {
        host.now_ms += tick.as_nanos() as f64 / 1_000_000.0;

        for spawn in queue.advance(tick) {
            context.fire_delayed(spawn, &mut rng, &mut host);
        }
        if mode == Mode::Respawn {
            context.try_create_respawning(tick, &mut evaluator, &(), &mut rng, &mut host);
        }
        for expired in host.take_expired() {
            println!("{:>8.1}ms  expire #{}", host.now_ms, expired.raw());
            context.on_sprite_expired(expired, &mut actions);
        }
    }

    queue.cancel(context.id());
    context.remove_all_spawned(&mut host, None, &mut actions);
    println!(
        "{} file load(s), {} definition load(s)",
        pipeline.load_count(),
        cache.load_count()
    );
    Ok(())
}
