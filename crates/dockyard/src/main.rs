// ABOUTME: Demo binary driving the dockyard shell from a cooperative UI loop
// ABOUTME: Loads config, wires the bus to a UI queue, runs commands and background work

use anyhow::{Context, Result};
use dockyard::builtin::{self, TOOLS};
use dockyard::cli::{self, Args};
use dockyard::config;
use dockyard::{ShellCommand, ShellController, ShellServices};
use dockyard_core::{JsonFilePreferenceStore, ThemeService, WindowFactoryRegistryBuilder, spawn_work};
use dockyard_events::{MessageBus, UiExecutor, UiQueue};
use dockyard_logging::{LoggingConfig, error, info, warn};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const WORKER_ID: &str = "demo-worker";
const FRAME: Duration = Duration::from_millis(16);
const MAX_FRAMES: usize = 600;

/// `[logging]` from dockyard.toml, then `-v`, then the environment
fn setup_logging(verbosity: u8, config_dir: &Path) -> Result<()> {
    let mut config = match config::load_logging_from_dir(config_dir)? {
        Some(config) => config,
        None => LoggingConfig::for_verbosity(0).with_file_in(config_dir),
    };
    if verbosity > 0 {
        config.level = LoggingConfig::for_verbosity(verbosity).level;
    }
    config.apply_env_overrides()?;

    dockyard_logging::init_logging(config)?;
    Ok(())
}

fn install_panic_handler() {
    panic::set_hook(Box::new(|info| {
        error!("Application panic: {info}");

        if let Ok(backtrace) = std::env::var("RUST_BACKTRACE")
            && (backtrace == "1" || backtrace == "full")
        {
            eprintln!("Backtrace:\n{:?}", std::backtrace::Backtrace::capture());
        }

        eprintln!("Fatal error: {info}");
        std::process::exit(1);
    }));
}

fn main() -> Result<()> {
    let args = cli::parse_args();
    let config_dir = args.config_dir.clone().unwrap_or_else(config::config_dir);
    setup_logging(args.verbose, &config_dir).context("failed to initialize logging")?;
    install_panic_handler();

    let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    let _guard = rt.enter();
    run(args, config_dir, &rt)
}

fn run(args: Args, config_dir: PathBuf, rt: &tokio::runtime::Runtime) -> Result<()> {
    let shell_config = config::load_from_dir(&config_dir)?;

    let factories = WindowFactoryRegistryBuilder::new()
        .with_module(builtin::builtin_module())
        .build();

    if args.list_factories {
        for category in factories.categories() {
            println!("{category}");
            for factory in factories.list_by_category(&category) {
                println!(
                    "  {:<12} {:<12} {}",
                    factory.window_id(),
                    factory.default_region(),
                    factory.display_name()
                );
            }
        }
        return Ok(());
    }

    let ui_queue = Arc::new(UiQueue::for_current_thread());
    let executor: Arc<dyn UiExecutor> = ui_queue.clone();
    let bus = MessageBus::with_executor(shell_config.bus.clone(), executor);

    let store = Arc::new(JsonFilePreferenceStore::new(config::preferences_dir(
        &shell_config,
        &config_dir,
    )));
    let services = ShellServices {
        bus: bus.clone(),
        factories,
        layout: builtin::default_layout(store, shell_config.layout.default_kind),
        theme: ThemeService::new(shell_config.theme),
    };

    let populate = args.populate.clone();
    let mut shell = ShellController::with_extension(
        services,
        &shell_config.drag,
        move |shell: &mut ShellController| {
            for category in &populate {
                shell.populate_from_category(category);
            }
        },
    );

    if let Some(layout) = &args.layout
        && let Err(error) = shell.change_layout(layout)
    {
        warn!(error = %error, "Ignoring --layout override");
    }
    if shell.populate_from_category(TOOLS) == 0 {
        info!("Tools already open");
    }

    for line in &args.commands {
        match line.parse::<ShellCommand>() {
            Ok(command) => {
                shell.execute(command);
            }
            Err(error) => eprintln!("{line}: {error}"),
        }
    }

    let cancel = CancellationToken::new();
    let work = spawn_work(
        bus.clone(),
        WORKER_ID,
        (0..args.work_units).collect(),
        cancel.clone(),
        |_unit: usize| {
            std::thread::sleep(Duration::from_millis(50));
            Ok(())
        },
    );

    let mut last_status = String::new();
    for _ in 0..MAX_FRAMES {
        ui_queue.run_pending();
        shell.process_events();
        shell.tick(Instant::now());

        if shell.status_text() != last_status {
            last_status = shell.status_text().to_string();
            println!("[{}] {}", shell.layout_kind(), last_status);
        }
        if shell.is_exit_requested() || (work.is_finished() && ui_queue.pending_count() == 0) {
            break;
        }
        std::thread::sleep(FRAME);
    }

    cancel.cancel();
    let outcome = rt.block_on(work).context("background work panicked")?;
    info!(outcome = ?outcome, "Background work finished");

    let snapshot = shell.snapshot();
    for region in shell.visible_regions() {
        let titles: Vec<&str> = snapshot
            .windows(region)
            .iter()
            .map(|window| window.title.as_str())
            .collect();
        println!("{region:<7} {}", titles.join(", "));
    }
    for window in shell.floating_windows() {
        println!("floating {}", window.title);
    }

    shell.dispose();
    bus.dispose();
    Ok(())
}
