#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use chuid::cli::Cli;
use chuid::config::RunConfig;
use chuid::dispatcher::Dispatcher;
use chuid::error::StartupError;
use chuid::hardlink::HardlinkSet;
use chuid::logging::Logger;
use chuid::stats::Stats;
use chuid::subtree::SubtreeDescriptor;
use chuid::worker::{self, WorkerContext};
use chuid::{input, reporter, rlimit, signal};

use clap::Parser;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logger = match Logger::open(&cli.log_dir, cli.verbose) {
        Ok(logger) => Arc::new(logger),
        Err(e) => {
            eprintln!("chuid: {e}");
            return exit_code_for_startup(&e);
        }
    };

    match run(cli, &logger) {
        Ok(interrupted) => {
            if interrupted {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            logger.error(&format!("{e}"));
            eprintln!("chuid: {e}");
            exit_code_for_startup(&e)
        }
    }
}

fn exit_code_for_startup(e: &StartupError) -> ExitCode {
    match e.raw_os_error() {
        Some(code) if (1..=255).contains(&code) => ExitCode::from(code as u8),
        _ => ExitCode::FAILURE,
    }
}

/// Loads inputs, builds the run, and drives it to completion. Split out of
/// `main` so every fallible step before worker threads start shares one `?`
/// chain (spec.md §6 startup-validation ordering).
fn run(cli: Cli, logger: &Arc<Logger>) -> Result<bool, StartupError> {
    if cli.busy_threshold <= 0.0 || cli.busy_threshold > 1.0 {
        return Err(StartupError::InvalidBusyThreshold(cli.busy_threshold));
    }
    if cli.workers == 0 {
        return Err(StartupError::InvalidWorkerCount);
    }

    let roots = input::load_roots(&cli.roots_file, logger).map_err(StartupError::MissingRootsFile)?;
    if roots.is_empty() {
        return Err(StartupError::NoValidRoots);
    }

    let exclusions = match &cli.exclusion_file {
        Some(path) => input::load_exclusions(path, logger).map_err(StartupError::MissingExclusionFile)?,
        None => chuid::exclude::ExclusionFilter::default(),
    };

    let (uid_map, gid_map) =
        input::load_mapping(&cli.mapping_file, logger).map_err(StartupError::MissingMappingFile)?;

    let open_file_limit = rlimit::raise_and_read_nofile_limit(logger);
    let worker_count = rlimit::clamp_worker_count(cli.workers, open_file_limit, logger);

    let config = Arc::new(RunConfig {
        roots: roots.clone(),
        exclusions,
        uid_map,
        gid_map,
        worker_count,
        busy_threshold: cli.busy_threshold,
        two_pool: cli.two_pool_mode(),
        stack_mode: cli.stack_mode(),
        dry_run: cli.dry_run,
        verbose: cli.verbose,
        report_interval: cli.report_interval.map(Duration::from_secs),
    });

    logger.info(&format!(
        "starting scan over {} root(s) with {worker_count} worker(s)",
        roots.len()
    ));

    let dispatcher = Arc::new(Dispatcher::new(config.two_pool, config.stack_mode));
    dispatcher.seed(roots.into_iter().map(SubtreeDescriptor::root));

    let hardlinks = Arc::new(HardlinkSet::new());
    let stats = Arc::new(Stats::new());
    let interrupted = Arc::new(AtomicBool::new(false));

    signal::install(Arc::clone(&dispatcher), Arc::clone(logger), Arc::clone(&interrupted));

    let reporter_done = Arc::new(AtomicBool::new(false));
    let reporter_handle = config.report_interval.map(|interval| {
        reporter::spawn(Arc::clone(&stats), interval, Arc::clone(&reporter_done))
    });

    let mut handles = Vec::with_capacity(worker_count);
    for id in 0..worker_count {
        let dispatcher = Arc::clone(&dispatcher);
        let hardlinks = Arc::clone(&hardlinks);
        let config = Arc::clone(&config);
        let logger = Arc::clone(logger);
        let stats = Arc::clone(&stats);

        handles.push(std::thread::spawn(move || {
            let ctx = WorkerContext {
                id,
                worker_total: worker_count,
                dispatcher: &dispatcher,
                hardlinks: &hardlinks,
                config: &config,
                logger: &logger,
                stats: &stats,
            };
            worker::run(&ctx);
        }));
    }

    for handle in handles {
        let _ = handle.join();
    }

    reporter_done.store(true, Ordering::Relaxed);
    if let Some(handle) = reporter_handle {
        let _ = handle.join();
    }

    let snapshot = stats.snapshot();
    println!("{snapshot}");
    logger.info(&format!("scan complete: {snapshot}"));

    let interrupted = interrupted.load(Ordering::SeqCst);
    if interrupted {
        logger.warning("run terminated early by signal");
    }

    Ok(interrupted)
}
