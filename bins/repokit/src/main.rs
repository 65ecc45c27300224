//! repokit - project profiles and merged pre-commit configuration
//!
//! Detects the ecosystems a repository uses, remembers the chosen profile,
//! and writes one `.pre-commit-config.yaml` assembled from profile templates.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use repokit_cli::output::{Output, Status, format_count, format_duration, format_list};
use repokit_core::config::Config;
use repokit_core::error::{Error, exit_codes};
use repokit_profiles::{
    InstallReport, PROFILES, ProfileId, ProfileManager, ProfileState, ProfileStatus,
};
use repokit_telemetry::{TelemetryConfig, Timer};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "repokit")]
#[command(about = "Detect project ecosystems and manage merged pre-commit configurations")]
#[command(version)]
struct Cli {
    /// Project root
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Configuration file (defaults to .repokit.toml in the project root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Templates directory, overriding the configured one
    #[arg(long, global = true, env = "REPOKIT_TEMPLATES")]
    templates: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which profiles the project's files point to
    Detect,

    /// Activate a profile (detected when omitted) and install it
    Init {
        /// Profile identifier
        profile: Option<String>,
    },

    /// Switch the active profile and reinstall
    Set {
        /// Profile identifier
        profile: String,
    },

    /// Show the active profile, overrides and resolved profiles
    Show,

    /// Write the merged config and template files
    Install,

    /// Regenerate the merged config and template files
    Update,

    /// Remove the files repokit generated and the profile state
    Cleanup,

    /// Force a check on, even if disabled or opt-in
    Enable {
        /// Hook id
        check: String,
    },

    /// Drop a check from the merged config
    Disable {
        /// Hook id
        check: String,
    },

    /// List every known profile
    List,

    /// Print PATH exports for the active profiles
    Env,
}

fn main() {
    let cli = Cli::parse();
    let out = Output::new(cli.json);

    let root = match std::path::absolute(&cli.root) {
        Ok(root) => root,
        Err(e) => std::process::exit(out.fail(&Error::from(e).with_context("Resolving --root"))),
    };

    let mut config = match Config::load(&root, cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => std::process::exit(out.fail(&e)),
    };
    if let Some(templates) = cli.templates {
        let templates = std::path::absolute(&templates).unwrap_or(templates);
        config = config.with_templates_dir(templates.display().to_string());
    }

    if let Err(e) = init_logging(&config, cli.verbose) {
        Status::warning(&format!("Logging disabled: {e}"));
    }
    tracing::debug!(root = %root.display(), config = ?config.path, "Starting");

    let manager = ProfileManager::from_config(&root, &config);

    let result = match cli.command {
        Commands::Detect => run_detect(&manager, out),
        Commands::Init { profile } => run_init(&manager, profile.as_deref(), out),
        Commands::Set { profile } => run_set(&manager, &profile, out),
        Commands::Show => run_show(&manager, out),
        Commands::Install => run_install(&manager, "Installed", out),
        Commands::Update => run_install(&manager, "Updated", out),
        Commands::Cleanup => run_cleanup(&manager, out),
        Commands::Enable { check } => run_override(&manager, &check, true, out),
        Commands::Disable { check } => run_override(&manager, &check, false, out),
        Commands::List => run_list(&manager, out),
        Commands::Env => run_env(&manager, out),
    };

    std::process::exit(result);
}

fn init_logging(config: &Config, verbose: bool) -> anyhow::Result<()> {
    let logging = &config.schema.logging;
    repokit_telemetry::init_with_config(TelemetryConfig {
        log_level: if verbose { "debug".to_string() } else { logging.level.clone() },
        json: logging.json,
        show_target: verbose,
    })
}

fn fail(out: Output, err: impl Into<Error>) -> i32 {
    out.fail(&err.into())
}

#[derive(Serialize)]
struct Detected {
    detected: BTreeSet<ProfileId>,
}

fn run_detect(manager: &ProfileManager, out: Output) -> i32 {
    let detected = Detected {
        detected: manager.detect(),
    };
    out.emit(&detected, |d| {
        if d.detected.is_empty() {
            Status::info("No ecosystem markers found; only common applies");
            return;
        }
        Status::success(&format!(
            "Detected {}",
            format_count(d.detected.len(), "profile", "profiles")
        ));
        for id in &d.detected {
            Status::item(&format!("{} ({})", id.bold(), format_list(id.spec().markers)));
        }
    });
    exit_codes::SUCCESS
}

#[derive(Serialize)]
struct Activated {
    state: ProfileState,
    install: InstallReport,
}

fn run_init(manager: &ProfileManager, profile: Option<&str>, out: Output) -> i32 {
    match manager.init(profile) {
        Ok(state) => finish_activation(manager, state, out),
        Err(e) => fail(out, e),
    }
}

fn run_set(manager: &ProfileManager, profile: &str, out: Output) -> i32 {
    match manager.set_active_profile(profile) {
        Ok(state) => finish_activation(manager, state, out),
        Err(e) => fail(out, e),
    }
}

fn finish_activation(manager: &ProfileManager, state: ProfileState, out: Output) -> i32 {
    let install = match manager.install() {
        Ok(report) => report,
        Err(e) => return fail(out, e),
    };
    out.emit(&Activated { state, install }, |a| {
        Status::success(&format!("Active profile: {}", a.state.active_profile.bold()));
        print_install(&a.install, "Installed");
    });
    exit_codes::SUCCESS
}

fn run_show(manager: &ProfileManager, out: Output) -> i32 {
    let status = match manager.status() {
        Ok(status) => status,
        Err(e) => return fail(out, e),
    };
    out.emit(&status, print_status);
    exit_codes::SUCCESS
}

fn print_status(status: &ProfileStatus) {
    if !status.initialized {
        Status::warning("Not initialized; run `repokit init` to choose a profile");
    }
    Status::header("Profile");
    Status::field("active", status.state.active_profile.as_str());
    Status::field("detected", &format_list(&status.detected));
    Status::field("resolved", &format_list(&status.active));
    Status::field("enabled", &format_list(&status.state.enabled_checks));
    Status::field("disabled", &format_list(&status.state.disabled_checks));
    if !status.env.is_empty() {
        Status::field(
            "path",
            &format_list(status.env.path_prepend.iter().map(|p| p.display())),
        );
    }
}

fn run_install(manager: &ProfileManager, verb: &str, out: Output) -> i32 {
    repokit_telemetry::timed_span!("install");
    let timer = Timer::start("install");
    let report = match manager.install() {
        Ok(report) => report,
        Err(e) => return fail(out, e),
    };
    let elapsed = timer.stop();
    out.emit(&report, |r| {
        print_install(r, verb);
        Status::info(&format!("Done in {}", format_duration(elapsed)));
    });
    exit_codes::SUCCESS
}

fn print_install(report: &InstallReport, verb: &str) {
    Status::success(&format!(
        "{} {} from {} into {}",
        verb,
        format_count(report.hooks, "hook", "hooks"),
        format_list(&report.profiles),
        report.output.display()
    ));
    for skipped in &report.skipped {
        Status::item(&format!(
            "{} from {} already provided by an earlier profile",
            skipped.key, skipped.profile
        ));
    }
    for key in &report.filtered {
        Status::item(&format!("{} turned off by check overrides", key));
    }
    if !report.copied.is_empty() {
        Status::info(&format!(
            "Copied {}: {}",
            format_count(report.copied.len(), "file", "files"),
            format_list(report.copied.iter().map(|p| display_name(p)))
        ));
    }
    if !report.kept.is_empty() {
        Status::warning(&format!(
            "Kept existing {}: {}",
            format_count(report.kept.len(), "file", "files"),
            format_list(report.kept.iter().map(|p| display_name(p)))
        ));
    }
    if !report.removed.is_empty() {
        Status::info(&format!(
            "Removed {}: {}",
            format_count(report.removed.len(), "stale file", "stale files"),
            format_list(report.removed.iter().map(|p| display_name(p)))
        ));
    }
}

fn run_cleanup(manager: &ProfileManager, out: Output) -> i32 {
    let report = match manager.cleanup() {
        Ok(report) => report,
        Err(e) => return fail(out, e),
    };
    out.emit(&report, |r| {
        if r.removed.is_empty() {
            Status::info("Nothing to clean up");
        } else {
            Status::success(&format!(
                "Removed {}",
                format_count(r.removed.len(), "file", "files")
            ));
            for path in &r.removed {
                Status::item(&display_name(path));
            }
        }
    });
    exit_codes::SUCCESS
}

fn run_override(manager: &ProfileManager, check: &str, enable: bool, out: Output) -> i32 {
    let result = if enable {
        manager.enable_check(check)
    } else {
        manager.disable_check(check)
    };
    let state = match result {
        Ok(state) => state,
        Err(e) => return fail(out, e),
    };
    out.emit(&state, |_| {
        let verb = if enable { "Enabled" } else { "Disabled" };
        Status::success(&format!("{verb} {}", check.trim().bold()));
        Status::info("Run `repokit update` to regenerate the config");
    });
    exit_codes::SUCCESS
}

#[derive(Serialize)]
struct ProfileRow {
    id: ProfileId,
    markers: Vec<String>,
    tools: &'static [&'static str],
    has_fragment: bool,
}

fn run_list(manager: &ProfileManager, out: Output) -> i32 {
    let rows: Vec<ProfileRow> = PROFILES
        .iter()
        .map(|spec| ProfileRow {
            id: spec.id,
            markers: spec.markers.iter().map(|m| m.to_string()).collect(),
            tools: spec.tools,
            has_fragment: manager.templates().has_fragment(spec.id),
        })
        .collect();

    out.emit(&rows, |rows| {
        Status::header("Profiles");
        for row in rows {
            let template = if row.has_fragment {
                "template".green().to_string()
            } else {
                "no template".dimmed().to_string()
            };
            println!("  {:<10} {}", row.id.bold(), template);
            Status::field("markers", &format_list(&row.markers));
            Status::field("tools", &format_list(row.tools));
        }
    });
    exit_codes::SUCCESS
}

fn run_env(manager: &ProfileManager, out: Output) -> i32 {
    let plan = match manager.env_plan() {
        Ok(plan) => plan,
        Err(e) => return fail(out, e),
    };
    out.emit(&plan, |plan| {
        for line in plan.exports() {
            println!("{line}");
        }
    });
    exit_codes::SUCCESS
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
