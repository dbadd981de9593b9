//! Console probe for the XP engine.
//!
//! # Responsibility
//! - Open (or create) an xLog database, run the daily snapshot, and print
//!   the current domain sums and rank.
//! - Keep output deterministic for quick local sanity checks.

use chrono::Local;
use std::process::ExitCode;
use xlog_core::db::open_db;
use xlog_core::{
    compute_rank, default_log_level, domain_xp_sums, init_logging, profile_xp_from,
    SnapshotLogger, SnapshotOutcome, SqliteXpStore,
};

fn main() -> ExitCode {
    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "xlog.db".to_string());

    // Best effort: the probe stays usable even when the log directory is
    // not writable.
    let log_dir = std::env::temp_dir().join("xlog-logs");
    if let Err(message) = init_logging(default_log_level(), &log_dir.to_string_lossy()) {
        eprintln!("xlog: logging disabled: {message}");
    }

    match run(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("xlog: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: &str) -> Result<(), String> {
    let mut conn = open_db(db_path).map_err(|err| format!("failed to open `{db_path}`: {err}"))?;
    let today = Local::now().date_naive();

    {
        let mut logger = SnapshotLogger::new(SqliteXpStore::new(&mut conn));
        match logger
            .log_today_if_needed(today)
            .map_err(|err| err.to_string())?
        {
            SnapshotOutcome::Logged(entry) => {
                println!(
                    "snapshot logged for {} (profile_xp={:.2})",
                    entry.date, entry.profile_xp
                );
            }
            SnapshotOutcome::AlreadyLogged => {
                println!("snapshot already logged for {today}");
            }
        }
    }

    let store = SqliteXpStore::new(&mut conn);
    let domain_xp = domain_xp_sums(&store).map_err(|err| err.to_string())?;
    for (index, xp) in domain_xp.iter().enumerate() {
        println!("domain {} xp={xp:.0}", index + 1);
    }

    let profile_xp = profile_xp_from(domain_xp);
    let rank = compute_rank(profile_xp);
    println!(
        "profile xp={profile_xp:.2} rank={} level={} progress={:.0}%",
        rank.name,
        rank.level,
        rank.fraction * 100.0
    );

    Ok(())
}
