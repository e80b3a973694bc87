use absence_scheduling::config::Config;
use absence_scheduling::utils::timestamp_to_iso;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log filter from `ABSENCE_SCHEDULING_LOG_LEVEL` (or `RUST_LOG`, default `debug`).
    let log_env = std::env::var("ABSENCE_SCHEDULING_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "debug".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    // Example: honours ABSENCE_SCHEDULING_UTC_OFFSET, e.g. `-05:00`
    let cfg = Config::from_env()?;
    let normalizer = cfg.normalizer();
    let shift_start = normalizer.parse_time_from_string("730", None, None)?;
    let start_iso = timestamp_to_iso(&shift_start);

    for typed in std::env::args().skip(1) {
        let end = normalizer.parse_time_from_string(&typed, Some(&start_iso), None)?;
        println!("{typed:>8} -> {}", timestamp_to_iso(&end));
    }
    Ok(())
}
