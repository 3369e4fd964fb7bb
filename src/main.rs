use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use usage_tracker::{summary, RollupDriver, TrackerConfig, TrackerGroup, Window};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Usage Tracker Demo ===\n");

    demo_basic_counting();
    demo_skewed_workload();
    demo_background_driver().await;

    println!("\n=== All demos completed ===");
}

fn demo_basic_counting() {
    println!("--- Demo 1: Basic Counting and Rollups ---");

    let group: TrackerGroup<&'static str> = TrackerGroup::new();

    let help = group.tracker("help").expect("valid key");
    help.increment();
    help.increment();
    help.increment();

    println!("  help: second={}", help.second_usages());

    // One tick closes the current second.
    group.tick();
    help.increment();
    help.increment();

    println!(
        "  after rollup: second={} minute={} total={}",
        help.second_usages(),
        help.minute_usages(),
        help.total_usages()
    );
    println!("  ✓ second rolled into the minute window\n");
}

fn demo_skewed_workload() {
    println!("--- Demo 2: Skewed Workload Leaderboard ---");

    let group: TrackerGroup<String> = TrackerGroup::new();
    let commands = ["help", "play", "queue", "skip", "stats", "ban"];
    let mut rng = rand::thread_rng();

    // Zipf-ish skew: command i is roughly twice as likely as command i+1.
    for _ in 0..10_000 {
        let mut idx = 0;
        while idx + 1 < commands.len() && rng.gen_bool(0.5) {
            idx += 1;
        }
        group
            .tracker(commands[idx].to_string())
            .expect("valid key")
            .increment();
    }

    println!("{}", indent(&summary(&group, Window::Total, 5)));

    let board = usage_tracker::leaderboard(&group, Window::Total, 3);
    println!(
        "  export: {}\n",
        serde_json::to_string(&board).expect("serializable leaderboard")
    );
}

async fn demo_background_driver() {
    println!("--- Demo 3: Background Rollup Driver ---");

    let config = TrackerConfig {
        tick_interval_ms: 20,
        ..TrackerConfig::default()
    };
    let group = Arc::new(TrackerGroup::<String>::with_config(&config).expect("valid config"));

    let driver = RollupDriver::new(Arc::clone(&group));
    let handle = driver.shutdown_handle();
    let task = tokio::spawn(driver.run());

    for _ in 0..10 {
        group
            .tracker("ping".to_string())
            .expect("valid key")
            .increment();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    handle.stop();
    task.await.expect("driver task");

    println!(
        "  ticks driven: {}, total counted: {}",
        group.tick_count(),
        group.total(Window::Total)
    );
    println!("  ✓ driver rolled windows in the background");
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
