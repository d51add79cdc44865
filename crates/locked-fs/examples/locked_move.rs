//! Example: moving a file under an advisory lock
//!
//! Run with: `RUST_LOG=debug cargo run -p locked-fs --example locked_move`

use locked_fs::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let dir = tempfile::tempdir()?;
    let inbox = dir.path().join("job-1.json");
    let claimed = dir.path().join("job-1.claimed.json");
    std::fs::write(&inbox, br#"{"job": 1}"#)?;

    // Default executor: 30 attempts for faulting operations
    if move_file(&inbox, &claimed) {
        println!("Moved {} -> {}", inbox.display(), claimed.display());
    }

    // Moving again fails: the source is gone, so the file cannot be opened
    let again = move_file(&inbox, &claimed);
    println!("Second move succeeded: {again}");

    // A custom operation with a short retry ceiling and a fixed delay
    let executor = LockedExecutor::builder()
        .max_attempts(3)
        .backoff(Backoff::Fixed(std::time::Duration::from_millis(10)))
        .build()?;

    let outcome = executor.run(
        &claimed,
        from_fn(|file| {
            println!("Holding lock on a {} byte file", file.metadata()?.len());
            Ok(())
        }),
    )?;
    println!("Outcome: {outcome:?}");

    Ok(())
}
