//! Example: several workers race to delete the same file
//!
//! Run with: `cargo run -p locked-fs --example contended_delete`

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use locked_fs::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let dir = tempfile::tempdir()?;
    let path = Arc::new(dir.path().join("shared.lock"));
    std::fs::write(path.as_path(), b"shared")?;

    let workers = 4;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|id| {
            let path = Arc::clone(&path);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let won = execute_with_lock(
                    path.as_path(),
                    from_fn(|file| {
                        // Keep the lock long enough for the others to collide
                        thread::sleep(Duration::from_millis(100));
                        DeleteFile::new(path.as_path()).run(file)
                    }),
                );
                (id, won)
            })
        })
        .collect();

    for handle in handles {
        let (id, won) = handle.join().map_err(|_| "worker panicked")?;
        println!("worker {id}: {}", if won { "deleted the file" } else { "lost the race" });
    }

    // Already gone: still reported as done
    println!("delete after the race: {}", delete_file(path.as_path()));

    Ok(())
}
