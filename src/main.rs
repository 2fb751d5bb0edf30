//! `keyspace_migrate` (ksm) - migrate, back up and restore a Redis keyspace.
//!
//! Each subcommand is one sequential pass driven through `redis-cli`.
//! No daemon, no retries, no parallelism.

use keyspace_migrate::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
