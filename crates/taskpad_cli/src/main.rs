//! CLI smoke entry point.
//!
//! Verifies `taskpad_core` linkage and runs one task round-trip against an
//! in-memory slot database, without any UI shell.

use taskpad_core::db::open_db_in_memory;
use taskpad_core::{SqliteSlotRepository, TaskService};

fn main() {
    println!("taskpad_core ping={}", taskpad_core::ping());
    println!("taskpad_core version={}", taskpad_core::core_version());

    match open_db_in_memory() {
        Ok(conn) => {
            let mut service = TaskService::open(SqliteSlotRepository::new(&conn));
            let id = service.add_task("smoke");
            let toggled = service.toggle_task(id.as_str());
            println!(
                "taskpad_core tasks={} toggled={toggled}",
                service.tasks().len()
            );
        }
        Err(err) => {
            eprintln!("taskpad_core storage=error error={err}");
            std::process::exit(1);
        }
    }
}
