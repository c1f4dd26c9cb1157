use anyhow::{Result, bail};
use tracing::info;

use crate::cli::{TasksAction, TasksArgs};
use crate::commands::{load_config, open_store, output};

pub fn run(args: TasksArgs) -> Result<()> {
    let config = load_config(&args.data)?;
    let store = open_store(&args.data)?;
    let user_id = args.user_id.as_str();

    match args.action {
        TasksAction::List { json } => {
            let tasks = store.list_tasks(user_id)?;
            if json {
                return output::write_json(&tasks);
            }
            output::write_lines(
                tasks
                    .iter()
                    .map(|task| format!("{}\t[{}]\t{}", task.id, task.status, task.title)),
            )
        }
        TasksAction::Add { title } => {
            let task = store.add_task(user_id, &title, config.task_limit)?;
            info!(id = task.id, user_id, "task added");
            Ok(())
        }
        TasksAction::SetStatus { id, status } => {
            if !store.update_task_status(user_id, id, status)? {
                bail!("task {id} not found for {user_id}");
            }
            info!(id, status = %status, "task updated");
            Ok(())
        }
        TasksAction::ClearCompleted => {
            let deleted = store.delete_completed_tasks(user_id)?;
            info!(deleted, user_id, "cleared completed tasks");
            Ok(())
        }
    }
}
