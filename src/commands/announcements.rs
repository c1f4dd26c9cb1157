use anyhow::{Result, bail};
use tracing::info;

use crate::cli::{AnnouncementsAction, AnnouncementsArgs};
use crate::commands::{open_store, output};

pub fn run(args: AnnouncementsArgs) -> Result<()> {
    let store = open_store(&args.data)?;

    match args.action {
        AnnouncementsAction::List { json } => {
            let announcements = store.list_announcements()?;
            if json {
                return output::write_json(&announcements);
            }

            let mut lines = Vec::with_capacity(announcements.len() * 2);
            for announcement in &announcements {
                lines.push(format!(
                    "{}\t{}\t{} ({})",
                    announcement.id,
                    announcement.created_at,
                    announcement.title,
                    announcement.author_name.as_deref().unwrap_or("Unknown")
                ));
                lines.push(format!("\t{}", announcement.message));
            }
            output::write_lines(lines)
        }
        AnnouncementsAction::Create {
            user_id,
            title,
            message,
        } => {
            let announcement = store.create_announcement(&user_id, &title, &message)?;
            info!(id = announcement.id, title = %announcement.title, "announcement created");
            Ok(())
        }
        AnnouncementsAction::Delete { id } => {
            if !store.delete_announcement(id)? {
                bail!("announcement {id} not found");
            }
            info!(id, "announcement deleted");
            Ok(())
        }
    }
}
