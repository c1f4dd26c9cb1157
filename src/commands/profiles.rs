use anyhow::Result;
use tracing::info;

use crate::cli::{ProfilesAction, ProfilesArgs};
use crate::commands::{open_store, output};

pub fn run(args: ProfilesArgs) -> Result<()> {
    let store = open_store(&args.data)?;

    match args.action {
        ProfilesAction::Register { id, name, email } => {
            let profile = store.register_profile(&id, &name, &email)?;
            info!(id = %profile.id, name = %profile.name, "profile registered");
            Ok(())
        }
        ProfilesAction::List { json } => {
            let profiles = store.list_profiles()?;
            if json {
                return output::write_json(&profiles);
            }
            output::write_lines(
                profiles
                    .iter()
                    .map(|profile| format!("{}\t{}\t{}", profile.id, profile.name, profile.email)),
            )
        }
    }
}
