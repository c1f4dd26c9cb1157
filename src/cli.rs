use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::TaskStatus;

#[derive(Parser, Debug)]
#[command(
    name = "deskreport",
    version,
    about = "Support desk reporting: per-person monthly reports, team-lead analytics, tasks and announcements"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a monthly workbook into one workbook per service person.
    Split(SplitArgs),
    /// Build the team-lead analytics workbook for a submitted month.
    Analytics(AnalyticsArgs),
    Reports(ReportsArgs),
    Tasks(TasksArgs),
    Announcements(AnnouncementsArgs),
    Profiles(ProfilesArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    #[arg(long, default_value = ".cache/deskreport")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// JSON file overriding column names and policy defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl DataArgs {
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.data_root.join("deskreport.sqlite"))
    }

    pub fn storage_root(&self) -> PathBuf {
        self.data_root.join("storage")
    }
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Source workbook (.xlsx).
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Where per-person workbooks are exported when not submitting.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Store the per-person reports and the original workbook instead of exporting.
    #[arg(long, default_value_t = false)]
    pub submit: bool,

    #[arg(long, default_value = "")]
    pub month: String,

    #[arg(long, default_value = "")]
    pub summary: String,

    #[arg(long)]
    pub user_id: Option<String>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyticsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[arg(long)]
    pub month: Option<String>,

    /// Print the months that have a stored original workbook and exit.
    #[arg(long, default_value_t = false)]
    pub list_months: bool,

    /// Also write the analytics workbook to this path.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ReportsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(subcommand)]
    pub action: ReportsAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReportsAction {
    List {
        #[arg(long)]
        user_id: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    Download {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        id: i64,

        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    Delete {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        id: i64,
    },
}

#[derive(Args, Debug, Clone)]
pub struct TasksArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[arg(long)]
    pub user_id: String,

    #[command(subcommand)]
    pub action: TasksAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TasksAction {
    List {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    Add {
        #[arg(long)]
        title: String,
    },
    SetStatus {
        #[arg(long)]
        id: i64,

        #[arg(long, value_enum)]
        status: TaskStatus,
    },
    ClearCompleted,
}

#[derive(Args, Debug, Clone)]
pub struct AnnouncementsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(subcommand)]
    pub action: AnnouncementsAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AnnouncementsAction {
    List {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    Create {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        message: String,
    },
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ProfilesArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(subcommand)]
    pub action: ProfilesAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfilesAction {
    Register {
        #[arg(long)]
        id: String,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        email: String,
    },
    List {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[command(flatten)]
    pub data: DataArgs,
}
