use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "taskboard", about = "Task-management API server")]
pub struct Cli {
    /// Path to a settings file overriding the build-profile default.
    #[arg(long)]
    pub settings: Option<String>,
}
