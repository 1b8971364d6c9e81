use clap::{Args, Parser, Subcommand};
use kinema_client::catalog::ClassSort;
use kinema_model::{Difficulty, SchoolClass};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "kinemactl", version)]
#[command(about = "Browse, solve and manage Kinema physics tasks from the terminal")]
pub struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "KINEMA_SERVER_URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session tokens
    Login(LoginArgs),
    /// Create an account and log into it
    Register(RegisterArgs),
    /// Forget the stored session
    Logout,
    /// Show the logged-in profile
    Whoami,
    /// List topics with their school class
    Topics,
    /// List published tasks, easiest first
    Tasks(TasksArgs),
    /// Show a single task
    Task {
        id: String,
    },
    /// Submit an answer to a task
    Submit {
        task_id: String,
        answer: String,
    },
    /// Show solved counts and completion
    Stats,
    /// Create a topic (admin)
    TopicCreate(TopicCreateArgs),
    /// Delete a topic (admin)
    TopicDelete {
        id: String,
    },
    /// Publish a draft task (admin)
    TaskPublish {
        id: String,
    },
    /// Delete a task (admin)
    TaskDelete {
        id: String,
    },
    /// List draft tasks (admin)
    Drafts,
    /// List registered users (admin)
    Users,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "KINEMA_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "KINEMA_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Name shown to other users
    #[arg(long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct TasksArgs {
    /// Case-insensitive title search
    #[arg(long)]
    pub search: Option<String>,
    /// Also match description and content
    #[arg(long, requires = "search")]
    pub full_text: bool,
    /// easy, medium, hard or extreme
    #[arg(long)]
    pub difficulty: Option<Difficulty>,
    /// Only tasks of this topic id
    #[arg(long)]
    pub topic: Option<String>,
    /// Order by school class: none, asc or desc
    #[arg(long, default_value = "none")]
    pub sort: ClassSort,
}

#[derive(Args, Debug)]
pub struct TopicCreateArgs {
    #[arg(long)]
    pub title: String,
    /// Grade 7 to 11, or SEVEN..ELEVEN
    #[arg(long)]
    pub class: SchoolClass,
}
