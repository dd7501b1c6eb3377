use clap::{Args, Subcommand};

/// Main CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with the configured Telegram launch data
    Login,

    /// Forget the stored token
    Logout,

    /// Show the authenticated user's profile
    Whoami {
        /// Fail on an expired session instead of refreshing it
        #[arg(long)]
        silent: bool,
    },

    /// Show another user's public profile
    User {
        /// User ID
        id: String,
    },

    /// Manage your profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Manage test tasks
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Rewrite a task description with AI
    Improve {
        /// Description to improve
        text: String,
    },

    /// Get suggestions for AJTBD quiz answers
    Refine {
        #[command(flatten)]
        answers: QuizAnswers,
    },

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Update profile fields; omitted fields are left unchanged
    Update(ProfileFields),
}

#[derive(Args, Debug, Default)]
pub struct ProfileFields {
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub language: Option<String>,
    /// Avatar URL
    #[arg(long)]
    pub avatar: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TaskAction {
    /// List your tasks
    List,

    /// Create a task
    Create {
        #[arg(long)]
        title: String,

        #[command(flatten)]
        fields: TaskFields,
    },

    /// Update a task
    Update {
        /// Task ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: TaskFields,
    },
}

#[derive(Args, Debug, Default)]
pub struct TaskFields {
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub ranking_criteria: Option<String>,
    #[arg(long)]
    pub time_limit: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// Project the task belongs to
    #[arg(long = "project")]
    pub project_id: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ProjectAction {
    /// List your projects
    List,

    /// Show a project with its client, tasks and candidates
    Show {
        /// Project ID
        id: String,
    },

    /// Create a project
    Create {
        #[arg(long)]
        title: String,

        /// Client the project is for
        #[arg(long = "client")]
        client_id: String,

        #[command(flatten)]
        fields: ProjectFields,
    },

    /// Update a project
    Update {
        /// Project ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long = "client")]
        client_id: Option<String>,

        #[command(flatten)]
        fields: ProjectFields,
    },
}

#[derive(Args, Debug, Default)]
pub struct ProjectFields {
    #[arg(long)]
    pub description: Option<String>,
    /// Deadline, as accepted by the API (e.g. 2026-12-31)
    #[arg(long)]
    pub final_date: Option<String>,
    /// Whether candidates can join with the access code
    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(Args, Debug)]
pub struct QuizAnswers {
    #[arg(long)]
    pub problem: String,
    #[arg(long)]
    pub context: String,
    #[arg(long)]
    pub expected_outcome: String,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the config file path
    Path,
}
