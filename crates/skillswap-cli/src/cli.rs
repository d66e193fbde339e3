use clap::{Parser, Subcommand};

/// Skillswap - trade what you know for what you want to learn.
#[derive(Debug, Parser)]
#[command(name = "skillswap", version, about)]
pub struct Cli {
    /// Backend base address (overrides config and SKILLSWAP_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print data as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session on this device.
    Login {
        #[arg(long, short)]
        username: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Show who is signed in.
    Whoami,
    /// Create an account.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        bio: Option<String>,
    },
    /// Browse skills.
    Skills {
        /// Only skills in this category.
        #[arg(long)]
        category: Option<String>,
        /// Only skills you offer.
        #[arg(long, conflicts_with = "category")]
        mine: bool,
    },
    /// Manage the skills you offer.
    #[command(subcommand)]
    Skill(SkillCommand),
    /// Ask for an exchange on someone's skill.
    Request {
        skill_id: i64,
        #[arg(long, short)]
        message: String,
    },
    /// List exchange requests you sent or received.
    Requests,
    /// Answer an exchange request for one of your skills.
    Respond {
        request_id: i64,
        /// pending, accepted, rejected or completed
        status: String,
    },
    /// Withdraw an exchange request.
    Withdraw { request_id: i64 },
    /// Show notifications.
    Notifications {
        /// Mark this notification as read.
        #[arg(long)]
        read: Option<i64>,
    },
    /// Summary of your skills, requests and notifications.
    Dashboard,
}

#[derive(Debug, Subcommand)]
pub enum SkillCommand {
    /// Offer a new skill.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        /// Beginner, Intermediate, Advanced or Expert
        #[arg(long)]
        proficiency: String,
        /// Experience points, 0-1000.
        #[arg(long)]
        value: Option<i32>,
    },
    /// Change one of your skills.
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        proficiency: Option<String>,
        #[arg(long)]
        value: Option<i32>,
        /// Hide or show the skill in listings.
        #[arg(long)]
        active: Option<bool>,
    },
    /// Remove one of your skills.
    Delete { id: i64 },
}
