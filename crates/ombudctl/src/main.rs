//! Ombud Control - CLI client for the complaint desk
//!
//! Consumers file, track and confirm complaints; agents triage, record
//! resolutions and review the audit trail.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ombudctl::commands;

#[derive(Parser)]
#[command(name = "ombudctl")]
#[command(about = "Ombud - consumer complaint desk", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and start a session
    Login {
        /// Account email
        email: String,

        /// Daemon base URL (default http://127.0.0.1:5124)
        #[arg(long)]
        server: Option<String>,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// End the session and forget the stored credential
    Logout,

    /// Show the identity the session was issued for
    Whoami,

    /// File a new complaint
    Create {
        /// Category, e.g. "TechnicalIssue" or "Billing / Payments"
        #[arg(long)]
        category: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,
    },

    /// List complaints with search, filters and pagination
    List {
        /// Case-insensitive match on reference and title
        #[arg(long)]
        search: Option<String>,

        /// Exact status filter (Open, InProgress, Resolved, Closed)
        #[arg(long)]
        status: Option<String>,

        /// Exact category filter
        #[arg(long)]
        category: Option<String>,

        /// Exact priority filter (Low, Medium, High)
        #[arg(long)]
        priority: Option<String>,

        /// Page to show (1-indexed)
        #[arg(long)]
        page: Option<usize>,

        /// All tenant complaints (agent/admin) instead of just your own
        #[arg(long)]
        all: bool,

        /// Keep re-fetching and re-rendering
        #[arg(long)]
        watch: bool,
    },

    /// Show one complaint with its timeline
    Show {
        /// Complaint UUID or reference like #Ref-1001
        complaint: String,
    },

    /// Amend the title or description of your own open complaint
    Edit {
        complaint: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Record resolution notes, status, priority or assignee (agent)
    Resolve {
        complaint: String,

        /// Resolution notes
        #[arg(long)]
        notes: Option<String>,

        /// New status (InProgress, Resolved)
        #[arg(long)]
        status: Option<String>,

        /// Re-evaluated priority
        #[arg(long)]
        priority: Option<String>,

        /// Assignee display name
        #[arg(long)]
        assign: Option<String>,
    },

    /// Confirm a resolved complaint and rate the handling
    Confirm {
        complaint: String,

        /// Rating from 1 to 5
        #[arg(long)]
        rating: u8,

        /// Optional feedback text
        #[arg(long)]
        feedback: Option<String>,
    },

    /// Show the tenant audit trail (agent/admin)
    Audit {
        /// Page to show (1-indexed)
        #[arg(long)]
        page: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Login {
            email,
            server,
            password,
        } => commands::login(email, server, password).await,
        Commands::Logout => commands::logout().await,
        Commands::Whoami => commands::whoami().await,
        Commands::Create {
            category,
            title,
            description,
        } => commands::create(category, title, description).await,
        Commands::List {
            search,
            status,
            category,
            priority,
            page,
            all,
            watch,
        } => commands::list(search, status, category, priority, page, all, watch).await,
        Commands::Show { complaint } => commands::show(complaint).await,
        Commands::Edit {
            complaint,
            title,
            description,
        } => commands::edit(complaint, title, description).await,
        Commands::Resolve {
            complaint,
            notes,
            status,
            priority,
            assign,
        } => commands::resolve(complaint, notes, status, priority, assign).await,
        Commands::Confirm {
            complaint,
            rating,
            feedback,
        } => commands::confirm(complaint, rating, feedback).await,
        Commands::Audit { page } => commands::audit(page).await,
    }
}
