//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};
use zuper_client::CredentialOverrides;

use crate::services::DispatchPreferences;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Zuper API key, used ahead of ZUPER_API_KEY
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Zuper base URL (e.g. https://us.zuperpro.com), used ahead of ZUPER_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

impl Cli {
    pub fn overrides(&self) -> CredentialOverrides {
        CredentialOverrides {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Dispatch a single job
    Single {
        /// Job UID
        job_uid: String,
        /// Preferred date (YYYY-MM-DD)
        #[arg(long)]
        preferred_date: Option<String>,
    },
    /// Dispatch several jobs in one run
    Batch {
        /// Job UIDs
        #[arg(required = true, num_args = 1..)]
        job_uids: Vec<String>,
        /// Skip workload balancing across the batch
        #[arg(long)]
        no_optimize: bool,
    },
    /// Dispatch every unassigned job
    Auto,
    /// Dispatch a job with constraints
    Preferences {
        /// Job UID
        job_uid: String,
        /// Preferred technician (user UID or name)
        #[arg(long)]
        technician: Option<String>,
        /// Preferred date (YYYY-MM-DD)
        #[arg(long)]
        preferred_date: Option<String>,
        /// Required skill, repeatable
        #[arg(long = "skill")]
        skills: Vec<String>,
        /// Only technicians with fewer current jobs than this
        #[arg(long)]
        max_workload: Option<u32>,
    },
    /// Recommend a technician without the model; never assigns
    Rank {
        /// Job UID; defaults to the first unassigned job
        job_uid: Option<String>,
    },
    /// Print the tool catalog
    Tools {
        /// Only the tools the dispatcher may call
        #[arg(long)]
        agent: bool,
    },
    /// Run the MCP and dispatch HTTP server
    Serve {
        /// Bind address, overrides HOST
        #[arg(long)]
        host: Option<String>,
        /// Port, overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Commands {
    /// Preferences carried by a `preferences` command.
    pub fn preferences(&self) -> Option<DispatchPreferences> {
        match self {
            Commands::Preferences {
                technician,
                preferred_date,
                skills,
                max_workload,
                ..
            } => Some(DispatchPreferences {
                preferred_technician: technician.clone(),
                preferred_date: preferred_date.clone(),
                required_skills: skills.clone(),
                max_workload: *max_workload,
            }),
            _ => None,
        }
    }
}
