use clap::{Parser, Subcommand};

mod commands;
mod report;

#[derive(Parser)]
#[command(
    name = "fleetcheck",
    about = "fleetcheck — point-in-time fleet health audits for auto-scaling groups",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit an auto-scaling group's capacity, zone spread, configuration
    /// homogeneity, scheduled actions, and daily scaling activity.
    ///
    /// Credentials and region come from the standard AWS environment
    /// (env vars, profile, instance metadata); --region overrides the
    /// resolved region.
    Audit {
        /// Name of the auto-scaling group to audit
        asg_name: String,
        /// AWS region override
        #[arg(short, long)]
        region: Option<String>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fleetcheck=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Audit {
            asg_name,
            region,
            format,
        } => commands::audit::audit(&asg_name, region, &format).await,
    }
}
