use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::time::Duration;

use crate::clients::cuda::CudarcRuntime;
use crate::clients::unity::UnityEditorConnector;
use crate::core::gpu::CudaRuntime;
use crate::core::sim::SimConnector;
use crate::domain::{EnvError, FailureKind};
use crate::infra::config::{
    Config, ProbeSettings, DEFAULT_EDITOR_PORT, DEFAULT_STEER, DEFAULT_THROTTLE,
    DEFAULT_TIMEOUT_SECS,
};
use crate::infra::workspace;
use crate::probes;
use crate::probes::connection::{
    failure_headline, remediation, ConnectionProbe, ProbeSummary, NEXT_STEPS,
};

#[derive(Parser)]
#[command(name = "mlagents-probe")]
#[command(about = "Unity ML-Agents training diagnostics")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report CUDA availability and device metadata
    Cuda {
        /// Also render the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify a running Unity editor can be reached and driven for one step
    Connection {
        /// Rendezvous port the editor attaches to
        #[arg(short, long, env = "MLAGENTS_PORT", default_value_t = DEFAULT_EDITOR_PORT)]
        port: u16,
        /// Seconds to wait for the editor
        #[arg(long, env = "MLAGENTS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
        /// Seed forwarded to the editor in the handshake
        #[arg(long, default_value_t = 0)]
        seed: i32,
        /// Steering value of the test action
        #[arg(long, default_value_t = DEFAULT_STEER)]
        steer: f32,
        /// Throttle value of the test action
        #[arg(long, default_value_t = DEFAULT_THROTTLE)]
        throttle: f32,
        /// Also render the probe summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate configuration
    Config {
        /// Validate config without running a probe
        #[arg(long)]
        validate: bool,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    run_commands(cli.command).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Cuda { json } => match cuda_command(&CudarcRuntime::new(), json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("✗ CUDA query failed: {e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Connection {
            port,
            timeout_secs,
            seed,
            steer,
            throttle,
            json,
        } => {
            let settings = ProbeSettings {
                port,
                timeout: Duration::from_secs(timeout_secs),
                seed,
                steer,
                throttle,
            };
            let connector = UnityEditorConnector::new(settings.clone());
            match connection_command(&connector, &settings, json).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            }
        }
        Commands::Config { validate: _ } => match validate_config() {
            Ok(()) => {
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn cuda_command(runtime: &dyn CudaRuntime, json: bool) -> anyhow::Result<()> {
    let report = probes::cuda::build_report(runtime)?;
    print!("{}", probes::cuda::render(&report));
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

async fn connection_command(
    connector: &dyn SimConnector,
    settings: &ProbeSettings,
    json: bool,
) -> Result<ProbeSummary, EnvError> {
    print_preamble();
    warn_if_install_missing();

    let probe = ConnectionProbe::new(settings.clone());
    match probe.run(connector).await {
        Ok(summary) => {
            println!("\nIf you see action logs in the Unity Console, the connection is working.");
            if json {
                if let Ok(text) = serde_json::to_string_pretty(&summary) {
                    println!("{text}");
                }
            }
            Ok(summary)
        }
        Err(e) => {
            print_failure(&e);
            Err(e)
        }
    }
}

fn print_preamble() {
    let divider = "=".repeat(60);
    println!("{divider}");
    println!("Unity ML-Agents Connection Verification");
    println!("{divider}");
    println!("\n⚠ IMPORTANT: Before running this probe:");
    println!("  1. Open Unity and your scene");
    println!("  2. Make sure an ML-Agents Academy is in the scene");
    println!("  3. Make sure your agent GameObject has:");
    println!("     - An Agent component");
    println!("     - Behavior Parameters (Behavior Type = 'Default')");
    println!("     - A Decision Requester component");
    println!("  4. Press Play in Unity");
    println!("  5. Wait for 'Waiting for connection...' in the Unity Console");
}

fn warn_if_install_missing() {
    match workspace::locate_install() {
        Ok(path) => tracing::debug!(path = %path.display(), "ML-Agents install found"),
        Err(tried) => {
            println!("\nWarning: could not find the ML-Agents install at:");
            for candidate in &tried {
                println!("  {}", candidate.display());
            }
            println!(
                "\nMake sure you're running from the project root or the environment's Scripts directory"
            );
        }
    }
}

fn print_failure(error: &EnvError) {
    let kind = error.kind();
    match kind {
        FailureKind::Setup => eprintln!("\n✗ Probe setup failed: {error}"),
        _ => eprintln!("\n✗ Error connecting to Unity: {error}"),
    }
    println!("\n{}", failure_headline(kind));
    for item in remediation(kind) {
        println!("  - {item}");
    }
    if kind != FailureKind::Setup {
        println!("\nNext steps:");
        for item in NEXT_STEPS {
            println!("  - {item}");
        }
    }
}

fn validate_config() -> Result<(), Box<dyn std::error::Error>> {
    let _config = Config::from_env();

    if let Ok(port) = std::env::var("MLAGENTS_PORT") {
        if let Ok(parsed) = port.parse::<u16>() {
            if parsed == 0 {
                return Err("MLAGENTS_PORT cannot be 0".into());
            }
        }
    }

    if let Ok(timeout) = std::env::var("MLAGENTS_TIMEOUT_SECS") {
        if let Ok(parsed) = timeout.parse::<u64>() {
            if parsed == 0 {
                return Err("MLAGENTS_TIMEOUT_SECS cannot be 0".into());
            }
        }
    }

    Ok(())
}
