use clap::{Parser, Subcommand};
use provisioner::{activation_script, Profile, Provisioner, ProvisionerConfig};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "geovenv")]
#[command(about = "Provision geospatial Python virtual environments")]
struct Cli {
    /// Root directory for environments (default ./venvs)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an environment and install a profile's packages into it
    Provision {
        /// Profile to install: arcpy, pyqgis, gdal, postgis, or comprehensive
        profile: Profile,
        /// Environment name (defaults to "<profile>-venv")
        #[arg(short, long)]
        name: Option<String>,
        /// Interpreter used to create the environment
        #[arg(short, long)]
        python: Option<PathBuf>,
    },
    /// List environments under the root directory
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete a named environment
    Remove {
        /// Environment name
        name: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(if cli.verbose { "debug" } else { "info" })
        });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => ProvisionerConfig::load(path)?,
        None => ProvisionerConfig::default(),
    };
    if let Some(root) = cli.root {
        config = config.with_root_dir(root);
    }
    if cli.verbose {
        config = config.with_verbose(true);
    }

    let provisioner = Provisioner::new(config);

    match cli.command {
        Commands::Provision {
            profile,
            name,
            python,
        } => {
            provision(&provisioner, profile, name.as_deref(), python.as_deref())?;
        }
        Commands::List { json } => {
            list_environments(&provisioner, json)?;
        }
        Commands::Remove { name } => {
            remove_environment(&provisioner, &name)?;
        }
    }

    Ok(())
}

fn provision(
    provisioner: &Provisioner,
    profile: Profile,
    name: Option<&str>,
    python: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Provisioning '{}' profile ({} packages)...",
        profile,
        profile.packages().len()
    );

    match provisioner.provision(profile, name, python) {
        Ok(report) => {
            if report.already_existed {
                println!(
                    "Environment already existed, installed into it: {}",
                    report.env_path.display()
                );
            }
            println!("✓ Environment ready: {}", report.env_path.display());
            println!("  Interpreter: {}", report.interpreter.display());
            match &report.manifest {
                Some(path) => println!("  Manifest: {}", path.display()),
                None => println!("  Manifest: not written (see log)"),
            }
            println!(
                "  Activate with: source {}",
                activation_script(&report.env_path).display()
            );
            Ok(())
        }
        Err(e) => {
            error!("Provisioning failed: {}", e);
            println!("✗ Provisioning failed: {}", e);
            Err(e.into())
        }
    }
}

fn list_environments(
    provisioner: &Provisioner,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = provisioner.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!(
            "No environments found under {}",
            provisioner.config().root_dir.display()
        );
    } else {
        println!("Environments under {}:", provisioner.config().root_dir.display());
        for entry in entries {
            let marker = if entry.valid { "✓" } else { "✗" };
            println!("  {} {} ({})", marker, entry.name, entry.path.display());
        }
    }

    Ok(())
}

fn remove_environment(
    provisioner: &Provisioner,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match provisioner.remove(name) {
        Ok(()) => {
            println!("✓ Removed environment: {}", name);
            Ok(())
        }
        Err(e) => {
            error!("Removal failed: {}", e);
            println!("✗ {}", e);
            Err(e.into())
        }
    }
}
