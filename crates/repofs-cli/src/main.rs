//! Repofs CLI - run one file-system operation against a remote store
//!
//! Usage:
//!   repofs --repo octocat/notes ls '/docs/*'     # List a directory
//!   repofs --repo octocat/notes cat /docs/a.md   # Print a file
//!   repofs --repo octocat/notes put /a.txt a.txt # Upload a local file
//!   echo hi | repofs --repo octocat/notes put /a.txt
//!   repofs --backend flat --endpoint http://localhost:8080 caps
//!
//! Set `RUST_LOG=repofs=debug` to see every remote call.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use repofs::{FileSystem, FlatConfig, FlatFs, FsError, GitHubConfig, GitHubFs, HttpConfig, catalog};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt};

/// Exit status for failures worth retrying (sysexits EX_TEMPFAIL).
const EXIT_TRANSIENT: i32 = 75;

/// Repofs - file-system operations over remote content stores
#[derive(Parser, Debug)]
#[command(name = "repofs")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend to bind
    #[arg(long, value_enum, env = "REPOFS_BACKEND", default_value = "github")]
    backend: Backend,

    /// Repository as owner/name (github backend)
    #[arg(long, env = "REPOFS_REPO")]
    repo: Option<String>,

    /// Access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Branch to operate on (github backend)
    #[arg(long, env = "REPOFS_BRANCH")]
    branch: Option<String>,

    /// API root (github backend)
    #[arg(long, env = "REPOFS_API_URL")]
    api_url: Option<String>,

    /// Base endpoint (flat backend)
    #[arg(long, env = "REPOFS_ENDPOINT")]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    Github,
    Flat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand a path or glob into virtual paths
    Ls {
        path: String,
        /// Long format
        #[arg(short, long)]
        long: bool,
    },
    /// Show attributes of a path
    Stat { path: String },
    /// Print a file to stdout
    Cat { path: String },
    /// Upload a local file (or stdin) to a path
    Put {
        path: String,
        /// Local file to send; stdin when omitted
        local: Option<PathBuf>,
    },
    /// Delete a file
    Rm { path: String },
    /// Create a directory
    Mkdir { path: String },
    /// Remove a directory
    Rmdir { path: String },
    /// Move a file
    Mv { from: String, to: String },
    /// List the operations the backend supports
    Caps,
}

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("repofs: {:#}", e);
        let transient = e
            .downcast_ref::<FsError>()
            .is_some_and(FsError::is_transient);
        std::process::exit(if transient { EXIT_TRANSIENT } else { 1 });
    }
}

async fn run(args: Args) -> Result<()> {
    let fs = connect(&args)?;
    let mut stdout = std::io::stdout().lock();
    execute(fs.as_ref(), args.command, &mut stdout).await
}

fn connect(args: &Args) -> Result<Box<dyn FileSystem>> {
    let http = HttpConfig::new().timeout(Duration::from_secs(args.timeout));
    match args.backend {
        Backend::Github => {
            let repo = args
                .repo
                .as_deref()
                .context("--repo (or REPOFS_REPO) is required for the github backend")?;
            let mut config = GitHubConfig::new(repo)?.http(http);
            if let Some(token) = &args.token {
                config = config.token(token);
            }
            if let Some(branch) = &args.branch {
                config = config.branch(branch);
            }
            if let Some(url) = &args.api_url {
                config = config.api_url(url);
            }
            tracing::debug!(?config, "binding github backend");
            Ok(Box::new(GitHubFs::from_config(&config)?))
        }
        Backend::Flat => {
            let endpoint = args
                .endpoint
                .as_deref()
                .context("--endpoint (or REPOFS_ENDPOINT) is required for the flat backend")?;
            let mut config = FlatConfig::new(endpoint).http(http);
            if let Some(token) = &args.token {
                config = config.token(token);
            }
            tracing::debug!(?config, "binding flat backend");
            Ok(Box::new(FlatFs::from_config(&config)?))
        }
    }
}

async fn execute(fs: &dyn FileSystem, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Ls { path, long } => {
            for entry in fs.dir(&path).await? {
                if long {
                    writeln!(out, "{}", fs.file_info(&entry).await?.ls_line())?;
                } else {
                    writeln!(out, "{}", entry)?;
                }
            }
        }
        Command::Stat { path } => {
            let info = fs.file_info(&path).await?;
            writeln!(out, "{}", info.ls_line())?;
        }
        Command::Cat { path } => {
            let content = fs.read(&path).await?;
            out.write_all(content.as_bytes())?;
        }
        Command::Put { path, local } => {
            let Some(writer) = fs.as_writer() else {
                bail!(catalog::unsupported("put"));
            };
            match local {
                Some(file) => {
                    let bytes = std::fs::read(&file)
                        .with_context(|| format!("Failed to read {}", file.display()))?;
                    writer.write(&path, &mut bytes.as_slice()).await?;
                }
                None => writer.write(&path, &mut tokio::io::stdin()).await?,
            }
        }
        Command::Rm { path } => {
            let Some(deleter) = fs.as_deleter() else {
                bail!(catalog::unsupported("rm"));
            };
            deleter.delete(&path).await?;
        }
        Command::Mkdir { path } => {
            let Some(dirs) = fs.as_directories() else {
                bail!(catalog::unsupported("mkdir"));
            };
            dirs.mkdir(&path).await?;
        }
        Command::Rmdir { path } => {
            let Some(dirs) = fs.as_directories() else {
                bail!(catalog::unsupported("rmdir"));
            };
            dirs.rmdir(&path).await?;
        }
        Command::Mv { from, to } => {
            let Some(renamer) = fs.as_renamer() else {
                bail!(catalog::unsupported("mv"));
            };
            renamer.rename(&from, &to).await?;
        }
        Command::Caps => {
            let caps = fs.capabilities();
            for (name, present) in [
                ("read", true),
                ("list", true),
                ("write", caps.write),
                ("delete", caps.delete),
                ("directories", caps.directories),
                ("rename", caps.rename),
            ] {
                writeln!(out, "{:<12} {}", name, if present { "yes" } else { "no" })?;
            }
        }
    }
    Ok(())
}
