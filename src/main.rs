use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use relnet::config;
use relnet::net::{CurlOptions, Net};
use relnet::utils::string::single_quote;
use relnet::utils::{HttpFetcher, LocalSystem, PathTools, ShellRunner};

#[derive(Parser)]
#[command(name = "relnet")]
#[command(about = "Move release artifacts between hosts with ssh, rsync and curl", long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/relnet/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log every composed command
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a URI into a file (skipped if the directory is not writable)
    Fetch {
        uri: String,
        /// File to write
        target: PathBuf,
    },
    /// Print the hostname of this machine
    Hostname,
    /// Verify this machine is the expected host
    CheckHost {
        /// Hostname we are expected to run on
        expected: String,
        /// Only warn on mismatch instead of failing
        #[arg(long)]
        optional: bool,
    },
    /// Run a command on a remote host over ssh
    Ssh {
        host: String,
        /// Command to run remotely
        command: String,
        /// Capture and print the remote output instead of streaming it
        #[arg(long)]
        capture: bool,
    },
    /// Push a local path to host:dest with rsync
    RsyncTo {
        source: String,
        host: String,
        dest: String,
        #[command(flatten)]
        flags: RsyncFlags,
    },
    /// Pull host:source into a local path with rsync
    RsyncFrom {
        source: String,
        host: String,
        dest: String,
        #[command(flatten)]
        flags: RsyncFlags,
    },
    /// Post form fields to a URI with curl
    CurlForm {
        uri: String,
        /// Form field (name=value), may be repeated
        #[arg(long = "field", short = 'F')]
        fields: Vec<String>,
        /// Discard curl output
        #[arg(long, short = 'q')]
        quiet: bool,
    },
    /// Print the build-submitted banner for a URL
    UrlInfo { uri: String },
    /// Check that hosts accept non-interactive ssh logins
    CheckSsh {
        #[arg(required = true)]
        hosts: Vec<String>,
    },
    /// Print the HTTP status code of a URI
    Status { uri: String },
}

#[derive(Args)]
struct RsyncFlags {
    /// Extra rsync flag, may be repeated (rsync-to defaults to config's --ignore-existing)
    #[arg(long = "flag", allow_hyphen_values = true)]
    flag: Vec<String>,
    /// Pass no extra flags at all
    #[arg(long, conflicts_with = "flag")]
    no_flags: bool,
}

impl RsyncFlags {
    fn resolve(self, defaults: &[String]) -> Vec<String> {
        if self.no_flags {
            Vec::new()
        } else if self.flag.is_empty() {
            defaults.to_vec()
        } else {
            self.flag
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_config(cli.config.as_deref())?;
    let tools = PathTools::new(config.tools.clone());
    let runner = ShellRunner;
    let system = LocalSystem;
    let fetcher = HttpFetcher::new(config.http_timeout());
    let net = Net::new(&tools, &runner, &system, &fetcher);

    match cli.command {
        Commands::Fetch { uri, target } => net.fetch_uri(&uri, &target)?,
        Commands::Hostname => println!("{}", net.hostname()?),
        Commands::CheckHost { expected, optional } => {
            net.check_host(&expected, !optional)?;
        }
        Commands::Ssh {
            host,
            command,
            capture,
        } => {
            if let Some(output) = net.remote_ssh_cmd(&host, &command, capture)? {
                if !output.stdout.is_empty() {
                    println!("{}", output.stdout);
                }
                if !output.stderr.is_empty() {
                    eprintln!("{}", output.stderr);
                }
            }
        }
        Commands::RsyncTo {
            source,
            host,
            dest,
            flags,
        } => {
            let flags = flags.resolve(&config.rsync_flags);
            net.rsync_to(&source, &host, &dest, Some(&flags))?;
        }
        Commands::RsyncFrom {
            source,
            host,
            dest,
            flags,
        } => {
            let flags = flags.resolve(&[]);
            net.rsync_from(&source, &host, &dest, Some(&flags))?;
        }
        Commands::CurlForm { uri, fields, quiet } => {
            let form_data: Vec<String> = fields
                .iter()
                .map(|field| format!("-F {}", single_quote(field)))
                .collect();
            if !net.curl_form_data(&uri, &form_data, CurlOptions { quiet })? {
                bail!("Form post to {} failed", uri);
            }
        }
        Commands::UrlInfo { uri } => net.print_url_info(&uri)?,
        Commands::CheckSsh { hosts } => {
            let unreachable = net.check_host_ssh(&hosts)?;
            if !unreachable.is_empty() {
                bail!("Unable to ssh to: {}", unreachable.join(", "));
            }
            println!("✓ All {} host(s) reachable over ssh", hosts.len());
        }
        Commands::Status { uri } => println!("{}", net.uri_status_code(&uri)?),
    }

    Ok(())
}
