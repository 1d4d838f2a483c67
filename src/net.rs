use anyhow::{Context, Result, bail};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::utils::exec::{CapturedOutput, CommandRunner};
use crate::utils::hostname::hostnames_match;
use crate::utils::http::UriFetcher;
use crate::utils::string::{format_remote_path, single_quote};
use crate::utils::system::SystemProbe;
use crate::utils::tool::ToolLocator;

/// Flags passed to every rsync invocation, ahead of caller flags
pub const RSYNC_BASE_FLAGS: &[&str] = &["-rHlv", "-O", "--no-perms", "--no-owner", "--no-group"];

/// Caller flags used when none are given
pub const RSYNC_DEFAULT_FLAGS: &[&str] = &["--ignore-existing"];

const BANNER_RULE: &str =
    "////////////////////////////////////////////////////////////////////////////////";

/// Options for [`Net::curl_form_data`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlOptions {
    /// Discard curl's stdout and stderr
    pub quiet: bool,
}

/// Network helpers for moving artifacts between hosts.
///
/// Every operation composes a single command line, resolves the tool it
/// needs through the [`ToolLocator`] and hands the line to the
/// [`CommandRunner`]. Nothing is retried.
pub struct Net<'a> {
    tools: &'a dyn ToolLocator,
    runner: &'a dyn CommandRunner,
    system: &'a dyn SystemProbe,
    fetcher: &'a dyn UriFetcher,
}

impl<'a> Net<'a> {
    pub fn new(
        tools: &'a dyn ToolLocator,
        runner: &'a dyn CommandRunner,
        system: &'a dyn SystemProbe,
        fetcher: &'a dyn UriFetcher,
    ) -> Self {
        Self {
            tools,
            runner,
            system,
            fetcher,
        }
    }

    /// Download `uri` into `target`.
    ///
    /// Does nothing when the directory holding `target` is not writable.
    pub fn fetch_uri(&self, uri: &str, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        if !self.system.is_writable(dir) {
            tracing::warn!(
                dir = %dir.display(),
                uri,
                "target directory is not writable, skipping fetch"
            );
            return Ok(());
        }

        // A failed fetch must leave an existing target untouched
        let mut file = temp_file_in(dir)
            .with_context(|| format!("Failed to open a temporary file in {}", dir.display()))?;
        let written = self.fetcher.fetch_to(uri, file.as_file_mut())?;
        file.as_file_mut()
            .flush()
            .with_context(|| format!("Failed to write {}", target.display()))?;
        file.persist(target)
            .with_context(|| format!("Failed to move download into {}", target.display()))?;
        tracing::debug!(uri, target = %target.display(), bytes = written, "fetched");
        Ok(())
    }

    pub fn hostname(&self) -> Result<String> {
        self.system.hostname()
    }

    /// Verify we are running on `expected`. A mismatch is only an error when `required`.
    pub fn check_host(&self, expected: &str, required: bool) -> Result<()> {
        let current = self.hostname()?;
        if hostnames_match(expected, &current) {
            return Ok(());
        }
        if required {
            bail!(
                "Current host '{}' does not match required host '{}'",
                current,
                expected
            );
        }
        tracing::debug!(expected, current = %current, "host mismatch ignored");
        Ok(())
    }

    /// Run `cmd` on `host` over ssh.
    ///
    /// Returns the captured output when `capture_output` is set, `None` otherwise.
    pub fn remote_ssh_cmd(
        &self,
        host: &str,
        cmd: &str,
        capture_output: bool,
    ) -> Result<Option<CapturedOutput>> {
        let ssh = self.tools.check_tool("ssh")?;
        let command = format!("{} -t {} {}", ssh.display(), host, single_quote(cmd));
        tracing::debug!(host, command = %command, "remote ssh command");

        let (success, captured) = if capture_output {
            let output = self.runner.capture(&command)?;
            (output.success(), Some(output))
        } else {
            (self.runner.ex(&command)?, None)
        };

        if !success {
            bail!("Remote ssh command failed. ({} on {})", cmd, host);
        }
        Ok(captured)
    }

    /// Push `source` to `host:dest`. `flags` of `None` means [`RSYNC_DEFAULT_FLAGS`].
    pub fn rsync_to(
        &self,
        source: &str,
        host: &str,
        dest: &str,
        flags: Option<&[String]>,
    ) -> Result<()> {
        let remote = format_remote_path(host, dest);
        let defaults: Vec<String> = RSYNC_DEFAULT_FLAGS.iter().map(|f| f.to_string()).collect();
        self.rsync(source, &remote, flags.unwrap_or(&defaults))
    }

    /// Pull `host:source` into local `dest`. `flags` of `None` means no extra flags.
    pub fn rsync_from(
        &self,
        source: &str,
        host: &str,
        dest: &str,
        flags: Option<&[String]>,
    ) -> Result<()> {
        let remote = format_remote_path(host, source);
        self.rsync(&remote, dest, flags.unwrap_or(&[]))
    }

    fn rsync(&self, from: &str, to: &str, flags: &[String]) -> Result<()> {
        let rsync = self.tools.check_tool("rsync")?;

        let mut parts = vec![rsync.display().to_string()];
        parts.extend(RSYNC_BASE_FLAGS.iter().map(|f| f.to_string()));
        parts.extend(flags.iter().cloned());
        parts.push(from.to_string());
        parts.push(to.to_string());

        let command = parts.join(" ");
        if !self.runner.ex(&command)? {
            bail!("Rsync command failed. ({} -> {})", from, to);
        }
        Ok(())
    }

    /// Post form fields to `uri` with curl. Failure is reported as `Ok(false)`.
    pub fn curl_form_data(
        &self,
        uri: &str,
        form_data: &[String],
        options: CurlOptions,
    ) -> Result<bool> {
        let curl = self.tools.check_tool("curl")?;

        let mut parts = vec![curl.display().to_string(), "-i".to_string()];
        parts.extend(form_data.iter().cloned());
        parts.push(uri.to_string());
        if options.quiet {
            parts.push(">/dev/null 2>&1".to_string());
        }

        let command = parts.join(" ");
        let success = self.runner.ex(&command)?;
        if !success {
            tracing::warn!(uri, "curl form post failed");
        }
        Ok(success)
    }

    /// Print the "build submitted" banner for `uri` to stdout
    pub fn print_url_info(&self, uri: &str) -> io::Result<()> {
        write_url_info(&mut io::stdout().lock(), uri)
    }

    /// Hosts from `hosts` that do not accept a non-interactive ssh login
    pub fn check_host_ssh(&self, hosts: &[String]) -> Result<Vec<String>> {
        let ssh = self.tools.check_tool("ssh")?;
        let mut unreachable = Vec::new();

        for host in hosts {
            let command = format!(
                "{} -o BatchMode=yes -o ConnectTimeout=10 {} {}",
                ssh.display(),
                host,
                single_quote("exit")
            );
            let reachable = match self.runner.capture(&command) {
                Ok(output) => output.success(),
                Err(e) => {
                    tracing::debug!(host = %host, error = %e, "ssh check could not run");
                    false
                }
            };
            if !reachable {
                tracing::warn!(host = %host, "host is not reachable over ssh");
                unreachable.push(host.clone());
            }
        }

        Ok(unreachable)
    }

    /// HTTP status code for `uri`
    pub fn uri_status_code(&self, uri: &str) -> Result<u16> {
        self.fetcher.status_code(uri)
    }
}

/// Temporary file in `dir`, created with the same mode `File::create` would use
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".relnet-fetch");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

/// Build the "build submitted" banner for `uri`
pub fn url_info_banner(uri: &str) -> String {
    format!(
        "\n{rule}\n\n\n  Build submitted. To view your build progress, go to\n{uri}\n\n\n{rule}\n\n",
        rule = BANNER_RULE,
        uri = uri
    )
}

/// Write the "build submitted" banner for `uri` to `out`
pub fn write_url_info(out: &mut impl Write, uri: &str) -> io::Result<()> {
    out.write_all(url_info_banner(uri).as_bytes())?;
    out.flush()
}
