use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, info};

use super::statement::{Dialect, Statement};
use super::{Executor, TransportError};

/// Where the SSH private key comes from.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Key material held in memory (e.g. from `EC2_PRIVATE_KEY`).
    Inline(String),
    /// Key file already on disk.
    Path(PathBuf),
}

/// Jump host the mysql client runs on.
#[derive(Debug, Clone)]
pub struct SshTarget {
    pub host: String,
    pub user: String,
    pub port: Option<u16>,
    pub key: KeySource,
}

/// Credentials for the mysql client on the jump host.
#[derive(Debug, Clone)]
pub struct MysqlLogin {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Runs each statement with `mysql --batch` on a remote host over the system
/// `ssh` client. Every call opens its own connection and tears it down before
/// returning, so nothing outlives a single user action.
pub struct SshExecutor {
    target: SshTarget,
    login: MysqlLogin,
    program: String,
}

/// Lines of client option file streamed ahead of the SQL on stdin.
const OPTION_FILE_LINES: usize = 4;

impl SshExecutor {
    pub fn new(target: SshTarget, login: MysqlLogin) -> Self {
        Self {
            target,
            login,
            program: "ssh".to_string(),
        }
    }

    /// Use a different ssh binary (tests, wrappers).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn build_command(&self, key_path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-o", "BatchMode=yes"])
            .args(["-o", "StrictHostKeyChecking=accept-new"])
            .args(["-o", "ConnectTimeout=15"])
            .arg("-i")
            .arg(key_path);
        if let Some(port) = self.target.port {
            cmd.arg("-p").arg(port.to_string());
        }
        cmd.arg(format!("{}@{}", self.target.user, self.target.host))
            .arg(remote_command(&self.login.database))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Executor for SshExecutor {
    fn name(&self) -> &str {
        "ssh"
    }

    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn execute(&self, statement: &Statement) -> Result<String, TransportError> {
        let sql = statement.to_mysql()?;
        let start = Instant::now();

        // Held until the process exits; the temp file is removed on drop.
        let key = KeyFile::materialize(&self.target.key)?;

        debug!(
            "ssh: {}@{} running {} byte statement",
            self.target.user,
            self.target.host,
            sql.len()
        );

        let mut child = self
            .build_command(key.path())
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let mut payload = option_file(&self.login);
            payload.push_str(sql.trim_end().trim_end_matches(';'));
            payload.push_str(";\n");
            // A process that dies early closes its stdin; the exit status below says why.
            if let Err(e) = stdin.write_all(payload.as_bytes()) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
                debug!("ssh: remote side closed stdin early");
            }
        }

        let output = child.wait_with_output()?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let errors = significant_stderr(&stderr);

        if !output.status.success() || !errors.is_empty() {
            return Err(TransportError::Remote {
                status: output.status.to_string(),
                stderr: if errors.is_empty() {
                    stderr.trim().to_string()
                } else {
                    errors
                },
            });
        }

        let stdout = String::from_utf8(output.stdout)?;
        info!(
            "ssh: {} bytes from {} in {:.1}s",
            stdout.len(),
            self.target.host,
            start.elapsed().as_secs_f64()
        );
        Ok(stdout)
    }
}

enum KeyFile<'a> {
    Temp(tempfile::NamedTempFile),
    Existing(&'a Path),
}

impl<'a> KeyFile<'a> {
    fn materialize(source: &'a KeySource) -> Result<Self, TransportError> {
        match source {
            KeySource::Path(path) => Ok(KeyFile::Existing(path)),
            KeySource::Inline(material) => {
                // NamedTempFile is created 0600, which ssh insists on
                let mut file = tempfile::Builder::new()
                    .prefix("castsearch-key-")
                    .tempfile()?;
                file.write_all(material.trim_end().as_bytes())?;
                file.write_all(b"\n")?;
                file.flush()?;
                Ok(KeyFile::Temp(file))
            }
        }
    }

    fn path(&self) -> &Path {
        match self {
            KeyFile::Temp(file) => file.path(),
            KeyFile::Existing(path) => path,
        }
    }
}

/// Shell program run on the jump host. The first lines of stdin are copied
/// into a private option file so the password never appears in any process
/// listing; the rest of stdin is the SQL.
fn remote_command(database: &str) -> String {
    let script = format!(
        "umask 077\n\
         f=$(mktemp) || exit 1\n\
         n=0\n\
         while [ \"$n\" -lt {OPTION_FILE_LINES} ]; do IFS= read -r l; printf '%s\\n' \"$l\"; n=$((n+1)); done > \"$f\"\n\
         mysql --defaults-extra-file=\"$f\" --batch {}\n\
         s=$?\n\
         rm -f \"$f\"\n\
         exit $s\n",
        shell_quote(database)
    );
    format!("sh -c {}", shell_quote(&script))
}

fn option_file(login: &MysqlLogin) -> String {
    format!(
        "[client]\nuser={}\npassword={}\nhost={}\n",
        option_value(&login.user),
        option_value(&login.password),
        option_value(&login.host)
    )
}

/// Double-quoted option file value; the client unescapes `\\` and `\"`.
fn option_value(v: &str) -> String {
    let escaped = v
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

/// POSIX single-quote a word.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Stderr with mysql warning lines removed. The client warns about things
/// like insecure option files on every run; those are not failures.
fn significant_stderr(stderr: &str) -> String {
    let mut kept = Vec::new();
    for line in stderr.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.contains("Warning") {
            debug!("ssh: ignoring remote warning: {line}");
            continue;
        }
        kept.push(line);
    }
    kept.join("\n")
}
