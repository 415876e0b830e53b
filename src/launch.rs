//! Starting applications and free-text commands.
//!
//! An entry is launched by trying, in order:
//!
//! 1. its own launch handle (the `Exec=` line),
//! 2. the launch helper with the entry id (`gtk-launch <id>`),
//! 3. the same helper wrapped in a session-bus bootstrapper
//!    (`dbus-launch gtk-launch <id>`).
//!
//! Each failure is recorded and the next attempt is tried; only when all
//! of them fail does the caller see a [`LaunchError`].

use crate::entry::AppEntry;
use crate::traits::Spawner;
use log::debug;
use std::fmt;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

/// Which attempt of the fallback chain succeeded (or failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMethod {
    Native,
    Helper,
    BusHelper,
}

impl fmt::Display for LaunchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchMethod::Native => write!(f, "native"),
            LaunchMethod::Helper => write!(f, "helper"),
            LaunchMethod::BusHelper => write!(f, "bus helper"),
        }
    }
}

/// External programs used by the fallback chain and free-text activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Helper invoked as `<helper> <id>`.
    pub helper: String,
    /// Wrapper invoked as `<bus_bootstrapper> <helper> <id>`.
    pub bus_bootstrapper: String,
    /// Argv prefix for free-text commands; the query is appended.
    pub shell: Vec<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            helper: "gtk-launch".into(),
            bus_bootstrapper: "dbus-launch".into(),
            shell: vec!["sh".into(), "-c".into()],
        }
    }
}

/// Every attempt in the chain failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to launch {name}: {}", summarize(.failures))]
pub struct LaunchError {
    pub name: String,
    pub failures: Vec<(LaunchMethod, String)>,
}

fn summarize(failures: &[(LaunchMethod, String)]) -> String {
    failures
        .iter()
        .map(|(method, reason)| format!("{}: {}", method, reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// One labelled, fallible step.
pub type Attempt<'a, K, E> = (K, Box<dyn FnOnce() -> Result<(), E> + 'a>);

/// Label a fallible step.
pub fn attempt<'a, K, E>(label: K, step: impl FnOnce() -> Result<(), E> + 'a) -> Attempt<'a, K, E> {
    let boxed: Box<dyn FnOnce() -> Result<(), E> + 'a> = Box::new(step);
    (label, boxed)
}

/// Run `attempts` in order and stop at the first success.
///
/// Returns the label of the attempt that succeeded, or every failure in
/// order if none did.
pub fn first_success<K, E>(attempts: Vec<Attempt<'_, K, E>>) -> Result<K, Vec<(K, E)>> {
    let mut failures = Vec::new();
    for (label, step) in attempts {
        match step() {
            Ok(()) => return Ok(label),
            Err(e) => failures.push((label, e)),
        }
    }
    Err(failures)
}

/// Launch `entry` through the fallback chain.
pub fn launch_entry<S: Spawner>(
    entry: &AppEntry,
    spawner: &S,
    options: &LaunchOptions,
) -> Result<LaunchMethod, LaunchError> {
    let helper_argv = vec![options.helper.clone(), entry.id.clone()];
    let bus_argv = vec![
        options.bus_bootstrapper.clone(),
        options.helper.clone(),
        entry.id.clone(),
    ];

    let attempts = vec![
        attempt(LaunchMethod::Native, || spawner.spawn_entry(entry)),
        attempt(LaunchMethod::Helper, || spawner.spawn(&helper_argv)),
        attempt(LaunchMethod::BusHelper, || spawner.spawn(&bus_argv)),
    ];

    first_success(attempts).map_err(|failures| LaunchError {
        name: entry.name.clone(),
        failures: failures
            .into_iter()
            .map(|(method, e)| (method, e.to_string()))
            .collect(),
    })
}

/// Run free text as a shell command, detached.
pub fn spawn_query<S: Spawner>(
    query: &str,
    spawner: &S,
    options: &LaunchOptions,
) -> Result<(), S::Error> {
    let mut argv = options.shell.clone();
    argv.push(query.to_string());
    debug!("spawning free-text command {:?}", argv);
    spawner.spawn(&argv)
}

/// Remove freedesktop field codes (`%f`, `%U`, …) from an `Exec=` value.
/// `%%` becomes a literal `%`.
pub fn strip_field_codes(exec: &str) -> String {
    exec.split_whitespace()
        .filter_map(|token| {
            let mut out = String::with_capacity(token.len());
            let mut chars = token.chars();
            while let Some(c) = chars.next() {
                if c != '%' {
                    out.push(c);
                    continue;
                }
                match chars.next() {
                    Some('%') => out.push('%'),
                    Some(_) | None => {}
                }
            }
            (!out.is_empty()).then_some(out)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

//  System spawner

/// Errors from [`SystemSpawner`].
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("{0} has no Exec line")]
    NoExec(String),
    #[error("empty command")]
    EmptyCommand,
    #[error("failed to spawn {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// [`Spawner`] backed by `std::process`.
///
/// Children get null stdio and their own process group, and are never
/// waited on.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpawner;

impl SystemSpawner {
    fn detached(program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0);
        cmd
    }

    fn run(mut cmd: Command, program: &str) -> Result<(), SpawnError> {
        cmd.spawn().map(drop).map_err(|source| SpawnError::Io {
            program: program.to_string(),
            source,
        })
    }
}

impl Spawner for SystemSpawner {
    type Error = SpawnError;

    fn spawn_entry(&self, entry: &AppEntry) -> Result<(), SpawnError> {
        let exec = entry
            .exec
            .as_deref()
            .ok_or_else(|| SpawnError::NoExec(entry.id.clone()))?;
        let command_line = strip_field_codes(exec);
        if command_line.is_empty() {
            return Err(SpawnError::EmptyCommand);
        }
        let mut cmd = Self::detached("sh");
        cmd.arg("-c").arg(&command_line);
        if let Some(dir) = entry.working_dir.as_ref().filter(|d| d.is_dir()) {
            cmd.current_dir(dir);
        }
        debug!("launching {} via `{}`", entry.id, command_line);
        Self::run(cmd, "sh")
    }

    fn spawn(&self, argv: &[String]) -> Result<(), SpawnError> {
        let (program, args) = argv.split_first().ok_or(SpawnError::EmptyCommand)?;
        let mut cmd = Self::detached(program);
        cmd.args(args);
        Self::run(cmd, program)
    }
}
