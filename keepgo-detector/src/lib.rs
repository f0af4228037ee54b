//! Init-system detection for `keepgo-detector`.
//!
//! Every probe is side-effect free: it checks files under the [`Host`] root,
//! looks executables up on the host's search path, or inspects the output of
//! a version command. Probes are safe to call speculatively and in any order;
//! a probe that cannot complete answers `false`.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use keepgo_core::{parse_version, version_at_most, Host, RunnerError, Version};
use regex::Regex;
use thiserror::Error;

/// cgroup membership of pid 1, scanned for container runtimes.
pub const CGROUP_FILE: &str = "/proc/1/cgroup";

const CGROUP_SCAN_LINES: usize = 5;
const CONTAINER_MARKERS: &[&str] = &["docker", "lxc"];

/// Minimum systemd release that accepts `StandardOutput=file:`.
pub const SYSTEMD_OUTPUT_FILE_SINCE: u64 = 236;
/// Upstart releases up to this one lack the `kill signal` stanza.
pub const UPSTART_NO_KILL_SIGNAL_UP_TO: Version = Version::new(0, 6, 5);
/// Upstart releases up to this one lack the `setuid` stanza.
pub const UPSTART_NO_SETUID_UP_TO: Version = Version::new(1, 4, 0);

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Errors from probes that report failures instead of answering `false`.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Command(#[from] RunnerError),

    #[error("malformed process stat file {path}")]
    MalformedStat { path: PathBuf },
}

fn io_err(path: impl Into<PathBuf>, source: io::Error) -> DetectError {
    DetectError::Io { path: path.into(), source }
}

// ---------------------------------------------------------------------------
// Init-system probes
// ---------------------------------------------------------------------------

/// systemd is PID 1: `/run/systemd/system` exists, or `systemctl` is
/// installed and `/proc/1/comm` names systemd.
pub fn is_systemd(host: &Host) -> bool {
    if host.exists("/run/systemd/system") { return true; }
    if host.find_executable("systemctl").is_none() { return false; }
    match host.read_to_string("/proc/1/comm") {
        Ok(comm) => comm.trim() == "systemd",
        Err(_) => false,
    }
}

/// Upstart ships `upstart-udev-bridge`; failing that, `initctl --version`
/// identifies itself.
pub fn is_upstart(host: &Host) -> bool {
    if host.exists("/sbin/upstart-udev-bridge") { return true; }
    if !host.exists("/sbin/initctl") { return false; }
    match host.runner().output("/sbin/initctl", &["--version"]) {
        Ok(out) => out.stdout.contains("initctl (upstart"),
        Err(e) => {
            tracing::debug!(error = %e, "initctl version probe failed");
            false
        }
    }
}

pub fn is_openrc(host: &Host) -> bool {
    if host.find_executable("openrc-init").is_some() { return true; }
    inittab_matches(host, openrc_sysinit())
}

/// BusyBox-style rcS: an `rcS` script driven from inittab and no `service`
/// wrapper (which would make this a SysV host).
pub fn is_rcs(host: &Host) -> bool {
    if !host.exists("/etc/init.d/rcS") { return false; }
    if host.find_executable("service").is_some() { return false; }
    inittab_matches(host, rcs_sysinit())
}

pub fn is_launchd(host: &Host) -> bool {
    host.find_executable("launchctl").is_some()
}

fn inittab_matches(host: &Host, re: &Regex) -> bool {
    match host.read_to_string("/etc/inittab") {
        Ok(contents) => re.is_match(&contents),
        Err(_) => false,
    }
}

fn openrc_sysinit() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"::sysinit:.*openrc.*sysinit").expect("static regex pattern is valid"))
}

fn rcs_sysinit() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"::sysinit:.*rcS").expect("static regex pattern is valid"))
}

// ---------------------------------------------------------------------------
// Interactivity
// ---------------------------------------------------------------------------

/// Whether the process runs from a terminal rather than under the init
/// system.
///
/// Containers always count as interactive. Otherwise a parent of pid 1, or a
/// parent whose image is `systemd`, means the init system launched us.
pub fn is_interactive(host: &Host) -> Result<bool, DetectError> {
    if is_in_container(host, CGROUP_FILE)? { return Ok(true); }

    let ppid = host.parent_pid();
    if ppid == 1 { return Ok(false); }

    match binary_name(host, ppid) {
        Ok(name) => Ok(name != "systemd"),
        Err(e) => {
            tracing::debug!(pid = ppid, error = %e, "parent process lookup failed");
            Ok(true)
        }
    }
}

/// launchd hosts: anything not parented by launchd is interactive.
pub fn is_interactive_darwin(host: &Host) -> bool {
    host.parent_pid() != 1
}

/// Scan the first lines of a cgroup file for container runtimes.
///
/// A missing file means "not in a container".
pub fn is_in_container(host: &Host, cgroup_path: impl AsRef<Path>) -> Result<bool, DetectError> {
    let path = cgroup_path.as_ref();
    let contents = match host.read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(io_err(path, e)),
    };

    Ok(contents
        .lines()
        .take(CGROUP_SCAN_LINES)
        .any(|line| CONTAINER_MARKERS.iter().any(|m| line.contains(m))))
}

/// Image name of `pid`, read from the parenthesised field of
/// `/proc/<pid>/stat`.
pub fn binary_name(host: &Host, pid: u32) -> Result<String, DetectError> {
    let path = PathBuf::from(format!("/proc/{pid}/stat"));
    let data = host.read_to_string(&path).map_err(|e| io_err(&path, e))?;

    let start = data.find('(').map(|i| i + 1);
    let end = data.rfind(')');
    match (start, end) {
        (Some(start), Some(end)) if start <= end => Ok(data[start..end].to_string()),
        _ => Err(DetectError::MalformedStat { path }),
    }
}

// ---------------------------------------------------------------------------
// Manager versions and capability gates
// ---------------------------------------------------------------------------

/// Major release reported by `systemctl --version`, `None` when the output
/// carries no recognisable version.
pub fn systemd_version(host: &Host) -> Result<Option<u64>, DetectError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"systemd ([0-9]+)").expect("static regex pattern is valid"));

    let out = host.runner().output("systemctl", &["--version"])?;
    Ok(re
        .captures(&out.stdout)
        .and_then(|caps| caps[1].parse().ok()))
}

/// Version reported by `initctl --version`, `None` when unrecognisable.
pub fn upstart_version(host: &Host) -> Result<Option<Version>, DetectError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"initctl \(upstart (\d+\.\d+\.\d+)\)").expect("static regex pattern is valid")
    });

    let out = host.runner().output("/sbin/initctl", &["--version"])?;
    Ok(re
        .captures(&out.stdout)
        .and_then(|caps| parse_version(&caps[1])))
}

/// `StandardOutput=file:` support. Unknown versions are assumed capable.
pub fn systemd_supports_output_file(version: Option<u64>) -> bool {
    version.map_or(true, |v| v >= SYSTEMD_OUTPUT_FILE_SINCE)
}

/// `kill signal` stanza support. Unknown versions are assumed capable.
pub fn upstart_has_kill_stanza(version: Option<Version>) -> bool {
    newer_than(version, UPSTART_NO_KILL_SIGNAL_UP_TO)
}

/// `setuid` stanza support. Unknown versions are assumed capable.
pub fn upstart_has_setuid_stanza(version: Option<Version>) -> bool {
    newer_than(version, UPSTART_NO_SETUID_UP_TO)
}

fn newer_than(version: Option<Version>, max: Version) -> bool {
    let Some(version) = version else { return true };
    match version_at_most(version.as_slice(), max.as_slice()) {
        Ok(at_most) => !at_most,
        Err(_) => false,
    }
}
