//! Init-system probe tests for `keepgo-detector`.
//!
//! Each case builds its own rooted host in a `TempDir`; no shared state.

use std::fs;
use std::sync::Arc;

use keepgo_core::{CommandOutput, Host, RecordingRunner, Version};
use keepgo_detector::{
    binary_name, is_in_container, is_interactive, is_interactive_darwin, is_launchd, is_openrc,
    is_rcs, is_systemd, is_upstart, systemd_version, upstart_version, DetectError, CGROUP_FILE,
};
use rstest::rstest;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_root() -> TempDir {
    TempDir::new().expect("tempdir")
}

fn write(root: &TempDir, path: &str, content: &str) {
    let full = root.path().join(path.trim_start_matches('/'));
    fs::create_dir_all(full.parent().unwrap()).expect("mkdir");
    fs::write(full, content).expect("write fixture");
}

#[cfg(unix)]
fn install_bin(root: &TempDir, path: &str) {
    use std::os::unix::fs::PermissionsExt;
    write(root, path, "#!/bin/sh\n");
    let full = root.path().join(path.trim_start_matches('/'));
    fs::set_permissions(full, fs::Permissions::from_mode(0o755)).expect("chmod");
}

fn host(root: &TempDir) -> (Host, Arc<RecordingRunner>) {
    let runner = Arc::new(RecordingRunner::new());
    (Host::at(root.path(), runner.clone()), runner)
}

// ---------------------------------------------------------------------------
// systemd
// ---------------------------------------------------------------------------

#[test]
fn systemd_detected_from_run_directory() {
    let root = make_root();
    fs::create_dir_all(root.path().join("run/systemd/system")).unwrap();
    let (h, _) = host(&root);
    assert!(is_systemd(&h));
}

#[cfg(unix)]
#[rstest]
#[case("systemd\n", true)]
#[case("init\n", false)]
fn systemd_detected_from_pid1_comm(#[case] comm: &str, #[case] expected: bool) {
    let root = make_root();
    install_bin(&root, "/usr/bin/systemctl");
    write(&root, "/proc/1/comm", comm);
    let (h, _) = host(&root);
    assert_eq!(is_systemd(&h), expected);
}

#[test]
fn systemd_needs_systemctl_on_path() {
    let root = make_root();
    write(&root, "/proc/1/comm", "systemd\n");
    let (h, _) = host(&root);
    assert!(!is_systemd(&h));
}

// ---------------------------------------------------------------------------
// Upstart
// ---------------------------------------------------------------------------

#[test]
fn upstart_detected_from_udev_bridge() {
    let root = make_root();
    write(&root, "/sbin/upstart-udev-bridge", "");
    let (h, runner) = host(&root);
    assert!(is_upstart(&h));
    assert!(runner.calls().is_empty(), "file probe must not run commands");
}

#[rstest]
#[case("initctl (upstart 1.12.1)\n", true)]
#[case("initctl 2.0\n", false)]
fn upstart_detected_from_initctl_version(#[case] output: &str, #[case] expected: bool) {
    let root = make_root();
    write(&root, "/sbin/initctl", "");
    let (h, runner) = host(&root);
    runner.respond("/sbin/initctl --version", CommandOutput::new(0, output));
    assert_eq!(is_upstart(&h), expected);
}

#[test]
fn upstart_probe_failure_is_false() {
    let root = make_root();
    write(&root, "/sbin/initctl", "");
    let (h, runner) = host(&root);
    runner.respond_missing("/sbin/initctl --version");
    assert!(!is_upstart(&h));
}

// ---------------------------------------------------------------------------
// OpenRC / RCS
// ---------------------------------------------------------------------------

#[rstest]
#[case("::sysinit:/sbin/openrc sysinit\n", true)]
#[case("::sysinit:/etc/init.d/rcS\n", false)]
fn openrc_detected_from_inittab(#[case] inittab: &str, #[case] expected: bool) {
    let root = make_root();
    write(&root, "/etc/inittab", inittab);
    let (h, _) = host(&root);
    assert_eq!(is_openrc(&h), expected);
}

#[cfg(unix)]
#[test]
fn openrc_detected_from_openrc_init() {
    let root = make_root();
    install_bin(&root, "/sbin/openrc-init");
    let (h, _) = host(&root);
    assert!(is_openrc(&h));
}

#[test]
fn rcs_detected_from_inittab_and_script() {
    let root = make_root();
    write(&root, "/etc/init.d/rcS", "#!/bin/sh\n");
    write(&root, "/etc/inittab", "::sysinit:/etc/init.d/rcS\n");
    let (h, _) = host(&root);
    assert!(is_rcs(&h));
}

#[cfg(unix)]
#[test]
fn rcs_rejected_when_service_wrapper_present() {
    let root = make_root();
    write(&root, "/etc/init.d/rcS", "#!/bin/sh\n");
    write(&root, "/etc/inittab", "::sysinit:/etc/init.d/rcS\n");
    install_bin(&root, "/usr/sbin/service");
    let (h, _) = host(&root);
    assert!(!is_rcs(&h));
}

#[test]
fn nothing_detected_on_empty_root() {
    let root = make_root();
    let (h, _) = host(&root);
    assert!(!is_systemd(&h));
    assert!(!is_upstart(&h));
    assert!(!is_openrc(&h));
    assert!(!is_rcs(&h));
    assert!(!is_launchd(&h));
}

#[cfg(unix)]
#[test]
fn launchd_detected_from_launchctl() {
    let root = make_root();
    install_bin(&root, "/bin/launchctl");
    let (h, _) = host(&root);
    assert!(is_launchd(&h));
}

// ---------------------------------------------------------------------------
// Interactivity
// ---------------------------------------------------------------------------

#[rstest]
#[case("12:devices:/docker/3f2a\n", true)]
#[case("1:name=systemd:/lxc/web\n", true)]
#[case("0::/init.scope\n", false)]
#[case("1:a:/\n2:b:/\n3:c:/\n4:d:/\n5:e:/\n6:f:/docker/late\n", false)]
fn container_detection(#[case] cgroup: &str, #[case] expected: bool) {
    let root = make_root();
    write(&root, CGROUP_FILE, cgroup);
    let (h, _) = host(&root);
    assert_eq!(is_in_container(&h, CGROUP_FILE).unwrap(), expected);
}

#[test]
fn missing_cgroup_file_is_not_a_container() {
    let root = make_root();
    let (h, _) = host(&root);
    assert!(!is_in_container(&h, CGROUP_FILE).unwrap());
}

#[test]
fn container_is_always_interactive() {
    let root = make_root();
    write(&root, CGROUP_FILE, "12:pids:/docker/abc\n");
    let (h, _) = host(&root);
    assert!(is_interactive(&h.with_parent_pid(1)).unwrap());
}

#[test]
fn parent_pid_one_is_not_interactive() {
    let root = make_root();
    let (h, _) = host(&root);
    assert!(!is_interactive(&h.with_parent_pid(1)).unwrap());
}

#[rstest]
#[case("4242 (systemd) S 1 4242 4242 0 -1\n", false)]
#[case("4242 (bash) S 1 4242 4242 0 -1\n", true)]
fn parent_image_decides_interactivity(#[case] stat: &str, #[case] expected: bool) {
    let root = make_root();
    write(&root, "/proc/4242/stat", stat);
    let (h, _) = host(&root);
    assert_eq!(is_interactive(&h.with_parent_pid(4242)).unwrap(), expected);
}

#[test]
fn binary_name_handles_parentheses_in_image() {
    let root = make_root();
    write(&root, "/proc/7/stat", "7 (my (odd) app) S 1\n");
    let (h, _) = host(&root);
    assert_eq!(binary_name(&h, 7).unwrap(), "my (odd) app");
}

#[test]
fn binary_name_reports_missing_process() {
    let root = make_root();
    let (h, _) = host(&root);
    let err = binary_name(&h, 99).unwrap_err();
    assert!(matches!(err, DetectError::Io { .. }), "got: {err}");
    assert!(err.to_string().contains("/proc/99/stat"));
}

#[test]
fn darwin_interactivity_follows_parent() {
    let root = make_root();
    let (h, _) = host(&root);
    assert!(!is_interactive_darwin(&h.clone().with_parent_pid(1)));
    assert!(is_interactive_darwin(&h.with_parent_pid(300)));
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

#[rstest]
#[case("systemd 252 (252.22-1~deb12u1)\n+PAM +AUDIT\n", Some(252))]
#[case("something else\n", None)]
fn systemd_version_from_output(#[case] output: &str, #[case] expected: Option<u64>) {
    let root = make_root();
    let (h, runner) = host(&root);
    runner.respond("systemctl --version", CommandOutput::new(0, output));
    assert_eq!(systemd_version(&h).unwrap(), expected);
}

#[rstest]
#[case("initctl (upstart 1.12.1)\n", Some(Version::new(1, 12, 1)))]
#[case("initctl (upstart 0.6.5)\n", Some(Version::new(0, 6, 5)))]
#[case("initctl (upstart 1.4)\n", None)]
fn upstart_version_from_output(#[case] output: &str, #[case] expected: Option<Version>) {
    let root = make_root();
    let (h, runner) = host(&root);
    runner.respond("/sbin/initctl --version", CommandOutput::new(0, output));
    assert_eq!(upstart_version(&h).unwrap(), expected);
}

#[test]
fn version_probe_surfaces_spawn_failure() {
    let root = make_root();
    let (h, runner) = host(&root);
    runner.respond_missing("systemctl --version");
    assert!(matches!(systemd_version(&h), Err(DetectError::Command(_))));
}
