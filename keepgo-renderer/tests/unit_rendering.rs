//! Rendered-artifact tests for every built-in unit format.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use keepgo_core::ServiceConfig;
use keepgo_renderer::{render_unit, Capabilities, TemplateContext, UnitKind};
use plist::Value;
use rstest::rstest;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn minimal() -> ServiceConfig {
    ServiceConfig::new("web")
}

fn full() -> ServiceConfig {
    let mut cfg = ServiceConfig::new("web");
    cfg.display_name = "Web Frontend".into();
    cfg.description = "Serves the dashboard".into();
    cfg.user_name = Some("www".into());
    cfg.arguments = vec!["--listen".into(), "0.0.0.0:80".into(), "it's".into()];
    cfg.dependencies = vec!["After=network-online.target".into()];
    cfg.working_directory = Some(PathBuf::from("/srv/web data"));
    cfg.chroot = Some(PathBuf::from("/jail"));
    cfg.env_vars = BTreeMap::from([
        ("APP_ENV".to_string(), "production".to_string()),
        ("GREETING".to_string(), "hello world".to_string()),
    ]);
    cfg.options.reload_signal = Some("HUP".into());
    cfg.options.pid_file = Some("/run/web.pid".into());
    cfg.options.limit_nofile = Some(65536);
    cfg.options.success_exit_status = Some("143".into());
    cfg.options.log_output = true;
    cfg
}

fn render(cfg: &ServiceConfig, kind: UnitKind, caps: Capabilities) -> String {
    let ctx = TemplateContext::new(cfg, Path::new("/opt/web app/web"), kind, caps);
    render_unit(kind, &ctx, None).expect("render")
}

fn lines(s: &str) -> Vec<&str> {
    s.lines().collect()
}

// ---------------------------------------------------------------------------
// Shared properties
// ---------------------------------------------------------------------------

#[rstest]
#[case(UnitKind::Systemd)]
#[case(UnitKind::Upstart)]
#[case(UnitKind::OpenRc)]
#[case(UnitKind::Rcs)]
#[case(UnitKind::SysV)]
#[case(UnitKind::Launchd)]
fn rendering_is_deterministic(#[case] kind: UnitKind) {
    let first = render(&full(), kind, Capabilities::default());
    let second = render(&full(), kind, Capabilities::default());
    assert_eq!(first, second);
}

#[rstest]
#[case(UnitKind::Systemd, &["User=", "RootDirectory=", "WorkingDirectory=", "ExecReload=", "PIDFile=", "LimitNOFILE=", "SuccessExitStatus=", "StandardOutput=", "Environment="])]
#[case(UnitKind::Upstart, &["description ", "chroot ", "chdir ", "setuid ", "stdout_log", "export "])]
#[case(UnitKind::OpenRc, &["command_args=", "command_user=", "directory=", "chroot=", "pidfile=", "supervise_daemon_args=", "export ", "depend()"])]
#[case(UnitKind::SysV, &["stdout_log", "export ", "cd ", "su -s", "chroot "])]
#[case(UnitKind::Rcs, &["stdout_log", "export ", "cd ", "su -s", "chroot "])]
#[case(UnitKind::Launchd, &["UserName", "RootDirectory", "WorkingDirectory", "EnvironmentVariables", "StandardOutPath"])]
fn minimal_config_omits_conditional_lines(#[case] kind: UnitKind, #[case] absent: &[&str]) {
    let out = render(&minimal(), kind, Capabilities::default());
    for needle in absent {
        assert!(!out.contains(needle), "{kind:?} rendered {needle:?} for a minimal config:\n{out}");
    }
}

// ---------------------------------------------------------------------------
// systemd
// ---------------------------------------------------------------------------

#[test]
fn systemd_full_unit() {
    let out = render(&full(), UnitKind::Systemd, Capabilities::default());
    let l = lines(&out);

    assert!(l.contains(&"Description=Serves the dashboard"));
    assert!(l.contains(&r"ConditionFileIsExecutable=/opt/web\x20app/web"));
    assert!(l.contains(&"After=network-online.target"));
    assert!(l.contains(&r#"ExecStart=/opt/web\x20app/web "--listen" "0.0.0.0:80" "it's""#));
    assert!(l.contains(&r#"RootDirectory="/jail""#));
    assert!(l.contains(&r"WorkingDirectory=/srv/web\x20data"));
    assert!(l.contains(&"User=www"));
    assert!(l.contains(&r#"ExecReload=/bin/kill -HUP "$MAINPID""#));
    assert!(l.contains(&r#"PIDFile="/run/web.pid""#));
    assert!(l.contains(&"StandardOutput=file:/var/log/web.out"));
    assert!(l.contains(&"StandardError=file:/var/log/web.err"));
    assert!(l.contains(&"LimitNOFILE=65536"));
    assert!(l.contains(&"Restart=always"));
    assert!(l.contains(&"SuccessExitStatus=143"));
    assert!(l.contains(&"EnvironmentFile=-/etc/sysconfig/web"));
    assert!(l.contains(&r#"Environment="APP_ENV=production""#));
    assert!(l.contains(&r#"Environment="GREETING=hello world""#));
    assert!(l.contains(&"WantedBy=multi-user.target"));
}

#[test]
fn systemd_minimal_unit_is_exact() {
    let out = render(&minimal(), UnitKind::Systemd, Capabilities::default());
    let expected = "\
[Unit]
Description=
ConditionFileIsExecutable=/opt/web\\x20app/web

[Service]
StartLimitInterval=5
StartLimitBurst=10
ExecStart=/opt/web\\x20app/web
Restart=always
RestartSec=120
EnvironmentFile=-/etc/sysconfig/web

[Install]
WantedBy=multi-user.target
";
    assert_eq!(out, expected);
}

#[test]
fn systemd_old_versions_skip_file_logging() {
    let caps = Capabilities { has_output_file_support: false, ..Capabilities::default() };
    let out = render(&full(), UnitKind::Systemd, caps);
    assert!(!out.contains("StandardOutput="));
}

#[test]
fn systemd_user_unit_targets_default_and_drops_user() {
    let mut cfg = full();
    cfg.options.user_service = true;
    let out = render(&cfg, UnitKind::Systemd, Capabilities::default());
    assert!(out.contains("WantedBy=default.target"));
    assert!(!out.contains("User="));
}

// ---------------------------------------------------------------------------
// Upstart
// ---------------------------------------------------------------------------

#[test]
fn upstart_modern_uses_setuid_and_kill_stanza() {
    let out = render(&full(), UnitKind::Upstart, Capabilities::default());
    assert!(out.starts_with("# Serves the dashboard\n"));
    assert!(out.contains("description    \"Web Frontend\"\n"));
    assert!(out.contains("kill signal INT\n"));
    assert!(out.contains("setuid www\n"));
    assert!(out.contains("chdir /srv/web data\n"));
    assert!(out.contains("    export GREETING='hello world'\n"));
    assert!(out.contains(
        r#"    exec '/opt/web app/web' '--listen' '0.0.0.0:80' 'it'\''s' >> "$stdout_log" 2>> "$stderr_log""#
    ));
    assert!(!out.contains("sudo"));
}

#[test]
fn upstart_legacy_falls_back_to_sudo() {
    let caps = Capabilities {
        has_kill_stanza: false,
        has_setuid_stanza: false,
        ..Capabilities::default()
    };
    let out = render(&full(), UnitKind::Upstart, caps);
    assert!(!out.contains("kill signal"));
    assert!(!out.contains("setuid"));
    assert!(out.contains("exec sudo -E -u www '/opt/web app/web'"));
}

// ---------------------------------------------------------------------------
// OpenRC
// ---------------------------------------------------------------------------

#[test]
fn openrc_script_with_dependencies() {
    let mut cfg = full();
    cfg.dependencies = vec!["need net".into(), "after firewall".into()];
    let out = render(&cfg, UnitKind::OpenRc, Capabilities::default());

    assert!(out.starts_with("#!/sbin/openrc-run\nsupervisor=supervise-daemon\n"));
    assert!(out.contains("name='Web Frontend'\n"));
    assert!(out.contains("command='/opt/web app/web'\n"));
    assert!(out.contains(r#"command_args=''\''--listen'\'' '\''0.0.0.0:80'\'' '\''it'\''\'\'''\''s'\''"#));
    assert!(out.contains("command_user='www'\n"));
    assert!(out.contains("supervise_daemon_args=\"--stdout /var/log/web.out --stderr /var/log/web.err\"\n"));
    assert!(out.ends_with("depend() {\n\tneed net\n\tafter firewall\n}\n"));
}

// ---------------------------------------------------------------------------
// SysV / RCS
// ---------------------------------------------------------------------------

#[rstest]
#[case(UnitKind::SysV)]
#[case(UnitKind::Rcs)]
fn init_scripts_dispatch_lifecycle_verbs(#[case] kind: UnitKind) {
    let out = render(&full(), kind, Capabilities::default());
    assert!(out.starts_with("#!/bin/sh\n"));
    for verb in ["    start)", "    stop)", "    restart)", "    status)"] {
        assert!(out.contains(verb), "{kind:?} missing {verb}");
    }
    assert!(out.contains("pid_file='/run/web.pid'\n"));
    assert!(out.contains("            exit 3\n"), "stopped status must exit 3");
    assert!(out.contains("cd '/srv/web data' || exit 1"));
    assert!(out.contains("chroot '/jail' su -s /bin/sh 'www' -c"));
}

#[test]
fn sysv_script_carries_lsb_header() {
    let out = render(&minimal(), UnitKind::SysV, Capabilities::default());
    assert!(out.contains("### BEGIN INIT INFO\n# Provides:          web\n"));
    assert!(out.contains("# Default-Start:     2 3 4 5\n"));
    assert!(out.contains("pid_file='/var/run/web.pid'\n"));
    assert!(out.contains("'/opt/web app/web' > /dev/null 2>&1 &"));
}

#[test]
fn rcs_script_has_no_lsb_header() {
    let out = render(&minimal(), UnitKind::Rcs, Capabilities::default());
    assert!(!out.contains("BEGIN INIT INFO"));
}

// ---------------------------------------------------------------------------
// launchd
// ---------------------------------------------------------------------------

#[test]
fn launchd_plist_is_valid_and_complete() {
    let mut cfg = full();
    cfg.arguments.push("<&>".into());
    cfg.options.run_at_load = true;
    let out = render(&cfg, UnitKind::Launchd, Capabilities::default());

    let value = Value::from_reader_xml(out.as_bytes()).expect("parse plist");
    let dict = value.as_dictionary().expect("plist root dict");

    assert_eq!(dict.get("Label").and_then(Value::as_string), Some("web"));
    assert_eq!(dict.get("UserName").and_then(Value::as_string), Some("www"));
    assert_eq!(dict.get("KeepAlive").and_then(Value::as_boolean), Some(true));
    assert_eq!(dict.get("RunAtLoad").and_then(Value::as_boolean), Some(true));
    assert_eq!(dict.get("SessionCreate").and_then(Value::as_boolean), Some(false));
    assert_eq!(dict.get("Disabled").and_then(Value::as_boolean), Some(false));
    assert_eq!(
        dict.get("StandardOutPath").and_then(Value::as_string),
        Some("/usr/local/var/log/web.out.log")
    );

    let args: Vec<&str> = dict
        .get("ProgramArguments")
        .and_then(Value::as_array)
        .expect("ProgramArguments array")
        .iter()
        .map(|v| v.as_string().expect("program arg as string"))
        .collect();
    assert_eq!(args, vec!["/opt/web app/web", "--listen", "0.0.0.0:80", "it's", "<&>"]);

    let env = dict
        .get("EnvironmentVariables")
        .and_then(Value::as_dictionary)
        .expect("env dict");
    assert_eq!(env.get("GREETING").and_then(Value::as_string), Some("hello world"));
}

#[test]
fn launchd_minimal_plist_parses() {
    let out = render(&minimal(), UnitKind::Launchd, Capabilities::default());
    let value = Value::from_reader_xml(out.as_bytes()).expect("parse plist");
    let dict = value.as_dictionary().expect("dict");
    assert_eq!(dict.get("RunAtLoad").and_then(Value::as_boolean), Some(false));
    assert!(dict.get("StandardOutPath").is_none());
}
