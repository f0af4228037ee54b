//! Built-in unit formats.
//!
//! Optional lines are written only when their field is set, so a minimal
//! config renders without placeholders such as an empty `User=`.

use std::fmt::{self, Write};

use crate::context::TemplateContext;
use crate::escape::{cmd_escape, cmd_quote, shell_quote, xml_escape};

const PLIST_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
"#;

// ---------------------------------------------------------------------------
// systemd
// ---------------------------------------------------------------------------

pub(crate) fn systemd(ctx: &TemplateContext) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "[Unit]")?;
    writeln!(out, "Description={}", ctx.description)?;
    writeln!(out, "ConditionFileIsExecutable={}", ctx.path_escaped)?;
    for dep in &ctx.dependencies {
        writeln!(out, "{dep}")?;
    }

    writeln!(out)?;
    writeln!(out, "[Service]")?;
    writeln!(out, "StartLimitInterval=5")?;
    writeln!(out, "StartLimitBurst=10")?;
    writeln!(out, "ExecStart={}", ctx.exec_start)?;
    if let Some(chroot) = &ctx.chroot {
        writeln!(out, "RootDirectory={}", cmd_quote(chroot))?;
    }
    if let Some(dir) = &ctx.working_directory {
        writeln!(out, "WorkingDirectory={}", cmd_escape(dir))?;
    }
    // User= is rejected inside the per-user manager.
    if let Some(user) = ctx.user_name.as_ref().filter(|_| !ctx.user_service) {
        writeln!(out, "User={user}")?;
    }
    if let Some(sig) = &ctx.reload_signal {
        writeln!(out, "ExecReload=/bin/kill -{sig} \"$MAINPID\"")?;
    }
    if let Some(pid_file) = &ctx.pid_file {
        writeln!(out, "PIDFile={}", cmd_quote(pid_file))?;
    }
    if ctx.log_output && ctx.capabilities.has_output_file_support {
        writeln!(out, "StandardOutput=file:{}/{}.out", ctx.log_directory, ctx.name)?;
        writeln!(out, "StandardError=file:{}/{}.err", ctx.log_directory, ctx.name)?;
    }
    if let Some(limit) = ctx.limit_nofile {
        writeln!(out, "LimitNOFILE={limit}")?;
    }
    if let Some(restart) = &ctx.restart {
        writeln!(out, "Restart={restart}")?;
    }
    if let Some(status) = &ctx.success_exit_status {
        writeln!(out, "SuccessExitStatus={status}")?;
    }
    writeln!(out, "RestartSec=120")?;
    writeln!(out, "EnvironmentFile=-/etc/sysconfig/{}", ctx.name)?;
    for (key, value) in &ctx.env_vars {
        writeln!(out, "Environment={}", cmd_quote(&format!("{key}={value}")))?;
    }

    writeln!(out)?;
    writeln!(out, "[Install]")?;
    let target = if ctx.user_service { "default.target" } else { "multi-user.target" };
    writeln!(out, "WantedBy={target}")?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Upstart
// ---------------------------------------------------------------------------

pub(crate) fn upstart(ctx: &TemplateContext) -> Result<String, fmt::Error> {
    let caps = ctx.capabilities;
    let mut out = String::new();

    writeln!(out, "# {}", ctx.description)?;
    writeln!(out)?;
    if !ctx.display_name.is_empty() {
        writeln!(out, "description    \"{}\"", ctx.display_name)?;
    }
    if caps.has_kill_stanza {
        writeln!(out, "kill signal INT")?;
    }
    if let Some(chroot) = &ctx.chroot {
        writeln!(out, "chroot {chroot}")?;
    }
    if let Some(dir) = &ctx.working_directory {
        writeln!(out, "chdir {dir}")?;
    }
    for dep in &ctx.dependencies {
        writeln!(out, "{dep}")?;
    }
    writeln!(out, "start on filesystem or runlevel [2345]")?;
    writeln!(out, "stop on runlevel [!2345]")?;
    writeln!(out)?;
    if let Some(user) = ctx.user_name.as_ref().filter(|_| caps.has_setuid_stanza) {
        writeln!(out, "setuid {user}")?;
    }
    writeln!(out, "respawn")?;
    writeln!(out, "respawn limit 10 5")?;
    writeln!(out, "umask 022")?;
    writeln!(out)?;
    writeln!(out, "console none")?;
    writeln!(out)?;
    writeln!(out, "pre-start script")?;
    writeln!(out, "    test -x {} || {{ stop; exit 0; }}", shell_quote(&ctx.path))?;
    writeln!(out, "end script")?;
    writeln!(out)?;
    writeln!(out, "# Start")?;
    writeln!(out, "script")?;
    if ctx.log_output {
        writeln!(out, "    stdout_log=\"{}/{}.out\"", ctx.log_directory, ctx.name)?;
        writeln!(out, "    stderr_log=\"{}/{}.err\"", ctx.log_directory, ctx.name)?;
    }
    writeln!(out, "    if [ -f \"/etc/sysconfig/{}\" ]; then", ctx.name)?;
    writeln!(out, "        set -a")?;
    writeln!(out, "        . \"/etc/sysconfig/{}\"", ctx.name)?;
    writeln!(out, "        set +a")?;
    writeln!(out, "    fi")?;
    for (key, value) in &ctx.env_vars {
        writeln!(out, "    export {key}={}", shell_quote(value))?;
    }

    let mut exec = String::from("exec ");
    if let Some(user) = ctx.user_name.as_ref().filter(|_| !caps.has_setuid_stanza) {
        write!(exec, "sudo -E -u {user} ")?;
    }
    exec.push_str(&shell_command(ctx));
    if ctx.log_output {
        exec.push_str(" >> \"$stdout_log\" 2>> \"$stderr_log\"");
    }
    writeln!(out, "    {exec}")?;
    writeln!(out, "end script")?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// OpenRC
// ---------------------------------------------------------------------------

pub(crate) fn openrc(ctx: &TemplateContext) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "#!/sbin/openrc-run")?;
    writeln!(out, "supervisor=supervise-daemon")?;
    writeln!(out, "name={}", shell_quote(display_or_name(ctx)))?;
    writeln!(out, "description={}", shell_quote(&ctx.description))?;
    writeln!(out, "command={}", shell_quote(&ctx.path))?;
    if !ctx.arguments.is_empty() {
        writeln!(out, "command_args={}", shell_quote(&shell_words(&ctx.arguments)))?;
    }
    if let Some(user) = &ctx.user_name {
        writeln!(out, "command_user={}", shell_quote(user))?;
    }
    if let Some(dir) = &ctx.working_directory {
        writeln!(out, "directory={}", shell_quote(dir))?;
    }
    if let Some(chroot) = &ctx.chroot {
        writeln!(out, "chroot={}", shell_quote(chroot))?;
    }
    if let Some(pid_file) = &ctx.pid_file {
        writeln!(out, "pidfile={}", shell_quote(pid_file))?;
    }
    if ctx.log_output {
        writeln!(
            out,
            "supervise_daemon_args=\"--stdout {dir}/{name}.out --stderr {dir}/{name}.err\"",
            dir = ctx.log_directory,
            name = ctx.name
        )?;
    }
    for (key, value) in &ctx.env_vars {
        writeln!(out, "export {key}={}", shell_quote(value))?;
    }
    if !ctx.dependencies.is_empty() {
        writeln!(out)?;
        writeln!(out, "depend() {{")?;
        for dep in &ctx.dependencies {
            writeln!(out, "\t{dep}")?;
        }
        writeln!(out, "}}")?;
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// RCS and SysV init scripts
// ---------------------------------------------------------------------------

pub(crate) fn rcs(ctx: &TemplateContext) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "#!/bin/sh")?;
    writeln!(out, "# {}", display_or_name(ctx))?;
    if !ctx.description.is_empty() {
        writeln!(out, "# {}", ctx.description)?;
    }
    for dep in &ctx.dependencies {
        writeln!(out, "{dep}")?;
    }
    writeln!(out)?;
    init_script_body(ctx, &mut out)?;
    Ok(out)
}

pub(crate) fn sysv(ctx: &TemplateContext) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "#!/bin/sh")?;
    writeln!(out, "# For RedHat and cousins:")?;
    writeln!(out, "# chkconfig: - 99 01")?;
    writeln!(out, "# description: {}", ctx.description)?;
    writeln!(out, "# processname: {}", ctx.path)?;
    writeln!(out)?;
    writeln!(out, "### BEGIN INIT INFO")?;
    writeln!(out, "# Provides:          {}", ctx.name)?;
    writeln!(out, "# Required-Start:")?;
    writeln!(out, "# Required-Stop:")?;
    writeln!(out, "# Default-Start:     2 3 4 5")?;
    writeln!(out, "# Default-Stop:      0 1 6")?;
    writeln!(out, "# Short-Description: {}", display_or_name(ctx))?;
    writeln!(out, "# Description:       {}", ctx.description)?;
    for dep in &ctx.dependencies {
        writeln!(out, "{dep}")?;
    }
    writeln!(out, "### END INIT INFO")?;
    writeln!(out)?;
    init_script_body(ctx, &mut out)?;
    Ok(out)
}

/// pid-file driven `start|stop|restart|status` dispatcher. `status` exits 0
/// when running and 3 when stopped.
fn init_script_body(ctx: &TemplateContext, out: &mut String) -> fmt::Result {
    let default_pid = format!("/var/run/{}.pid", ctx.name);
    let pid_file = ctx.pid_file.as_deref().unwrap_or(&default_pid);

    writeln!(out, "name={}", shell_quote(&ctx.name))?;
    writeln!(out, "pid_file={}", shell_quote(pid_file))?;
    if ctx.log_output {
        writeln!(out, "stdout_log=\"{}/$name.log\"", ctx.log_directory)?;
        writeln!(out, "stderr_log=\"{}/$name.err\"", ctx.log_directory)?;
    }
    writeln!(out)?;
    writeln!(out, "[ -e \"/etc/sysconfig/$name\" ] && . \"/etc/sysconfig/$name\"")?;
    for (key, value) in &ctx.env_vars {
        writeln!(out, "export {key}={}", shell_quote(value))?;
    }
    writeln!(out)?;
    writeln!(out, "get_pid() {{")?;
    writeln!(out, "    cat \"$pid_file\"")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "is_running() {{")?;
    writeln!(out, "    [ -f \"$pid_file\" ] && kill -0 \"$(get_pid)\" > /dev/null 2>&1")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "case \"$1\" in")?;

    writeln!(out, "    start)")?;
    writeln!(out, "        if is_running; then")?;
    writeln!(out, "            echo \"Already started\"")?;
    writeln!(out, "        else")?;
    writeln!(out, "            echo \"Starting $name\"")?;
    if let Some(dir) = &ctx.working_directory {
        writeln!(out, "            cd {} || exit 1", shell_quote(dir))?;
    }
    let redirect = if ctx.log_output {
        ">> \"$stdout_log\" 2>> \"$stderr_log\""
    } else {
        "> /dev/null 2>&1"
    };
    writeln!(out, "            {} {redirect} &", launch_command(ctx))?;
    writeln!(out, "            echo $! > \"$pid_file\"")?;
    writeln!(out, "            if ! is_running; then")?;
    writeln!(out, "                echo \"Unable to start $name\"")?;
    writeln!(out, "                exit 1")?;
    writeln!(out, "            fi")?;
    writeln!(out, "        fi")?;
    writeln!(out, "    ;;")?;

    writeln!(out, "    stop)")?;
    writeln!(out, "        if is_running; then")?;
    writeln!(out, "            echo \"Stopping $name\"")?;
    writeln!(out, "            kill \"$(get_pid)\"")?;
    writeln!(out, "            for i in 1 2 3 4 5 6 7 8 9 10; do")?;
    writeln!(out, "                is_running || break")?;
    writeln!(out, "                sleep 1")?;
    writeln!(out, "            done")?;
    writeln!(out, "            if is_running; then")?;
    writeln!(out, "                echo \"Not stopped; may still be shutting down\"")?;
    writeln!(out, "                exit 1")?;
    writeln!(out, "            fi")?;
    writeln!(out, "            rm -f \"$pid_file\"")?;
    writeln!(out, "            echo \"Stopped\"")?;
    writeln!(out, "        else")?;
    writeln!(out, "            echo \"Not running\"")?;
    writeln!(out, "        fi")?;
    writeln!(out, "    ;;")?;

    writeln!(out, "    restart)")?;
    writeln!(out, "        \"$0\" stop")?;
    writeln!(out, "        if is_running; then")?;
    writeln!(out, "            echo \"Unable to stop, will not attempt to start\"")?;
    writeln!(out, "            exit 1")?;
    writeln!(out, "        fi")?;
    writeln!(out, "        \"$0\" start")?;
    writeln!(out, "    ;;")?;

    writeln!(out, "    status)")?;
    writeln!(out, "        if is_running; then")?;
    writeln!(out, "            echo \"Running\"")?;
    writeln!(out, "        else")?;
    writeln!(out, "            echo \"Stopped\"")?;
    writeln!(out, "            exit 3")?;
    writeln!(out, "        fi")?;
    writeln!(out, "    ;;")?;

    writeln!(out, "    *)")?;
    writeln!(out, "        echo \"Usage: $0 {{start|stop|restart|status}}\"")?;
    writeln!(out, "        exit 1")?;
    writeln!(out, "    ;;")?;
    writeln!(out, "esac")?;
    writeln!(out, "exit 0")?;
    Ok(())
}

/// Program invocation for init scripts, wrapped in `chroot` and `su` when
/// configured.
fn launch_command(ctx: &TemplateContext) -> String {
    let mut cmd = shell_command(ctx);
    if let Some(user) = &ctx.user_name {
        cmd = format!("su -s /bin/sh {} -c {}", shell_quote(user), shell_quote(&format!("exec {cmd}")));
    }
    if let Some(chroot) = &ctx.chroot {
        cmd = format!("chroot {} {cmd}", shell_quote(chroot));
    }
    cmd
}

// ---------------------------------------------------------------------------
// launchd
// ---------------------------------------------------------------------------

pub(crate) fn launchd(ctx: &TemplateContext) -> Result<String, fmt::Error> {
    let mut out = String::from(PLIST_HEADER);

    writeln!(out, "  <key>Label</key>")?;
    writeln!(out, "  <string>{}</string>", xml_escape(&ctx.name))?;
    writeln!(out, "  <key>ProgramArguments</key>")?;
    writeln!(out, "  <array>")?;
    writeln!(out, "    <string>{}</string>", xml_escape(&ctx.path))?;
    for arg in &ctx.arguments {
        writeln!(out, "    <string>{}</string>", xml_escape(arg))?;
    }
    writeln!(out, "  </array>")?;
    if let Some(user) = &ctx.user_name {
        writeln!(out, "  <key>UserName</key>")?;
        writeln!(out, "  <string>{}</string>", xml_escape(user))?;
    }
    if let Some(chroot) = &ctx.chroot {
        writeln!(out, "  <key>RootDirectory</key>")?;
        writeln!(out, "  <string>{}</string>", xml_escape(chroot))?;
    }
    if let Some(dir) = &ctx.working_directory {
        writeln!(out, "  <key>WorkingDirectory</key>")?;
        writeln!(out, "  <string>{}</string>", xml_escape(dir))?;
    }
    if !ctx.env_vars.is_empty() {
        writeln!(out, "  <key>EnvironmentVariables</key>")?;
        writeln!(out, "  <dict>")?;
        for (key, value) in &ctx.env_vars {
            writeln!(out, "    <key>{}</key>", xml_escape(key))?;
            writeln!(out, "    <string>{}</string>", xml_escape(value))?;
        }
        writeln!(out, "  </dict>")?;
    }
    writeln!(out, "  <key>SessionCreate</key>")?;
    writeln!(out, "  {}", plist_bool(ctx.session_create))?;
    writeln!(out, "  <key>KeepAlive</key>")?;
    writeln!(out, "  {}", plist_bool(ctx.keep_alive))?;
    writeln!(out, "  <key>RunAtLoad</key>")?;
    writeln!(out, "  {}", plist_bool(ctx.run_at_load))?;
    writeln!(out, "  <key>Disabled</key>")?;
    writeln!(out, "  <false/>")?;
    if ctx.log_output {
        let stdout = format!("{}/{}.out.log", ctx.log_directory, ctx.name);
        let stderr = format!("{}/{}.err.log", ctx.log_directory, ctx.name);
        writeln!(out, "  <key>StandardOutPath</key>")?;
        writeln!(out, "  <string>{}</string>", xml_escape(&stdout))?;
        writeln!(out, "  <key>StandardErrorPath</key>")?;
        writeln!(out, "  <string>{}</string>", xml_escape(&stderr))?;
    }
    writeln!(out, "</dict>")?;
    writeln!(out, "</plist>")?;
    Ok(out)
}

fn plist_bool(value: bool) -> &'static str {
    if value { "<true/>" } else { "<false/>" }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn display_or_name(ctx: &TemplateContext) -> &str {
    if ctx.display_name.is_empty() { &ctx.name } else { &ctx.display_name }
}

fn shell_words(words: &[String]) -> String {
    words.iter().map(|w| shell_quote(w)).collect::<Vec<_>>().join(" ")
}

/// Program path and arguments as shell words.
fn shell_command(ctx: &TemplateContext) -> String {
    let mut cmd = shell_quote(&ctx.path);
    for arg in &ctx.arguments {
        cmd.push(' ');
        cmd.push_str(&shell_quote(arg));
    }
    cmd
}
