//! Logical locations of every artifact keepgo writes.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SYSTEMD_SYSTEM_DIR: &str = "/etc/systemd/system";
pub const UPSTART_DIR: &str = "/etc/init";
pub const INIT_D_DIR: &str = "/etc/init.d";
pub const LAUNCH_DAEMONS_DIR: &str = "/Library/LaunchDaemons";

/// Pause between stop and start for backends without a native restart.
pub const RESTART_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// SysV runlevels that get an `S50<name>` start link.
pub const SYSV_START_RUNLEVELS: &[char] = &['2', '3', '4', '5'];
/// SysV runlevels that get a `K02<name>` kill link.
pub const SYSV_KILL_RUNLEVELS: &[char] = &['0', '1', '6'];

pub fn systemd_unit_name(name: &str) -> String {
    format!("{name}.service")
}

pub fn systemd_system_unit(name: &str) -> PathBuf {
    Path::new(SYSTEMD_SYSTEM_DIR).join(systemd_unit_name(name))
}

pub fn systemd_user_dir(home: &Path) -> PathBuf {
    home.join(".config").join("systemd").join("user")
}

pub fn systemd_user_unit(home: &Path, name: &str) -> PathBuf {
    systemd_user_dir(home).join(systemd_unit_name(name))
}

pub fn upstart_job(name: &str) -> PathBuf {
    Path::new(UPSTART_DIR).join(format!("{name}.conf"))
}

pub fn init_script(name: &str) -> PathBuf {
    Path::new(INIT_D_DIR).join(name)
}

pub fn launch_daemon_plist(name: &str) -> PathBuf {
    Path::new(LAUNCH_DAEMONS_DIR).join(format!("{name}.plist"))
}

pub fn launch_agents_dir(home: &Path) -> PathBuf {
    home.join("Library").join("LaunchAgents")
}

pub fn launch_agent_plist(home: &Path, name: &str) -> PathBuf {
    launch_agents_dir(home).join(format!("{name}.plist"))
}

/// `/etc/rcN.d/S50<name>` and `/etc/rcN.d/K02<name>` links for SysV
/// registration, start links first.
pub fn sysv_rc_links(name: &str) -> Vec<PathBuf> {
    let start = SYSV_START_RUNLEVELS
        .iter()
        .map(|level| PathBuf::from(format!("/etc/rc{level}.d/S50{name}")));
    let kill = SYSV_KILL_RUNLEVELS
        .iter()
        .map(|level| PathBuf::from(format!("/etc/rc{level}.d/K02{name}")));
    start.chain(kill).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_paths_follow_manager_conventions() {
        assert_eq!(systemd_system_unit("web"), PathBuf::from("/etc/systemd/system/web.service"));
        assert_eq!(
            systemd_user_unit(Path::new("/home/ada"), "web"),
            PathBuf::from("/home/ada/.config/systemd/user/web.service")
        );
        assert_eq!(upstart_job("web"), PathBuf::from("/etc/init/web.conf"));
        assert_eq!(init_script("web"), PathBuf::from("/etc/init.d/web"));
        assert_eq!(launch_daemon_plist("web"), PathBuf::from("/Library/LaunchDaemons/web.plist"));
        assert_eq!(
            launch_agent_plist(Path::new("/Users/ada"), "web"),
            PathBuf::from("/Users/ada/Library/LaunchAgents/web.plist")
        );
    }

    #[test]
    fn sysv_links_cover_all_runlevels() {
        let links = sysv_rc_links("web");
        assert_eq!(links.len(), 7);
        assert_eq!(links[0], PathBuf::from("/etc/rc2.d/S50web"));
        assert_eq!(links[4], PathBuf::from("/etc/rc0.d/K02web"));
        assert_eq!(links[6], PathBuf::from("/etc/rc6.d/K02web"));
    }
}
