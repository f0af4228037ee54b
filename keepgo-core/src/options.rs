//! Service options: the typed [`ServiceOptions`] used by backends and the
//! loosely typed [`KeyValue`] bag that configuration files deserialize into.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

pub const KEEP_ALIVE: &str = "KeepAlive";
pub const RUN_AT_LOAD: &str = "RunAtLoad";
pub const USER_SERVICE: &str = "UserService";
pub const SESSION_CREATE: &str = "SessionCreate";
pub const LOG_OUTPUT: &str = "LogOutput";
pub const PREFIX: &str = "Prefix";
pub const RUN_WAIT: &str = "RunWait";
pub const RELOAD_SIGNAL: &str = "ReloadSignal";
pub const PID_FILE: &str = "PIDFile";
pub const LIMIT_NOFILE: &str = "LimitNOFILE";
pub const RESTART: &str = "Restart";
pub const SUCCESS_EXIT_STATUS: &str = "SuccessExitStatus";
pub const LOG_DIRECTORY: &str = "LogDirectory";

pub const SYSTEMD_SCRIPT: &str = "SystemdScript";
pub const UPSTART_SCRIPT: &str = "UpstartScript";
pub const OPENRC_SCRIPT: &str = "OpenRCScript";
pub const RCS_SCRIPT: &str = "RCSScript";
pub const SYSV_SCRIPT: &str = "SysvScript";
pub const LAUNCHD_CONFIG: &str = "LaunchdConfig";

/// Keys whose string value replaces a backend's default template.
pub const TEMPLATE_KEYS: &[&str] = &[
    SYSTEMD_SCRIPT,
    UPSTART_SCRIPT,
    OPENRC_SCRIPT,
    RCS_SCRIPT,
    SYSV_SCRIPT,
    LAUNCHD_CONFIG,
];

pub const KEEP_ALIVE_DEFAULT: bool = true;
pub const RUN_AT_LOAD_DEFAULT: bool = false;
pub const USER_SERVICE_DEFAULT: bool = false;
pub const SESSION_CREATE_DEFAULT: bool = false;
pub const LOG_OUTPUT_DEFAULT: bool = false;
pub const PREFIX_DEFAULT: &str = "application";
pub const RESTART_DEFAULT: &str = "always";
/// Sentinel meaning "leave `LimitNOFILE` unset".
pub const LIMIT_NOFILE_DEFAULT: i64 = -1;

/// Handler `Service::run` blocks on instead of waiting for OS signals.
pub type RunWait = Arc<dyn Fn() + Send + Sync>;

// ---------------------------------------------------------------------------
// KeyValue
// ---------------------------------------------------------------------------

/// A single entry of the option bag.
#[derive(Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    #[serde(skip)]
    Func(RunWait),
}

impl OptionValue {
    pub fn func(f: impl Fn() + Send + Sync + 'static) -> Self {
        OptionValue::Func(Arc::new(f))
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            OptionValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            OptionValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            OptionValue::String(v) => f.debug_tuple("String").field(v).finish(),
            OptionValue::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(v.into())
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::String(v.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::String(v)
    }
}

/// Heterogeneous option bag with permissive typed lookups.
///
/// Every accessor returns the supplied default when the key is missing or
/// holds a value of another type. Nothing is validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct KeyValue(BTreeMap<String, OptionValue>);

impl KeyValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<OptionValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn bool(&self, key: &str, default: bool) -> bool {
        match self.0.get(key) {
            Some(OptionValue::Bool(v)) => *v,
            _ => default,
        }
    }

    pub fn int(&self, key: &str, default: i64) -> i64 {
        match self.0.get(key) {
            Some(OptionValue::Int(v)) => *v,
            _ => default,
        }
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        match self.0.get(key) {
            Some(OptionValue::String(v)) => v.clone(),
            _ => default.to_string(),
        }
    }

    pub fn float(&self, key: &str, default: f64) -> f64 {
        match self.0.get(key) {
            Some(OptionValue::Float(v)) => *v,
            _ => default,
        }
    }

    pub fn func(&self, key: &str) -> Option<RunWait> {
        match self.0.get(key) {
            Some(OptionValue::Func(f)) => Some(Arc::clone(f)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ServiceOptions
// ---------------------------------------------------------------------------

/// Every option a backend understands, with its default applied.
#[derive(Clone)]
pub struct ServiceOptions {
    /// launchd `KeepAlive`.
    pub keep_alive: bool,
    /// launchd `RunAtLoad`.
    pub run_at_load: bool,
    /// Install as a per-user unit instead of system-wide.
    pub user_service: bool,
    /// launchd `SessionCreate`.
    pub session_create: bool,
    /// Redirect stdout/stderr into `log_directory`.
    pub log_output: bool,
    /// Service category, available to custom templates.
    pub prefix: String,
    pub run_wait: Option<RunWait>,
    pub reload_signal: Option<String>,
    pub pid_file: Option<String>,
    pub limit_nofile: Option<u64>,
    pub restart: Option<String>,
    pub success_exit_status: Option<String>,
    /// Overrides the backend's default log directory.
    pub log_directory: Option<PathBuf>,
    /// Template override key (e.g. [`SYSTEMD_SCRIPT`]) → template source.
    pub templates: BTreeMap<String, String>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            keep_alive: KEEP_ALIVE_DEFAULT,
            run_at_load: RUN_AT_LOAD_DEFAULT,
            user_service: USER_SERVICE_DEFAULT,
            session_create: SESSION_CREATE_DEFAULT,
            log_output: LOG_OUTPUT_DEFAULT,
            prefix: PREFIX_DEFAULT.to_string(),
            run_wait: None,
            reload_signal: None,
            pid_file: None,
            limit_nofile: None,
            restart: Some(RESTART_DEFAULT.to_string()),
            success_exit_status: None,
            log_directory: None,
            templates: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for ServiceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceOptions")
            .field("keep_alive", &self.keep_alive)
            .field("run_at_load", &self.run_at_load)
            .field("user_service", &self.user_service)
            .field("session_create", &self.session_create)
            .field("log_output", &self.log_output)
            .field("prefix", &self.prefix)
            .field("run_wait", &self.run_wait.is_some())
            .field("reload_signal", &self.reload_signal)
            .field("pid_file", &self.pid_file)
            .field("limit_nofile", &self.limit_nofile)
            .field("restart", &self.restart)
            .field("success_exit_status", &self.success_exit_status)
            .field("log_directory", &self.log_directory)
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ServiceOptions {
    /// Build typed options from a bag, applying the documented defaults.
    ///
    /// Empty strings count as unset; a negative `LimitNOFILE` leaves the
    /// limit unset.
    pub fn from_key_values(kv: &KeyValue) -> Self {
        let non_empty = |key: &str, default: &str| {
            let value = kv.string(key, default);
            (!value.is_empty()).then_some(value)
        };

        let limit = kv.int(LIMIT_NOFILE, LIMIT_NOFILE_DEFAULT);
        let templates = TEMPLATE_KEYS
            .iter()
            .filter_map(|key| non_empty(key, "").map(|src| (key.to_string(), src)))
            .collect();

        Self {
            keep_alive: kv.bool(KEEP_ALIVE, KEEP_ALIVE_DEFAULT),
            run_at_load: kv.bool(RUN_AT_LOAD, RUN_AT_LOAD_DEFAULT),
            user_service: kv.bool(USER_SERVICE, USER_SERVICE_DEFAULT),
            session_create: kv.bool(SESSION_CREATE, SESSION_CREATE_DEFAULT),
            log_output: kv.bool(LOG_OUTPUT, LOG_OUTPUT_DEFAULT),
            prefix: kv.string(PREFIX, PREFIX_DEFAULT),
            run_wait: kv.func(RUN_WAIT),
            reload_signal: non_empty(RELOAD_SIGNAL, ""),
            pid_file: non_empty(PID_FILE, ""),
            limit_nofile: u64::try_from(limit).ok(),
            restart: non_empty(RESTART, RESTART_DEFAULT),
            success_exit_status: non_empty(SUCCESS_EXIT_STATUS, ""),
            log_directory: non_empty(LOG_DIRECTORY, "").map(PathBuf::from),
            templates,
        }
    }

    /// Custom template registered under `key`, if any.
    pub fn template(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }
}
