use std::fmt;

/// Outcome of a single login attempt.
///
/// Login never returns an error; callers inspect this value and decide whether the
/// following fetch is worth attempting.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AuthResult {
    /// Credentials accepted, session token stored
    Success,
    /// The device answered but refused the login (any non-200)
    Unsuccessful,
    /// No usable answer (timeout, refused connection, browser failure)
    TransportError,
}

/// Authentication state of a [`DeviceSession`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
    Failed,
}

/// Per-request session with one controller or portal account.
///
/// Owned by exactly one client and dropped with it; sessions are never
/// pooled between requests.
///
/// Portal sessions never hold a token: the browser keeps the portal cookies,
/// so an authenticated portal session has an empty token and
/// [`DeviceSession::has_token`] stays false.
#[derive(Debug)]
pub struct DeviceSession {
    target: String,
    token: String,
    state: AuthState,
}

impl DeviceSession {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            token: String::new(),
            state: AuthState::Unauthenticated,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Session token, empty while unauthenticated.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// A token is cached, so fetches may skip the login step.
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    pub(crate) fn authenticated(&mut self, token: impl Into<String>) {
        self.token = token.into();
        self.state = AuthState::Authenticated;
    }

    pub(crate) fn failed(&mut self) {
        self.token.clear();
        self.state = AuthState::Failed;
    }
}

/// Time range requested from log endpoints.
///
/// Chosen by the caller per fetch: live metrics always use `Live`, bulk
/// exports use `Debug`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LogWindow {
    /// Last day only
    Live,
    /// Long range (days to a year, depending on the endpoint)
    Debug,
}

/// Three-state reading for on/off style values reported as strings.
///
/// `Unknown` means the reported value could not be evaluated; it only turns
/// into the numeric sentinel `2` when a metric line is rendered.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SwitchState {
    Off,
    On,
    Unknown,
}

impl SwitchState {
    pub fn from_reported(status: &str) -> Self {
        match status {
            "OFF" => SwitchState::Off,
            "ON" => SwitchState::On,
            _ => SwitchState::Unknown,
        }
    }

    pub fn metric_value(self) -> f64 {
        match self {
            SwitchState::Off => 0.0,
            SwitchState::On => 1.0,
            SwitchState::Unknown => 2.0,
        }
    }
}

/// Health of a hardware module as reported by the portal.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ModuleHealth {
    Ok,
    Unknown,
}

impl ModuleHealth {
    pub fn from_reported(status: &str) -> Self {
        if status == "OK" {
            ModuleHealth::Ok
        } else {
            ModuleHealth::Unknown
        }
    }

    pub fn metric_value(self) -> f64 {
        match self {
            ModuleHealth::Ok => 1.0,
            ModuleHealth::Unknown => 2.0,
        }
    }
}

/// Whether a hardware module is physically detected on the bus.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Presence {
    Present,
    Absent,
}

impl From<bool> for Presence {
    fn from(present: bool) -> Self {
        if present {
            Presence::Present
        } else {
            Presence::Absent
        }
    }
}

impl Presence {
    pub fn metric_value(self) -> f64 {
        match self {
            Presence::Present => 1.0,
            Presence::Absent => 2.0,
        }
    }
}

/// Origin of a `measurement` line.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DataSource {
    /// Live sensor value from the controller status listing
    Apex,
    /// Latest manual or Trident entry from the measurement log
    MeasurementLog,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataSource::Apex => write!(f, "apex"),
            DataSource::MeasurementLog => write!(f, "measurement_log"),
        }
    }
}
