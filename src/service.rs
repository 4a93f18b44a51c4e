use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use tracing::warn;

use crate::error::Error;
use crate::field::{Field, FieldKind};

/// How a client negotiates SSL with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SslMode {
    Disable,
    Allow,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    pub const ALL: [SslMode; 6] = [
        Self::Disable,
        Self::Allow,
        Self::Prefer,
        Self::Require,
        Self::VerifyCa,
        Self::VerifyFull,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disable => "disable",
            Self::Allow => "allow",
            Self::Prefer => "prefer",
            Self::Require => "require",
            Self::VerifyCa => "verify-ca",
            Self::VerifyFull => "verify-full",
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown ssl mode")]
pub struct UnknownSslMode;

impl FromStr for SslMode {
    type Err = UnknownSslMode;

    /// Matching is case-sensitive: `Disable` is not a valid mode.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or(UnknownSslMode)
    }
}

/// A raw value after it has been coerced to its field's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Value {
    Text(String),
    Integer(i64),
    Boolean(bool),
    SslMode(SslMode),
    Address(IpAddr),
}

impl Value {
    fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Integer(_) => FieldKind::Integer,
            Self::Boolean(_) => FieldKind::Boolean,
            Self::SslMode(_) => FieldKind::SslMode,
            Self::Address(_) => FieldKind::Address,
        }
    }
}

/// Convert the raw text of `field` into a typed value.
///
/// Booleans are permissive: anything other than `false`, `f` or `0` (ignoring case) is true, and
/// only an empty value is rejected.
///
/// An unknown `sslmode` is not an error. It yields `None` and the field is left unset.
pub(crate) fn coerce(field: Field, raw: &str) -> Result<Option<Value>, Error> {
    let value = match field.kind() {
        FieldKind::Text => Value::Text(raw.to_owned()),
        FieldKind::Integer => {
            let n = raw.parse::<i64>().map_err(|source| Error::MalformedInteger {
                field,
                value: raw.to_owned(),
                source,
            })?;
            Value::Integer(n)
        }
        FieldKind::Boolean => {
            if raw.is_empty() {
                return Err(Error::MissingBoolean { field });
            }
            let lower = raw.to_lowercase();
            Value::Boolean(!matches!(lower.as_str(), "false" | "f" | "0"))
        }
        FieldKind::SslMode => match raw.parse::<SslMode>() {
            Ok(mode) => Value::SslMode(mode),
            Err(UnknownSslMode) => {
                warn!(%field, value = raw, "ignoring unknown ssl mode");
                return Ok(None);
            }
        },
        FieldKind::Address => {
            let addr = raw.parse::<IpAddr>().map_err(|source| Error::MalformedAddress {
                field,
                value: raw.to_owned(),
                source,
            })?;
            Value::Address(addr)
        }
    };

    Ok(Some(value))
}

/// The connection parameters of one named service.
///
/// Every field is optional; a parameter missing from the file is `None`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Service {
    host: Option<String>,
    hostaddr: Option<IpAddr>,
    port: Option<i64>,
    dbname: Option<String>,
    user: Option<String>,
    password: Option<String>,
    connect_timeout: Option<i64>,
    client_encoding: Option<String>,
    options: Option<String>,
    application_name: Option<String>,
    fallback_application_name: Option<String>,
    keepalives: Option<bool>,
    keepalives_idle: Option<i64>,
    keepalives_interval: Option<i64>,
    keepalives_count: Option<i64>,
    tty: Option<String>,
    sslmode: Option<SslMode>,
    require_ssl: Option<bool>,
    sslcompression: Option<bool>,
    sslcert: Option<String>,
    sslkey: Option<String>,
    sslrootcert: Option<String>,
    sslcrl: Option<String>,
    requirepeer: Option<String>,
    krbsrvname: Option<String>,
    gsslib: Option<String>,
}

impl Service {
    #[must_use]
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::default()
    }

    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    #[must_use]
    pub fn hostaddr(&self) -> Option<IpAddr> {
        self.hostaddr
    }

    #[must_use]
    pub fn port(&self) -> Option<i64> {
        self.port
    }

    #[must_use]
    pub fn dbname(&self) -> Option<&str> {
        self.dbname.as_deref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Option<i64> {
        self.connect_timeout
    }

    #[must_use]
    pub fn client_encoding(&self) -> Option<&str> {
        self.client_encoding.as_deref()
    }

    #[must_use]
    pub fn options(&self) -> Option<&str> {
        self.options.as_deref()
    }

    #[must_use]
    pub fn application_name(&self) -> Option<&str> {
        self.application_name.as_deref()
    }

    #[must_use]
    pub fn fallback_application_name(&self) -> Option<&str> {
        self.fallback_application_name.as_deref()
    }

    #[must_use]
    pub fn keepalives(&self) -> Option<bool> {
        self.keepalives
    }

    #[must_use]
    pub fn keepalives_idle(&self) -> Option<i64> {
        self.keepalives_idle
    }

    #[must_use]
    pub fn keepalives_interval(&self) -> Option<i64> {
        self.keepalives_interval
    }

    #[must_use]
    pub fn keepalives_count(&self) -> Option<i64> {
        self.keepalives_count
    }

    /// Ignored by servers, but allowed to appear in a service file.
    #[must_use]
    pub fn tty(&self) -> Option<&str> {
        self.tty.as_deref()
    }

    #[must_use]
    pub fn sslmode(&self) -> Option<SslMode> {
        self.sslmode
    }

    /// Kept for the diagnostic dump's `requiressl` line. The deprecated `requiressl` key is
    /// rejected as unrecognized, so this is always `None`; use [`Service::sslmode`] instead.
    #[doc(hidden)]
    #[must_use]
    pub fn require_ssl(&self) -> Option<bool> {
        self.require_ssl
    }

    #[must_use]
    pub fn sslcompression(&self) -> Option<bool> {
        self.sslcompression
    }

    #[must_use]
    pub fn sslcert(&self) -> Option<&str> {
        self.sslcert.as_deref()
    }

    #[must_use]
    pub fn sslkey(&self) -> Option<&str> {
        self.sslkey.as_deref()
    }

    #[must_use]
    pub fn sslrootcert(&self) -> Option<&str> {
        self.sslrootcert.as_deref()
    }

    #[must_use]
    pub fn sslcrl(&self) -> Option<&str> {
        self.sslcrl.as_deref()
    }

    #[must_use]
    pub fn requirepeer(&self) -> Option<&str> {
        self.requirepeer.as_deref()
    }

    #[must_use]
    pub fn krbsrvname(&self) -> Option<&str> {
        self.krbsrvname.as_deref()
    }

    #[must_use]
    pub fn gsslib(&self) -> Option<&str> {
        self.gsslib.as_deref()
    }

    fn masked_password(&self) -> &'static str {
        match self.password.as_deref() {
            Some(p) if !p.is_empty() => "<defined>",
            _ => "<none>",
        }
    }
}

/// Accumulates validated fields for a [`Service`].
#[derive(Debug, Clone, Default)]
pub struct ServiceBuilder {
    service: Service,
}

impl ServiceBuilder {
    /// Normalize `key`, coerce `raw` and record the result. A later value for the same key
    /// replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Fails if the key is unrecognized or the value does not fit the field's kind.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<&mut Self, Error> {
        let field = Field::from_key(key)?;

        if let Some(value) = coerce(field, raw)? {
            self.apply(field, value)?;
        }

        Ok(self)
    }

    pub(crate) fn apply(&mut self, field: Field, value: Value) -> Result<(), Error> {
        let s = &mut self.service;

        match (field, value) {
            (Field::Host, Value::Text(v)) => s.host = Some(v),
            (Field::HostAddr, Value::Address(v)) => s.hostaddr = Some(v),
            (Field::Port, Value::Integer(v)) => s.port = Some(v),
            (Field::DbName, Value::Text(v)) => s.dbname = Some(v),
            (Field::User, Value::Text(v)) => s.user = Some(v),
            (Field::Password, Value::Text(v)) => s.password = Some(v),
            (Field::ConnectTimeout, Value::Integer(v)) => s.connect_timeout = Some(v),
            (Field::ClientEncoding, Value::Text(v)) => s.client_encoding = Some(v),
            (Field::Options, Value::Text(v)) => s.options = Some(v),
            (Field::ApplicationName, Value::Text(v)) => s.application_name = Some(v),
            (Field::FallbackApplicationName, Value::Text(v)) => {
                s.fallback_application_name = Some(v);
            }
            (Field::KeepAlives, Value::Boolean(v)) => s.keepalives = Some(v),
            (Field::KeepAlivesIdle, Value::Integer(v)) => s.keepalives_idle = Some(v),
            (Field::KeepAlivesInterval, Value::Integer(v)) => s.keepalives_interval = Some(v),
            (Field::KeepAlivesCount, Value::Integer(v)) => s.keepalives_count = Some(v),
            (Field::Tty, Value::Text(v)) => s.tty = Some(v),
            (Field::SslMode, Value::SslMode(v)) => s.sslmode = Some(v),
            (Field::SslCompression, Value::Boolean(v)) => s.sslcompression = Some(v),
            (Field::SslCert, Value::Text(v)) => s.sslcert = Some(v),
            (Field::SslKey, Value::Text(v)) => s.sslkey = Some(v),
            (Field::SslRootCert, Value::Text(v)) => s.sslrootcert = Some(v),
            (Field::SslCrl, Value::Text(v)) => s.sslcrl = Some(v),
            (Field::RequirePeer, Value::Text(v)) => s.requirepeer = Some(v),
            (Field::KrbSrvName, Value::Text(v)) => s.krbsrvname = Some(v),
            (Field::GssLib, Value::Text(v)) => s.gsslib = Some(v),
            (field, value) => {
                return Err(Error::UnsupportedFieldType {
                    field,
                    kind: value.kind(),
                });
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn build(self) -> Service {
        self.service
    }
}

/// Displays `None` as an empty string.
struct Opt<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for Opt<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => v.fmt(f),
            None => Ok(()),
        }
    }
}

/// Displays a boolean as `1` or `0`, and `None` as an empty string.
struct Flag(Option<bool>);

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(true) => "1".fmt(f),
            Some(false) => "0".fmt(f),
            None => Ok(()),
        }
    }
}

/// A readable dump for logs and debugging. The password is never printed, and the output is
/// not meant to be parsed again.
impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dbname = {}", Opt(&self.dbname))?;
        writeln!(f, "host = {}", Opt(&self.host))?;
        writeln!(f, "hostaddr = {}", Opt(&self.hostaddr))?;
        writeln!(f, "port = {}", Opt(&self.port))?;
        writeln!(f, "user = {}", Opt(&self.user))?;
        writeln!(f, "password = {}", self.masked_password())?;
        writeln!(f)?;
        writeln!(f, "connect_timeout = {}", Opt(&self.connect_timeout))?;
        writeln!(f, "client_encoding = {}", Opt(&self.client_encoding))?;
        writeln!(f)?;
        writeln!(f, "options = {}", Opt(&self.options))?;
        writeln!(f, "tty = {}", Opt(&self.tty))?;
        writeln!(f)?;
        writeln!(f, "application_name = {}", Opt(&self.application_name))?;
        writeln!(
            f,
            "fallback_application_name = {}",
            Opt(&self.fallback_application_name)
        )?;
        writeln!(f)?;
        writeln!(f, "keepalives = {}", Flag(self.keepalives))?;
        writeln!(f, "keepalives_idle = {}", Opt(&self.keepalives_idle))?;
        writeln!(f, "keepalives_interval = {}", Opt(&self.keepalives_interval))?;
        writeln!(f, "keepalives_count = {}", Opt(&self.keepalives_count))?;
        writeln!(f)?;
        writeln!(f, "sslmode = {}", Opt(&self.sslmode))?;
        writeln!(f, "requiressl = {}", Flag(self.require_ssl))?;
        writeln!(f, "sslcompression = {}", Flag(self.sslcompression))?;
        writeln!(f, "sslcert = {}", Opt(&self.sslcert))?;
        writeln!(f, "sslkey = {}", Opt(&self.sslkey))?;
        writeln!(f, "sslrootcert = {}", Opt(&self.sslrootcert))?;
        writeln!(f, "sslcrl = {}", Opt(&self.sslcrl))?;
        writeln!(f)?;
        writeln!(f, "requirepeer = {}", Opt(&self.requirepeer))?;
        writeln!(f)?;
        writeln!(f, "krbsrvname = {}", Opt(&self.krbsrvname))?;
        writeln!(f, "gsslib = {}", Opt(&self.gsslib))
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("host", &self.host)
            .field("hostaddr", &self.hostaddr)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &self.masked_password())
            .field("connect_timeout", &self.connect_timeout)
            .field("client_encoding", &self.client_encoding)
            .field("options", &self.options)
            .field("application_name", &self.application_name)
            .field("fallback_application_name", &self.fallback_application_name)
            .field("keepalives", &self.keepalives)
            .field("keepalives_idle", &self.keepalives_idle)
            .field("keepalives_interval", &self.keepalives_interval)
            .field("keepalives_count", &self.keepalives_count)
            .field("tty", &self.tty)
            .field("sslmode", &self.sslmode)
            .field("require_ssl", &self.require_ssl)
            .field("sslcompression", &self.sslcompression)
            .field("sslcert", &self.sslcert)
            .field("sslkey", &self.sslkey)
            .field("sslrootcert", &self.sslrootcert)
            .field("sslcrl", &self.sslcrl)
            .field("requirepeer", &self.requirepeer)
            .field("krbsrvname", &self.krbsrvname)
            .field("gsslib", &self.gsslib)
            .finish()
    }
}
