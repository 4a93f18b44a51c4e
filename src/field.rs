use std::fmt;

use crate::error::Error;

/// A recognized connection parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Host,
    HostAddr,
    Port,
    DbName,
    User,
    Password,
    ConnectTimeout,
    ClientEncoding,
    Options,
    ApplicationName,
    FallbackApplicationName,
    KeepAlives,
    KeepAlivesIdle,
    KeepAlivesInterval,
    KeepAlivesCount,
    Tty,
    SslMode,
    SslCompression,
    SslCert,
    SslKey,
    SslRootCert,
    SslCrl,
    RequirePeer,
    KrbSrvName,
    GssLib,
}

/// The shape a field's raw text is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Boolean,
    SslMode,
    Address,
}

impl Field {
    pub const ALL: [Field; 25] = [
        Self::Host,
        Self::HostAddr,
        Self::Port,
        Self::DbName,
        Self::User,
        Self::Password,
        Self::ConnectTimeout,
        Self::ClientEncoding,
        Self::Options,
        Self::ApplicationName,
        Self::FallbackApplicationName,
        Self::KeepAlives,
        Self::KeepAlivesIdle,
        Self::KeepAlivesInterval,
        Self::KeepAlivesCount,
        Self::Tty,
        Self::SslMode,
        Self::SslCompression,
        Self::SslCert,
        Self::SslKey,
        Self::SslRootCert,
        Self::SslCrl,
        Self::RequirePeer,
        Self::KrbSrvName,
        Self::GssLib,
    ];

    /// Look up the field a service file key refers to, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedKey`] if `key` is not a known connection parameter.
    pub fn from_key(key: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| Error::UnrecognizedKey {
                key: key.to_owned(),
            })
    }

    /// The canonical (lowercase) spelling of the key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::HostAddr => "hostaddr",
            Self::Port => "port",
            Self::DbName => "dbname",
            Self::User => "user",
            Self::Password => "password",
            Self::ConnectTimeout => "connect_timeout",
            Self::ClientEncoding => "client_encoding",
            Self::Options => "options",
            Self::ApplicationName => "application_name",
            Self::FallbackApplicationName => "fallback_application_name",
            Self::KeepAlives => "keepalives",
            Self::KeepAlivesIdle => "keepalives_idle",
            Self::KeepAlivesInterval => "keepalives_interval",
            Self::KeepAlivesCount => "keepalives_count",
            Self::Tty => "tty",
            Self::SslMode => "sslmode",
            Self::SslCompression => "sslcompression",
            Self::SslCert => "sslcert",
            Self::SslKey => "sslkey",
            Self::SslRootCert => "sslrootcert",
            Self::SslCrl => "sslcrl",
            Self::RequirePeer => "requirepeer",
            Self::KrbSrvName => "krbsrvname",
            Self::GssLib => "gsslib",
        }
    }

    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Port
            | Self::ConnectTimeout
            | Self::KeepAlivesIdle
            | Self::KeepAlivesInterval
            | Self::KeepAlivesCount => FieldKind::Integer,
            Self::KeepAlives | Self::SslCompression => FieldKind::Boolean,
            Self::SslMode => FieldKind::SslMode,
            Self::HostAddr => FieldKind::Address,
            Self::Host
            | Self::DbName
            | Self::User
            | Self::Password
            | Self::ClientEncoding
            | Self::Options
            | Self::ApplicationName
            | Self::FallbackApplicationName
            | Self::Tty
            | Self::SslCert
            | Self::SslKey
            | Self::SslRootCert
            | Self::SslCrl
            | Self::RequirePeer
            | Self::KrbSrvName
            | Self::GssLib => FieldKind::Text,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key().fmt(f)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Text => "string".fmt(f),
            Self::Integer => "integer".fmt(f),
            Self::Boolean => "boolean".fmt(f),
            Self::SslMode => "ssl mode".fmt(f),
            Self::Address => "network address".fmt(f),
        }
    }
}
