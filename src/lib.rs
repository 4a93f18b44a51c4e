#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

//! Parse a connection service file (`pg_service.conf`) into validated, typed services.
//!
//! ```
//! let group: pgservice::ServiceGroup = "[main]\nhost = localhost\nport = 5432\n".parse()?;
//! assert_eq!(group.get("main").and_then(|s| s.port()), Some(5432));
//! # Ok::<(), pgservice::Error>(())
//! ```

mod error;
mod field;
mod parser;
mod section;
mod service;

use std::collections::BTreeMap;
use std::collections::btree_map::{self, Entry as MapEntry};
use std::io::Read;
use std::str::FromStr;

use tracing::debug;

pub use crate::error::{Error, ParseError};
pub use crate::field::{Field, FieldKind};
pub use crate::parser::Parser;
pub use crate::section::{Entry, Section};
pub use crate::service::{Service, ServiceBuilder, SslMode, UnknownSslMode};

/// UTF-8 encoded Byte Order Mark, which some editors put at the start of a file.
const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Every service defined in one service file, keyed by section name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceGroup {
    services: BTreeMap<String, Service>,
}

impl ServiceGroup {
    /// Parse the contents of a service file.
    ///
    /// The first problem found aborts the parse; no partial group is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not well-formed, a key is unknown, a value does not fit
    /// its field, or two sections share a name.
    pub fn parse(buffer: &[u8]) -> Result<Self, Error> {
        let text = decode_data(buffer)?;
        let sections = Parser::new(text).into_sections()?;

        let mut services = BTreeMap::new();
        for section in sections {
            let service = assemble(&section)?;

            match services.entry(section.name().to_owned()) {
                MapEntry::Vacant(slot) => {
                    slot.insert(service);
                }
                MapEntry::Occupied(slot) => {
                    return Err(Error::DuplicateService {
                        name: slot.key().clone(),
                    });
                }
            }
        }

        debug!(services = services.len(), "parsed service file");

        Ok(Self { services })
    }

    /// Read `reader` to the end and parse what was read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadFailure`] if reading fails, otherwise the same errors as
    /// [`ServiceGroup::parse`].
    pub fn from_reader<R>(reader: &mut R) -> Result<Self, Error>
    where
        R: Read + ?Sized,
    {
        let mut buffer = Vec::with_capacity(4096);
        reader.read_to_end(&mut buffer)?;

        Self::parse(&buffer)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Service names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Service> {
        self.services.iter()
    }

    #[must_use]
    pub fn services(&self) -> &BTreeMap<String, Service> {
        &self.services
    }

    #[must_use]
    pub fn into_services(self) -> BTreeMap<String, Service> {
        self.services
    }
}

impl FromStr for ServiceGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

impl<'a> IntoIterator for &'a ServiceGroup {
    type Item = (&'a String, &'a Service);
    type IntoIter = btree_map::Iter<'a, String, Service>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Fold every entry of `section` into a single service.
fn assemble(section: &Section) -> Result<Service, Error> {
    debug!(
        section = section.name(),
        entries = section.entries().len(),
        "assembling service"
    );

    let mut builder = Service::builder();
    for entry in section.entries() {
        builder.set(entry.key(), entry.value())?;
    }

    Ok(builder.build())
}

// Service files must be UTF-8. Values such as passwords are kept byte for byte, so an
// undecodable line is rejected rather than patched with replacement characters.
fn decode_data(data: &[u8]) -> Result<&str, ParseError> {
    let data = data.strip_prefix(BOM_UTF8).unwrap_or(data);

    std::str::from_utf8(data).map_err(|err| {
        let valid = &data[..err.valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        ParseError::InvalidUtf8 { line }
    })
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use pretty_assertions::assert_eq;

    use super::*;

    const TWO_SERVICES: &[u8] = b"[service_one]
host = localhost
port = 5432
dbname = test_db
sslmode = required
sslcrl = /etc/ssl/crl/root.crl
sslrootcert = /etc/postgres/ssl/rootcert.crt
sslcert = /etc/ssl/cert/postgres.crt
keepalives = 1
[service_two]
host = db.example.com
port = 5432
dbname = test_db
user = dbuser
password = abc123
";

    #[test]
    fn minimal_document() {
        let buffer = b"[service_one]
host = localhost
port = 5432
dbname = test_db
sslmode = disable";

        let group = ServiceGroup::parse(buffer).expect("failed to parse hardcoded service file");

        let mut expected = Service::builder();
        expected
            .set("host", "localhost")
            .and_then(|b| b.set("port", "5432"))
            .and_then(|b| b.set("dbname", "test_db"))
            .and_then(|b| b.set("sslmode", "disable"))
            .expect("expected hardcoded values to be valid");

        assert_eq!(group.len(), 1);
        assert_eq!(group.get("service_one"), Some(&expected.build()));

        let service = group.get("service_one").expect("service_one should exist");
        assert_eq!(service.host(), Some("localhost"));
        assert_eq!(service.port(), Some(5432));
        assert_eq!(service.dbname(), Some("test_db"));
        assert_eq!(service.sslmode(), Some(SslMode::Disable));
        assert_eq!(service.user(), None);
        assert_eq!(service.keepalives(), None);
    }

    #[test]
    fn two_services() {
        let group =
            ServiceGroup::parse(TWO_SERVICES).expect("failed to parse hardcoded service file");

        assert_eq!(group.names().collect::<Vec<_>>(), ["service_one", "service_two"]);

        let one = group.get("service_one").expect("service_one should exist");
        assert_eq!(one.keepalives(), Some(true));
        assert_eq!(one.sslcrl(), Some("/etc/ssl/crl/root.crl"));
        // `required` is not a valid mode and is dropped without an error.
        assert_eq!(one.sslmode(), None);
        assert_eq!(one.password(), None);

        let two = group.get("service_two").expect("service_two should exist");
        assert_eq!(two.host(), Some("db.example.com"));
        assert_eq!(two.user(), Some("dbuser"));
        assert_eq!(two.password(), Some("abc123"));
        assert_eq!(two.sslcert(), None);
    }

    #[test]
    fn section_names_are_case_sensitive() {
        let group = ServiceGroup::parse(b"[Main]\nport = 1\n[main]\nport = 2\n")
            .expect("failed to parse hardcoded service file");

        assert_eq!(group.len(), 2);
        assert_eq!(group.get("Main").and_then(Service::port), Some(1));
        assert_eq!(group.get("main").and_then(Service::port), Some(2));
        assert!(!group.contains("MAIN"));
    }

    #[test]
    fn empty_section_yields_default_service() {
        let group = ServiceGroup::parse(b"[bare]\n").expect("failed to parse");

        assert_eq!(group.get("bare"), Some(&Service::default()));
    }

    #[test]
    fn duplicate_service_names() {
        let err = ServiceGroup::parse(b"[dup]\nhost = a\n[other]\n[dup]\nport = 1\n")
            .expect_err("expected duplicate to be rejected");

        assert!(matches!(err, Error::DuplicateService { ref name } if name == "dup"));
        assert_eq!(err.to_string(), "a service named \"dup\" already exists");
    }

    #[test]
    fn identical_duplicates_are_still_rejected() {
        let result = ServiceGroup::parse(b"[dup]\nhost = a\n[dup]\nhost = a\n");

        assert!(matches!(result, Err(Error::DuplicateService { .. })));
    }

    #[test]
    fn unknown_key_anywhere_fails_the_parse() {
        let buffer = b"[good]\nhost = localhost\n[bad]\nhost = localhost\nblah = wat\n";
        let err = ServiceGroup::parse(buffer).expect_err("expected unknown key to be rejected");

        assert!(matches!(err, Error::UnrecognizedKey { ref key } if key == "blah"));
    }

    #[test]
    fn malformed_values_fail_the_parse() {
        assert!(matches!(
            ServiceGroup::parse(b"[svc]\nport = five\n"),
            Err(Error::MalformedInteger { field: Field::Port, .. })
        ));
        assert!(matches!(
            ServiceGroup::parse(b"[svc]\nkeepalives = \n"),
            Err(Error::MissingBoolean { field: Field::KeepAlives })
        ));
        assert!(matches!(
            ServiceGroup::parse(b"[svc]\nkeepalives = \"\"\n"),
            Err(Error::MissingBoolean { field: Field::KeepAlives })
        ));
    }

    #[test]
    fn invalid_buffers() {
        let cases: [(&[u8], ParseError); 4] = [
            (&b"butts"[..], ParseError::EntryOutsideSection { line: 1 }),
            (&b"[cat"[..], ParseError::UnterminatedSectionName { line: 1 }),
            (&b"[category]\nblah"[..], ParseError::MissingEquals { line: 2 }),
            (&b""[..], ParseError::NoSections),
        ];

        for (buffer, expected) in cases {
            match ServiceGroup::parse(buffer) {
                Err(Error::Syntax(err)) => assert_eq!(err, expected),
                other => panic!("expected syntax error {expected:?}, got {other:?}"),
            }
        }

        assert!(matches!(
            ServiceGroup::parse(b"[category]\nblah=wat"),
            Err(Error::UnrecognizedKey { .. })
        ));
    }

    #[test]
    fn parsing_twice_is_equal() {
        let first = ServiceGroup::from_reader(&mut Cursor::new(TWO_SERVICES))
            .expect("failed to parse hardcoded service file");
        let second = ServiceGroup::from_reader(&mut Cursor::new(TWO_SERVICES))
            .expect("failed to parse hardcoded service file");

        assert_eq!(first, second);
    }

    #[test]
    fn from_str_matches_parse() {
        let text = std::str::from_utf8(TWO_SERVICES).expect("hardcoded file is UTF-8");

        assert_eq!(
            text.parse::<ServiceGroup>().expect("failed to parse"),
            ServiceGroup::parse(TWO_SERVICES).expect("failed to parse")
        );
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        let group = ServiceGroup::parse(b"\xEF\xBB\xBF[svc]\nhost = h\n").expect("failed to parse");

        assert!(group.contains("svc"));
    }

    #[test]
    fn utf8_values_are_kept_exactly() {
        let group = ServiceGroup::parse("[svc]\npassword = café\n".as_bytes())
            .expect("failed to parse hardcoded service file");

        assert_eq!(group.get("svc").and_then(Service::password), Some("café"));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = ServiceGroup::parse(b"[svc]\nhost = h\npassword = caf\xE9\n")
            .expect_err("expected Latin-1 text to be rejected");

        assert!(matches!(err, Error::Syntax(ParseError::InvalidUtf8 { line: 3 })));
        assert!(matches!(
            ServiceGroup::parse(b"\xEF\xBB\xBF[svc\xFF]\n"),
            Err(Error::Syntax(ParseError::InvalidUtf8 { line: 1 }))
        ));
    }

    #[test]
    fn read_failure() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }

        let err = ServiceGroup::from_reader(&mut Broken).expect_err("expected read to fail");

        assert!(matches!(err, Error::ReadFailure { .. }));
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string),
            Some("disk on fire".to_owned())
        );
    }

    #[test]
    fn syntax_error_exposes_its_cause() {
        let err = ServiceGroup::parse(b"[cat").expect_err("expected syntax error");

        assert_eq!(err.to_string(), "invalid syntax");
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string),
            Some("line 1: section name is missing a closing ']'".to_owned())
        );
    }

    #[test]
    fn iteration_is_sorted_by_name() {
        let group = ServiceGroup::parse(b"[zeta]\n[alpha]\n[mid]\n").expect("failed to parse");
        let names: Vec<&String> = (&group).into_iter().map(|(name, _)| name).collect();

        assert_eq!(names, ["alpha", "mid", "zeta"]);
        assert_eq!(group.into_services().len(), 3);
    }
}
