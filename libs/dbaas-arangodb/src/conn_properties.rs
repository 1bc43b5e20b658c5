//! Typed ArangoDB connection properties.

use std::fmt;

use dbaas_sdk::{BasicAuth, ConnectionPropertiesMap};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::error::DbaasError;

/// Property map keys.
pub mod keys {
    pub const HOST: &str = "host";
    pub const PORT: &str = "port";
    pub const DB_NAME: &str = "dbName";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const TLS: &str = "tls";
}

/// Connection properties of one ArangoDB logical database.
#[derive(Clone)]
pub struct ArangoConnProperties {
    pub host: String,
    pub port: u16,
    pub db_name: String,
    pub username: String,
    pub password: SecretString,
    /// `None` when the aggregator did not say.
    pub tls: Option<bool>,
}

impl ArangoConnProperties {
    #[must_use]
    pub fn basic_auth(&self) -> BasicAuth {
        BasicAuth::new(self.username.clone(), self.password.clone())
    }

    #[must_use]
    pub fn is_tls(&self) -> bool {
        self.tls == Some(true)
    }

    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for ArangoConnProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArangoConnProperties")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db_name", &self.db_name)
            .field("username", &self.username)
            .field("password", &self.password)
            .field("tls", &self.tls)
            .finish()
    }
}

impl TryFrom<&ConnectionPropertiesMap> for ArangoConnProperties {
    type Error = DbaasError;

    fn try_from(map: &ConnectionPropertiesMap) -> Result<Self, Self::Error> {
        if map.is_empty() {
            return Err(DbaasError::Translation {
                field: keys::HOST,
                reason: "connection properties are empty".to_owned(),
            });
        }

        Ok(Self {
            host: required_str(map, keys::HOST)?,
            port: port(map)?,
            db_name: required_str(map, keys::DB_NAME)?,
            username: required_str(map, keys::USERNAME)?,
            password: SecretString::from(required_str(map, keys::PASSWORD)?),
            tls: optional_bool(map, keys::TLS)?,
        })
    }
}

fn required_str(map: &ConnectionPropertiesMap, field: &'static str) -> Result<String, DbaasError> {
    match map.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(translation(
            field,
            format!("expected a string, got {}", type_name(other)),
        )),
        None => Err(translation(field, "missing")),
    }
}

fn port(map: &ConnectionPropertiesMap) -> Result<u16, DbaasError> {
    let field = keys::PORT;
    let Some(value) = map.get(field) else {
        return Err(translation(field, "missing"));
    };
    let Value::Number(n) = value else {
        return Err(translation(
            field,
            format!("expected a number, got {}", type_name(value)),
        ));
    };

    if let Some(v) = n.as_u64() {
        return u16::try_from(v).map_err(|_| translation(field, format!("{v} is out of range")));
    }

    // Aggregators serialize ports through float-typed JSON decoders.
    n.as_f64()
        .and_then(integral_port)
        .ok_or_else(|| translation(field, format!("{n} is not a valid port")))
}

#[allow(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn integral_port(f: f64) -> Option<u16> {
    if f.trunc() != f || !(0.0..=f64::from(u16::MAX)).contains(&f) {
        return None;
    }
    Some(f as u16)
}

fn optional_bool(
    map: &ConnectionPropertiesMap,
    field: &'static str,
) -> Result<Option<bool>, DbaasError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(translation(
            field,
            format!("expected a boolean, got {}", type_name(other)),
        )),
    }
}

fn translation(field: &'static str, reason: impl Into<String>) -> DbaasError {
    DbaasError::Translation {
        field,
        reason: reason.into(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
