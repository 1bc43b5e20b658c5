#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! In-memory aggregator and driver fakes for integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dbaas_arangodb::{DbaasArangoDbClient, DbaasConfig};
use dbaas_sdk::{
    BaseDbParams, BasicAuth, Classifier, ConnectionConfig, ConnectionPropertiesMap, DriverClient,
    DriverDatabase, DriverError, DriverFactory, LogicalDb, ProvisioningClient, ProvisioningError,
};
use serde_json::json;

pub const HOST: &str = "arango.host";
pub const PORT: u16 = 8529;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init()
        .ok();
}

pub fn db_name(db_id: &str) -> String {
    format!("db-test-name-{db_id}")
}

pub fn username(db_id: &str) -> String {
    format!("test-username-{db_id}")
}

pub fn password(db_id: &str) -> String {
    format!("test-password-{db_id}")
}

pub fn test_config() -> DbaasConfig {
    DbaasConfig {
        microservice_name: "test_service".to_owned(),
        namespace: "test_space".to_owned(),
        ..DbaasConfig::default()
    }
}

/// Aggregator fake: hands out deterministic properties per `dbId`.
#[derive(Default)]
pub struct FakeProvisioning {
    pub get_or_create_db_calls: AtomicUsize,
    pub get_connection_calls: AtomicUsize,
    password_override: Mutex<Option<String>>,
    tls: AtomicBool,
    malformed: AtomicBool,
    failures: AtomicUsize,
    delay: Mutex<Option<Duration>>,
    created: Mutex<HashSet<String>>,
    classifiers: Mutex<Vec<Classifier>>,
}

impl FakeProvisioning {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_password_override(&self, password: &str) {
        *self.password_override.lock().unwrap() = Some(password.to_owned());
    }

    pub fn set_tls(&self, tls: bool) {
        self.tls.store(tls, Ordering::SeqCst);
    }

    /// Return a non-numeric port from now on.
    pub fn set_malformed(&self, malformed: bool) {
        self.malformed.store(malformed, Ordering::SeqCst);
    }

    /// Fail the next `count` calls with a request error.
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn create_calls(&self) -> usize {
        self.get_or_create_db_calls.load(Ordering::SeqCst)
    }

    pub fn connection_calls(&self) -> usize {
        self.get_connection_calls.load(Ordering::SeqCst)
    }

    pub fn classifiers(&self) -> Vec<Classifier> {
        self.classifiers.lock().unwrap().clone()
    }

    fn properties(&self, db_id: &str) -> ConnectionPropertiesMap {
        let password = self
            .password_override
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| password(db_id));
        let port = if self.malformed.load(Ordering::SeqCst) {
            json!("not-a-port")
        } else {
            json!(PORT)
        };

        let mut props = json!({
            "host": HOST,
            "port": port,
            "dbName": db_name(db_id),
            "username": username(db_id),
            "password": password,
        });
        if self.tls.load(Ordering::SeqCst) {
            props["tls"] = json!(true);
        }
        match props {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    async fn before_call(&self, classifier: &Classifier) -> Result<String, ProvisioningError> {
        self.classifiers.lock().unwrap().push(classifier.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ProvisioningError::Request("503 Service Unavailable".to_owned()));
        }

        Ok(classifier.get("dbId").unwrap_or("default").to_owned())
    }
}

#[async_trait]
impl ProvisioningClient for FakeProvisioning {
    async fn get_or_create_db(
        &self,
        db_type: &str,
        classifier: &Classifier,
        _params: &BaseDbParams,
    ) -> Result<LogicalDb, ProvisioningError> {
        self.get_or_create_db_calls.fetch_add(1, Ordering::SeqCst);
        let db_id = self.before_call(classifier).await?;
        self.created.lock().unwrap().insert(db_id.clone());

        Ok(LogicalDb {
            id: format!("logical-{db_id}"),
            name: db_name(&db_id),
            namespace: classifier.get("namespace").map(str::to_owned),
            db_type: Some(db_type.to_owned()),
            classifier: Some(classifier.clone()),
            connection_properties: self.properties(&db_id),
        })
    }

    async fn get_connection(
        &self,
        _db_type: &str,
        classifier: &Classifier,
        _params: &BaseDbParams,
    ) -> Result<ConnectionPropertiesMap, ProvisioningError> {
        self.get_connection_calls.fetch_add(1, Ordering::SeqCst);
        let db_id = self.before_call(classifier).await?;

        if !self.created.lock().unwrap().contains(&db_id) {
            return Err(ProvisioningError::NotFound {
                classifier: classifier.to_string(),
            });
        }
        Ok(self.properties(&db_id))
    }
}

/// ArangoDB server fake shared by every client of one [`FakeDriver`].
#[derive(Default)]
pub struct FakeServer {
    /// Passwords that differ from the fixture default.
    users: Mutex<HashMap<String, String>>,
    no_leader: AtomicBool,
    unreachable: AtomicBool,
    pub database_calls: AtomicUsize,
    pub set_authentication_calls: AtomicUsize,
}

impl FakeServer {
    pub fn change_password(&self, username: &str, password: &str) {
        self.users
            .lock()
            .unwrap()
            .insert(username.to_owned(), password.to_owned());
    }

    pub fn set_no_leader(&self, no_leader: bool) {
        self.no_leader.store(no_leader, Ordering::SeqCst);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn accepts(&self, auth: &BasicAuth) -> bool {
        let users = self.users.lock().unwrap();
        match users.get(auth.username()) {
            Some(expected) => expected == auth.password(),
            None => auth
                .username()
                .strip_prefix("test-username-")
                .is_some_and(|db_id| auth.password() == password(db_id)),
        }
    }
}

#[derive(Debug)]
pub struct FakeDatabase {
    name: String,
}

impl DriverDatabase for FakeDatabase {
    fn name(&self) -> &str {
        &self.name
    }
}

pub struct FakeClient {
    server: Arc<FakeServer>,
    auth: Mutex<BasicAuth>,
}

#[async_trait]
impl DriverClient for FakeClient {
    fn set_authentication(&self, auth: BasicAuth) -> Result<(), DriverError> {
        self.server
            .set_authentication_calls
            .fetch_add(1, Ordering::SeqCst);
        *self.auth.lock().unwrap() = auth;
        Ok(())
    }

    async fn database(&self, name: &str) -> Result<Arc<dyn DriverDatabase>, DriverError> {
        self.server.database_calls.fetch_add(1, Ordering::SeqCst);
        if self.server.no_leader.load(Ordering::SeqCst) {
            return Err(DriverError::NoLeader("cluster has no leader".to_owned()));
        }
        if self.server.unreachable.load(Ordering::SeqCst) {
            return Err(DriverError::Connection("connection refused".to_owned()));
        }

        let auth = self.auth.lock().unwrap().clone();
        if !self.server.accepts(&auth) {
            return Err(DriverError::Unauthorized("401 not authorized".to_owned()));
        }
        Ok(Arc::new(FakeDatabase {
            name: name.to_owned(),
        }))
    }
}

#[derive(Default)]
pub struct FakeDriver {
    pub server: Arc<FakeServer>,
    configs: Mutex<Vec<ConnectionConfig>>,
    refuse_clients: AtomicBool,
}

impl FakeDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_refuse_clients(&self, refuse: bool) {
        self.refuse_clients.store(refuse, Ordering::SeqCst);
    }

    pub fn configs(&self) -> Vec<ConnectionConfig> {
        self.configs.lock().unwrap().clone()
    }

    pub fn clients_created(&self) -> usize {
        self.configs.lock().unwrap().len()
    }
}

impl DriverFactory for FakeDriver {
    fn new_client(&self, config: ConnectionConfig) -> Result<Arc<dyn DriverClient>, DriverError> {
        if self.refuse_clients.load(Ordering::SeqCst) {
            return Err(DriverError::Connection("invalid endpoint".to_owned()));
        }
        let auth = config.authentication.clone();
        self.configs.lock().unwrap().push(config);
        Ok(Arc::new(FakeClient {
            server: Arc::clone(&self.server),
            auth: Mutex::new(auth),
        }))
    }
}

pub struct Harness {
    pub provisioning: Arc<FakeProvisioning>,
    pub driver: Arc<FakeDriver>,
    pub dbaas: DbaasArangoDbClient,
}

pub fn harness() -> Harness {
    harness_with_config(test_config())
}

pub fn harness_with_config(config: DbaasConfig) -> Harness {
    init_tracing();
    let provisioning = FakeProvisioning::new();
    let driver = FakeDriver::new();
    let dbaas = DbaasArangoDbClient::new(provisioning.clone(), driver.clone(), config).unwrap();
    Harness {
        provisioning,
        driver,
        dbaas,
    }
}
