use folio_auth_impl::AuthServiceImpl;
use folio_core_contact_impl::ContactFeatureServiceImpl;
use folio_core_health_impl::HealthFeatureServiceImpl;
use folio_persistence_postgres::{contact::PostgresContactRepository, PostgresDatabase};
use folio_shared_impl::{id::IdServiceImpl, time::TimeServiceImpl};

// API
pub type RestServer = folio_api_rest::RestServer<HealthFeature, ContactFeature, Auth>;

// Persistence
pub type Database = PostgresDatabase;

// Shared
pub type Id = IdServiceImpl;
pub type Time = TimeServiceImpl;

// Repositories
pub type ContactRepo = PostgresContactRepository;

// Auth
pub type Auth = AuthServiceImpl;

// Core
pub type HealthFeature = HealthFeatureServiceImpl<Time, Database>;
pub type ContactFeature = ContactFeatureServiceImpl<Database, Id, Time, ContactRepo>;
