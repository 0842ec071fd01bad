use folio_persistence_contracts::{contact::MockContactRepository, MockDatabase, MockTransaction};
use folio_shared_contracts::{id::MockIdService, time::MockTimeService};

use crate::ContactFeatureServiceImpl;

mod submit;

type Sut = ContactFeatureServiceImpl<
    MockDatabase,
    MockIdService,
    MockTimeService,
    MockContactRepository<MockTransaction>,
>;
