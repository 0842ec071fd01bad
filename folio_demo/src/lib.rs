use folio_persistence_contracts::contact::ContactRepository;
use uuid::{uuid, Uuid};

pub mod contact;

pub const UUID1: Uuid = uuid!("0192ef3a-5b7c-7d21-9f3e-4c2a1b6d8e90");
pub const UUID2: Uuid = uuid!("0192ef3a-5b7d-7f04-8a61-d2c9e3b5f017");

pub async fn create<Txn: Send + Sync + 'static>(
    txn: &mut Txn,
    contact: impl ContactRepository<Txn>,
) -> anyhow::Result<()> {
    contact::create(txn, contact).await?;
    Ok(())
}
