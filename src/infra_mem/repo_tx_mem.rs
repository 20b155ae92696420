use crate::domain_port::{StorageTx, TxManager};

/// The memory backend applies writes immediately; transactions are
/// observation-only. Good enough for dev and tests, where there is no
/// crash-recovery story to begin with.
pub struct MemTxManager;

#[async_trait::async_trait]
impl TxManager for MemTxManager {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        Ok(Box::new(MemTx))
    }
}

pub struct MemTx;

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MemTx {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}
