/// Hands out storage transactions without tying services to a concrete
/// backend. The accept path is the only multi-write operation and runs
/// entirely inside one of these.
#[async_trait::async_trait]
pub trait TxManager: Send + Sync {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>>;
}

/// An open transaction. Dropping it without calling either method rolls
/// back, per the backing driver's semantics.
#[async_trait::async_trait]
pub trait StorageTx<'t>: Send {
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}
