use crate::Result;
use sqlx::PgPool;

pub struct ImportContext {
    pub pool: PgPool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
}

#[async_trait::async_trait]
pub trait TaskImporter: Send + Sync {
    async fn import(&self, context: &ImportContext) -> Result<ImportSummary>;

    fn name(&self) -> &'static str;
}
