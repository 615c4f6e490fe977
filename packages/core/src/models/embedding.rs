use pgvector::Vector;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Embedding {
    pub id: i64,
    pub article_id: i64,
    pub vector: Vector,
    pub model_used: String,
}
