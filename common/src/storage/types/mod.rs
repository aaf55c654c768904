pub mod concordance_hit;
pub mod corpus_document;
pub mod year_range;
