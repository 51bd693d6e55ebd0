pub mod aggregate;
pub mod categories;
pub mod clustering;
pub mod compose;
pub mod dbscan;
pub mod elbow;
pub mod ingest;
pub mod kmeans;
pub mod label_groups;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod tfidf;
pub mod tokenizer;
