mod cluster;
mod exclude;
mod group_labels;
mod prepare;
mod util;

pub use cluster::Cluster;
pub use exclude::Exclude;
pub use group_labels::GroupLabels;
pub use prepare::Prepare;
