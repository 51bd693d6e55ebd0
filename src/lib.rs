pub mod algo;
pub mod config;
pub mod error;
pub mod ops;

#[cfg(feature = "plugin")]
pub mod commands;

pub use algo::aggregate::{ClusterGroup, ClusterStats};
pub use algo::pipeline::{cluster_articles, cluster_by_labels, Clustering};
pub use algo::record::{Labels, Record};
pub use config::{ClusterConfig, ClusterCount};
pub use error::{ClusterError, Result};

#[cfg(feature = "plugin")]
use nu_plugin::{Plugin, PluginCommand};

#[cfg(feature = "plugin")]
pub struct HeadlinesPlugin;

#[cfg(feature = "plugin")]
impl Plugin for HeadlinesPlugin {
    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").into()
    }

    fn commands(&self) -> Vec<Box<dyn PluginCommand<Plugin = Self>>> {
        vec![
            Box::new(commands::Cluster),
            Box::new(commands::GroupLabels),
            Box::new(commands::Prepare),
            Box::new(commands::Exclude),
        ]
    }
}
