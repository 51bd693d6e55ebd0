use clap::{Args, Parser, Subcommand, ValueEnum};
use nu_plugin_headlines::algo::categories::DEFAULT_EXCLUDED;
use nu_plugin_headlines::algo::clustering::Algorithm;
use nu_plugin_headlines::algo::ingest::DEFAULT_MIN_TEXT_LEN;
use nu_plugin_headlines::algo::pipeline::REPORT_TOP_LABELS;
use nu_plugin_headlines::{ops, ClusterConfig, ClusterCount};
use serde_json::Value;
use std::fmt::Display;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "headlines",
    version,
    about = "Group news headlines into topical clusters"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster JSON records ({title, description, labels}) read from stdin
    Cluster {
        #[command(flatten)]
        opts: ClusterOpts,
        /// Labels reported per cluster
        #[arg(long, default_value_t = REPORT_TOP_LABELS)]
        top: usize,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Group records by their label set only
    #[command(name = "group-labels")]
    GroupLabels,
    /// Most common labels inside one cluster
    #[command(name = "top-labels")]
    TopLabels {
        /// Cluster name, e.g. "Cluster 1" or "Miscellaneous"
        cluster: String,
        /// Number of labels
        #[arg(short = 'n', long, default_value_t = REPORT_TOP_LABELS)]
        count: usize,
        #[command(flatten)]
        opts: ClusterOpts,
    },
    /// Drop duplicate titles and records with too little text
    Prepare {
        /// Minimum length of "title description" in characters
        #[arg(long, default_value_t = DEFAULT_MIN_TEXT_LEN)]
        min_len: usize,
    },
    /// Drop records whose category contains an excluded substring
    Exclude {
        /// Substring to exclude (repeatable). Defaults to sport, lottery, music
        #[arg(short, long = "category")]
        categories: Vec<String>,
    },
    /// Normalize a string the way composed texts are normalized
    Normalize {
        text: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

/// Cluster options. Unset flags fall back to the config file, then defaults.
#[derive(Args)]
struct ClusterOpts {
    /// JSON config file used as the base configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of clusters or "auto"
    #[arg(short, long)]
    clusters: Option<ClusterCount>,
    /// centroid (kmeans) or density (dbscan)
    #[arg(short, long)]
    algorithm: Option<Algorithm>,
    /// Include labels in the clustered text
    #[arg(long, overrides_with = "no_use_labels")]
    use_labels: bool,
    /// Leave labels out even when the config file turns them on
    #[arg(long, overrides_with = "use_labels")]
    no_use_labels: bool,
    #[arg(long)]
    label_weight: Option<usize>,
    #[arg(long)]
    max_vocab: Option<usize>,
    #[arg(long)]
    ngram_min: Option<usize>,
    #[arg(long)]
    ngram_max: Option<usize>,
    #[arg(long)]
    min_df: Option<usize>,
    /// Maximum document frequency as a ratio in (0, 1]
    #[arg(long)]
    max_df: Option<f64>,
    /// Upper bound for automatic cluster count selection
    #[arg(long)]
    max_auto_clusters: Option<usize>,
    /// Density neighbourhood radius (cosine distance)
    #[arg(long)]
    eps: Option<f64>,
    #[arg(long)]
    min_samples: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
}

impl ClusterOpts {
    fn resolve(self) -> ClusterConfig {
        let base = match &self.config {
            Some(path) => ClusterConfig::load(path).unwrap_or_else(|e| fail(e)),
            None => ClusterConfig::default(),
        };
        self.apply(base)
    }

    /// Layer the flags that were given over `config`.
    fn apply(self, mut config: ClusterConfig) -> ClusterConfig {
        if let Some(c) = self.clusters {
            config.cluster_count = c;
        }
        if let Some(a) = self.algorithm {
            config.algorithm = a;
        }
        if self.use_labels {
            config.use_labels = true;
        } else if self.no_use_labels {
            config.use_labels = false;
        }
        if let Some(w) = self.label_weight {
            config.label_weight = w;
        }
        if let Some(v) = self.max_vocab {
            config.max_vocab_size = v;
        }
        if let Some(lo) = self.ngram_min {
            config.ngram_range.0 = lo;
        }
        if let Some(hi) = self.ngram_max {
            config.ngram_range.1 = hi;
        }
        if let Some(df) = self.min_df {
            config.min_doc_freq = df;
        }
        if let Some(ratio) = self.max_df {
            config.max_doc_freq_ratio = ratio;
        }
        if let Some(m) = self.max_auto_clusters {
            config.max_auto_clusters = m;
        }
        if let Some(eps) = self.eps {
            config.eps = eps;
        }
        if let Some(m) = self.min_samples {
            config.min_samples = m;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cluster { opts, top, format } => cmd_cluster(opts.resolve(), top, format),
        Commands::GroupLabels => {
            let out = ops::op_group_labels(&read_stdin_json()).unwrap_or_else(|e| fail(e));
            print_json(&out);
        }
        Commands::TopLabels {
            cluster,
            count,
            opts,
        } => {
            let rows = read_stdin_json();
            let config = opts.resolve();
            let out = ops::op_top_labels(&rows, &config, &cluster, count)
                .unwrap_or_else(|e| fail(e));
            print_json(&out);
        }
        Commands::Prepare { min_len } => {
            let out = ops::op_prepare(&read_stdin_json(), min_len).unwrap_or_else(|e| fail(e));
            print_json(&out);
        }
        Commands::Exclude { categories } => {
            let rows = read_stdin_json();
            let out = if categories.is_empty() {
                ops::op_exclude_categories(&rows, DEFAULT_EXCLUDED)
            } else {
                ops::op_exclude_categories(&rows, categories.as_slice())
            }
            .unwrap_or_else(|e| fail(e));
            print_json(&out);
        }
        Commands::Normalize { text } => print_json(&ops::op_normalize(&text)),
    }
}

fn fail(msg: impl Display) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

fn read_stdin_json() -> Vec<Value> {
    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        fail(format!("failed to read stdin: {e}"));
    }
    if buf.trim().is_empty() {
        return vec![];
    }
    let parsed: Value =
        serde_json::from_str(&buf).unwrap_or_else(|e| fail(format!("invalid JSON on stdin: {e}")));
    match parsed {
        Value::Array(arr) => arr,
        Value::Null => vec![],
        single => vec![single],
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => fail(e),
    }
}

fn cmd_cluster(config: ClusterConfig, top: usize, format: Format) {
    let rows = read_stdin_json();
    match format {
        Format::Json => {
            let out = ops::op_cluster(&rows, &config, top).unwrap_or_else(|e| fail(e));
            print_json(&out);
        }
        Format::Text => {
            let report = ops::op_cluster_report(&rows, &config).unwrap_or_else(|e| fail(e));
            print!("{report}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(args: &[&str]) -> ClusterOpts {
        let argv = ["headlines", "cluster"].iter().chain(args).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Cluster { opts, .. } => opts,
            _ => unreachable!(),
        }
    }

    fn labels_on() -> ClusterConfig {
        ClusterConfig {
            use_labels: true,
            ..ClusterConfig::default()
        }
    }

    #[test]
    fn no_use_labels_overrides_config_file() {
        let config = opts(&["--no-use-labels"]).apply(labels_on());
        assert!(!config.use_labels);
    }

    #[test]
    fn missing_flag_keeps_config_file_value() {
        assert!(opts(&[]).apply(labels_on()).use_labels);
        assert!(!opts(&[]).apply(ClusterConfig::default()).use_labels);
    }

    #[test]
    fn last_labels_flag_wins() {
        let on = opts(&["--no-use-labels", "--use-labels"]).apply(ClusterConfig::default());
        assert!(on.use_labels);
        let off = opts(&["--use-labels", "--no-use-labels"]).apply(labels_on());
        assert!(!off.use_labels);
    }

    #[test]
    fn flags_override_config_values() {
        let config = opts(&["--seed", "7", "--clusters", "3"]).apply(labels_on());
        assert_eq!(config.seed, 7);
        assert_eq!(config.cluster_count, ClusterCount::Fixed(3));
        assert!(config.use_labels);
    }
}
