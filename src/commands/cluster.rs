use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, PipelineData, Record, Signature, SyntaxShape, Type, Value,
};

use super::util::{group_record, input_rows, labeled, strings, to_records, u64_flag, usize_flag};
use crate::algo::clustering::Algorithm;
use crate::algo::pipeline::{cluster_articles, REPORT_TOP_LABELS};
use crate::config::{ClusterConfig, ClusterCount};
use crate::HeadlinesPlugin;

pub struct Cluster;

impl Cluster {
    fn config(call: &EvaluatedCall) -> Result<ClusterConfig, LabeledError> {
        let head = call.head;
        let mut config = ClusterConfig::default();

        if let Some(k) = usize_flag(call, "clusters")? {
            config.cluster_count = ClusterCount::Fixed(k);
        }
        if let Some(name) = call.get_flag::<String>("algorithm")? {
            config.algorithm = name.parse::<Algorithm>().map_err(|e| labeled(e, head))?;
        }
        config.use_labels = call.has_flag("use-labels")?;
        if let Some(w) = usize_flag(call, "label-weight")? {
            config.label_weight = w;
        }
        if let Some(v) = usize_flag(call, "max-vocab")? {
            config.max_vocab_size = v;
        }
        if let Some(m) = usize_flag(call, "max-auto-clusters")? {
            config.max_auto_clusters = m;
        }
        if let Some(eps) = call.get_flag::<f64>("eps")? {
            config.eps = eps;
        }
        if let Some(m) = usize_flag(call, "min-samples")? {
            config.min_samples = m;
        }
        if let Some(seed) = u64_flag(call, "seed")? {
            config.seed = seed;
        }
        Ok(config)
    }
}

impl PluginCommand for Cluster {
    type Plugin = HeadlinesPlugin;

    fn name(&self) -> &str {
        "headlines cluster"
    }

    fn description(&self) -> &str {
        "Group headlines into topical clusters using TF-IDF features"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::table(), Type::record())
            .named(
                "clusters",
                SyntaxShape::Int,
                "Number of clusters (default: chosen automatically)",
                Some('k'),
            )
            .named(
                "algorithm",
                SyntaxShape::String,
                "centroid (kmeans) or density (dbscan) (default: centroid)",
                Some('a'),
            )
            .switch("use-labels", "Include labels in the clustered text", Some('l'))
            .named(
                "label-weight",
                SyntaxShape::Int,
                "Times the labels are repeated in the text (default: 2)",
                None,
            )
            .named(
                "max-vocab",
                SyntaxShape::Int,
                "Max vocabulary size (default: 1000)",
                None,
            )
            .named(
                "max-auto-clusters",
                SyntaxShape::Int,
                "Upper bound for automatic cluster count (default: 10)",
                None,
            )
            .named(
                "eps",
                SyntaxShape::Number,
                "Density radius in cosine distance (default: 0.5)",
                None,
            )
            .named(
                "min-samples",
                SyntaxShape::Int,
                "Neighbours needed for a dense point (default: 2)",
                None,
            )
            .named(
                "seed",
                SyntaxShape::Int,
                "Random seed for reproducibility (default: 42)",
                None,
            )
            .named(
                "top",
                SyntaxShape::Int,
                "Labels reported per cluster (default: 3)",
                Some('n'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["cluster", "news", "headlines", "kmeans", "dbscan", "tfidf"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"[[title description labels]; ["Stocks rally" "Markets up" [finance]] ["Storm hits coast" "Floods" [weather]]] | headlines cluster --clusters 2"#,
                description: "Split two headlines into two clusters",
                result: None,
            },
            Example {
                example: "open feed.json | headlines cluster --algorithm density --eps 0.6",
                description: "Density clustering with outliers in Miscellaneous",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &HeadlinesPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let head = call.head;
        let config = Self::config(call)?;
        let top_n = usize_flag(call, "top")?.unwrap_or(REPORT_TOP_LABELS);

        let rows = input_rows(input);
        let records = to_records(&rows);
        let clustering = cluster_articles(&records, &config).map_err(|e| labeled(e, head))?;

        let clusters: Vec<Value> = clustering
            .groups
            .iter()
            .map(|g| {
                let mut r = group_record(g, head);
                r.push(
                    "top_labels",
                    strings(&clustering.top_labels(&g.name, top_n), head),
                );
                Value::record(r, head)
            })
            .collect();

        let mut output = Record::new();
        output.push("num_clusters", Value::int(clustering.len() as i64, head));
        output.push("k", Value::int(clustering.k as i64, head));
        output.push("algorithm", Value::string(clustering.algorithm.as_str(), head));
        output.push("fallback", Value::bool(clustering.fallback, head));
        output.push("clusters", Value::list(clusters, head));

        Ok(PipelineData::Value(Value::record(output, head), None))
    }
}
