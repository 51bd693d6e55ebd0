use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, Type, Value};

use super::util::{group_record, input_rows, to_records};
use crate::algo::pipeline::cluster_by_labels;
use crate::HeadlinesPlugin;

pub struct GroupLabels;

impl PluginCommand for GroupLabels {
    type Plugin = HeadlinesPlugin;

    fn name(&self) -> &str {
        "headlines group-labels"
    }

    fn description(&self) -> &str {
        "Group headlines that share exactly the same set of labels"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::table(), Type::table())
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["group", "labels", "categories", "headlines"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"[[title labels]; ["Stocks rally" [finance markets]] ["Bond yields fall" [markets finance]] ["Storm hits" [weather]]] | headlines group-labels"#,
            description: "Two headlines share {finance, markets}, one stands alone",
            result: None,
        }]
    }

    fn run(
        &self,
        _plugin: &HeadlinesPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let head = call.head;
        let records = to_records(&input_rows(input));

        let groups: Vec<Value> = cluster_by_labels(&records)
            .iter()
            .map(|g| Value::record(group_record(g, head), head))
            .collect();

        Ok(PipelineData::Value(Value::list(groups, head), None))
    }
}
