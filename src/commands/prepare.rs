use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, SyntaxShape,
    Type, Value,
};

use super::util::{input_rows, to_records, usize_flag};
use crate::algo::ingest::{prepare, DEFAULT_MIN_TEXT_LEN};
use crate::HeadlinesPlugin;

pub struct Prepare;

impl PluginCommand for Prepare {
    type Plugin = HeadlinesPlugin;

    fn name(&self) -> &str {
        "headlines prepare"
    }

    fn description(&self) -> &str {
        "Drop repeated titles and headlines with too little text before clustering"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::table(), Type::table())
            .named(
                "min-len",
                SyntaxShape::Int,
                "Minimum characters in \"title description\" (default: 20)",
                Some('m'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["dedup", "filter", "clean", "headlines"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: "open feed.json | headlines prepare | headlines cluster",
            description: "Clean a feed before clustering it",
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
        let min_len = usize_flag(call, "min-len")?.unwrap_or(DEFAULT_MIN_TEXT_LEN);

        let rows = input_rows(input);
        let kept: Vec<Value> = prepare(&to_records(&rows), min_len)
            .into_iter()
            .map(|i| rows[i].clone())
            .collect();

        Ok(ListStream::new(kept.into_iter(), head, Signals::empty()).into())
    }
}
