use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, SyntaxShape,
    Type, Value,
};

use super::util::{input_rows, to_categorized};
use crate::algo::categories::{exclude_categories, DEFAULT_EXCLUDED};
use crate::HeadlinesPlugin;

pub struct Exclude;

impl PluginCommand for Exclude {
    type Plugin = HeadlinesPlugin;

    fn name(&self) -> &str {
        "headlines exclude"
    }

    fn description(&self) -> &str {
        "Drop rows whose category contains an excluded substring"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::table(), Type::table())
            .named(
                "categories",
                SyntaxShape::List(Box::new(SyntaxShape::String)),
                "Substrings to exclude (default: [sport lottery music])",
                Some('c'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["exclude", "filter", "category", "headlines"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"[[title category]; ["Cup final tonight" Sport] ["Rates rise" Economy]] | headlines exclude"#,
                description: "Drop sport, lottery and music rows",
                result: None,
            },
            Example {
                example: "open items.json | headlines exclude --categories [weather]",
                description: "Drop rows whose category mentions weather",
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
        let excluded: Vec<String> = call
            .get_flag::<Vec<String>>("categories")?
            .unwrap_or_else(|| DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect());

        let items: Vec<_> = input_rows(input)
            .into_iter()
            .map(|row| (to_categorized(&row), row))
            .collect();
        let kept: Vec<Value> = exclude_categories(items, &excluded, |(item, _)| item)
            .into_iter()
            .map(|(_, row)| row)
            .collect();

        Ok(ListStream::new(kept.into_iter(), head, Signals::empty()).into())
    }
}
