use nu_plugin::{serve_plugin, MsgPackSerializer};
use nu_plugin_headlines::HeadlinesPlugin;

fn main() {
    serve_plugin(&HeadlinesPlugin, MsgPackSerializer {})
}
