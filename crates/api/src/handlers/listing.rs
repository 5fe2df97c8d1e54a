//! Human-readable discovery page listing the supported commands.

use axum::extract::State;
use axum::response::Html;

use teamgate_core::path::SERVICE_ROOT;

use crate::state::AppState;

/// GET `/team-build` -- one table row per command: name, URL template and
/// an HTML-escaped sample payload.
pub async fn listing(State(state): State<AppState>) -> Html<String> {
    let rows = state.commands.describe_html_rows();
    let page = format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><title>{root}</title></head>\n\
         <body>\n\
         <h1>{root}</h1>\n\
         <p>Commands are invoked as <code>/{root}/COMMAND/JOB_NAME</code>.</p>\n\
         <table border='1'>\n\
         <tr><th>Command</th><th>URL</th><th>Sample payload</th></tr>\n\
         {rows}\
         </table>\n\
         </body>\n\
         </html>\n",
        root = SERVICE_ROOT,
        rows = rows,
    );
    Html(page)
}
