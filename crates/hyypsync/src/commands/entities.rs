//! Entity catalogue handler.

use tabled::Tabled;

use hyypsync_core::{EntitySummary, IntegrationContext};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Unique ID")]
    unique_id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Available")]
    available: String,
}

impl From<&EntitySummary> for EntityRow {
    fn from(e: &EntitySummary) -> Self {
        Self {
            unique_id: e.unique_id.clone(),
            kind: e.kind.to_string(),
            name: e.name.clone(),
            state: e.state.clone().unwrap_or_else(|| "unknown".into()),
            available: if e.available { "yes" } else { "no" }.into(),
        }
    }
}

pub fn handle(ctx: &IntegrationContext, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(
        global.output,
        &ctx.entities(),
        |e| EntityRow::from(e),
        |e| e.unique_id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
