//! `show` handler.

use tabled::Tabled;
use uciwire_core::{RemoteOverlay, Section};

use crate::cli::{GlobalOpts, OutputFormat, ShowArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Section")]
    name: String,
    #[tabled(rename = "Type")]
    section_type: String,
    #[tabled(rename = "Options")]
    options: String,
}

impl From<&Section> for SectionRow {
    fn from(s: &Section) -> Self {
        Self {
            index: s.index,
            name: if s.anonymous {
                format!("{} (anon)", s.name)
            } else {
                s.name.clone()
            },
            section_type: s.section_type.clone(),
            options: s
                .options
                .iter()
                .map(|(k, v)| format!("{k}={}", output::quote_value(v)))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn detail(s: &Section) -> String {
    let mut lines = vec![
        format!("Section: {}", s.name),
        format!("Type:    {}", s.section_type),
        format!("Index:   {}", s.index),
    ];
    if s.anonymous {
        lines.push("Anonymous: yes".into());
    }
    let width = s.options.keys().map(String::len).max().unwrap_or(0);
    for (name, value) in &s.options {
        lines.push(format!("  {name:<width$}  {}", output::quote_value(value)));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    overlay: &RemoteOverlay,
    args: ShowArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let path = util::parse_path(&args.path)?;
    overlay.load(&path.config).await?;

    let out = if path.section.is_some() {
        let section = util::require_section(overlay, &path)?;
        output::render_single(&global.output, &section, detail, |s| {
            // Addressed directly, so print the concrete id.
            let named = s.clone().anonymous(false);
            output::uci_lines(&path.config, std::slice::from_ref(&named))
        })?
    } else {
        let sections = overlay.sections(&path.config, args.section_type.as_deref());
        if matches!(global.output, OutputFormat::Plain) {
            output::uci_lines(&path.config, &sections)
        } else {
            output::render_list(
                &global.output,
                &sections,
                |s| SectionRow::from(s),
                |s| s.name.clone(),
            )?
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
