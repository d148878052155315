// src/cli/confirm.rs — Interactive confirmations via inquire

use std::path::Path;

use crate::core::controller::Confirmer;
use crate::core::filters::FilterSet;

/// Prompts on the terminal. Any prompt error (no TTY, Ctrl-C) counts as "no".
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn ask(&self, prompt: &str) -> bool {
        inquire::Confirm::new(prompt)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }

    fn manual_filters(&self, current: &FilterSet) -> Option<FilterSet> {
        let replace = inquire::Confirm::new("Enter replacement filters yourself?")
            .with_default(false)
            .with_help_message("Answering no stops the refinement")
            .prompt()
            .unwrap_or(false);
        if !replace {
            return None;
        }

        eprintln!("Current filters:\n{}", current.to_pretty_json());
        let input = inquire::Text::new("Filters (inline JSON or a path to a JSON file):")
            .prompt()
            .ok()?;

        match read_filters_input(&input) {
            Ok(filters) => Some(filters),
            Err(e) => {
                eprintln!("Could not use those filters: {}", e);
                None
            }
        }
    }
}

/// Inline JSON when the input starts with `{`, otherwise a file path.
pub fn read_filters_input(input: &str) -> anyhow::Result<FilterSet> {
    let input = input.trim();
    if input.starts_with('{') {
        Ok(FilterSet::from_json_str(input)?)
    } else {
        super::load_filters(Path::new(input))
    }
}
